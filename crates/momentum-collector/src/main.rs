//! Standalone news momentum collector CLI.

use anyhow::Context;
use clap::{Parser, Subcommand};
use momentum_collector::{modules, CollectorConfig};
use momentum_core::{init_logging, LogConfig, LogFormat};

#[derive(Parser)]
#[command(name = "momentum-collector")]
#[command(about = "News Momentum Collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// 로그 형식 (pretty, json, compact)
    #[arg(long, global = true, default_value = "pretty")]
    log_format: LogFormat,

    /// 조회 기간 (일), LOOKBACK_DAYS보다 우선
    #[arg(long, global = true)]
    lookback_days: Option<u32>,

    /// 동시 요청 수, FETCH_CONCURRENCY보다 우선
    #[arg(long, global = true)]
    concurrency: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// 뉴스/시세 수집 후 병합 테이블 저장
    Fetch,

    /// 저장된 병합 테이블에서 모멘텀 지표 계산
    Metrics,

    /// 전체 워크플로우 실행 (수집 → 지표 계산)
    RunAll,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 로깅 초기화
    init_logging(
        LogConfig::new(format!(
            "momentum_collector={level},momentum_data={level},momentum_analytics={level}",
            level = cli.log_level
        ))
        .with_format(cli.log_format),
    )
    .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    tracing::info!("News Momentum Collector 시작");

    // 설정 로드
    let config = CollectorConfig::from_env()
        .and_then(|c| c.with_overrides(cli.lookback_days, cli.concurrency))
        .context("설정 로드 실패")?;
    tracing::debug!(
        base_url = %config.base_url,
        lookback_days = config.lookback_days,
        concurrency = config.fetch.concurrency,
        "설정 로드 완료"
    );

    // 명령 실행
    match cli.command {
        Commands::Fetch => {
            let stats = modules::run_fetch(&config).await?;
            stats.log_summary("뉴스/시세 수집");
        }
        Commands::Metrics => {
            let stats = modules::run_metrics(&config)?;
            stats.log_summary("모멘텀 지표 계산");
        }
        Commands::RunAll => {
            tracing::info!("=== 전체 워크플로우 시작 ===");
            let stats = modules::run_all(&config).await?;
            stats.log_summary("전체 워크플로우");
            tracing::info!("=== 전체 워크플로우 완료 ===");
        }
    }

    tracing::info!("News Momentum Collector 종료");

    Ok(())
}
