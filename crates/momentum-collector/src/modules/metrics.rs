//! 모멘텀 지표 계산 모듈.

use std::time::Instant;

use momentum_analytics::MetricsEngine;
use momentum_core::MergedRecord;

use super::fetch::{collect_merged, lookback_window};
use crate::{storage, CollectionStats, CollectorConfig, Result};

/// 저장된 병합 테이블에서 지표를 계산해 저장합니다.
pub fn run_metrics(config: &CollectorConfig) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    let merged = storage::read_merged(&config.output.merged_path)?;
    stats.merged_rows = merged.len();
    stats.rows_with_price = merged.iter().filter(|r| r.close.is_some()).count();

    compute_metrics(config, merged, &mut stats)?;

    stats.elapsed = start.elapsed();
    Ok(stats)
}

/// 병합 테이블에 지표를 계산하고 지표 테이블을 저장합니다.
pub fn compute_metrics(
    config: &CollectorConfig,
    merged: Vec<MergedRecord>,
    stats: &mut CollectionStats,
) -> Result<()> {
    let engine = MetricsEngine::default();
    let input_rows = merged.len();
    let ranked = engine.compute(merged);

    tracing::info!(
        input_rows = input_rows,
        output_rows = ranked.len(),
        window = engine.window(),
        "모멘텀 지표 계산 완료"
    );

    stats.metric_rows = storage::write_metrics(&config.output.metrics_path, &ranked)?;
    Ok(())
}

/// 수집 → 병합 테이블 저장 → 지표 계산 → 지표 테이블 저장.
pub async fn run_all(config: &CollectorConfig) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    let window = lookback_window(config)?;

    tracing::info!("Step 1/2: 뉴스/시세 수집");
    let merged = collect_merged(config, &window, &mut stats).await?;
    storage::write_merged(&config.output.merged_path, &merged)?;

    tracing::info!("Step 2/2: 모멘텀 지표 계산");
    compute_metrics(config, merged, &mut stats)?;

    stats.elapsed = start.elapsed();
    Ok(stats)
}
