//! 환경변수 기반 설정 모듈.

use std::path::PathBuf;
use std::time::Duration;

use momentum_data::FetcherConfig;
use secrecy::SecretString;

use crate::error::CollectorError;
use crate::Result;

/// 기본 API 주소
pub const DEFAULT_BASE_URL: &str = "https://api.messari.io";

/// Collector 전체 설정
#[derive(Debug)]
pub struct CollectorConfig {
    /// API 키 (`x-messari-api-key` 헤더)
    pub api_key: SecretString,
    /// 뉴스/시세 API 기본 주소
    pub base_url: String,
    /// 조회 기간 (일)
    pub lookback_days: u32,
    /// 요청 설정
    pub fetch: FetchSettings,
    /// 출력 파일 설정
    pub output: OutputConfig,
}

/// 요청 설정
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// 동시 요청 수
    pub concurrency: usize,
    /// 슬롯별 요청 전 딜레이 (밀리초)
    pub request_delay_ms: u64,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 진행 표시줄 사용 여부
    pub show_progress: bool,
}

/// 출력 파일 설정
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// 병합 테이블 CSV 경로
    pub merged_path: PathBuf,
    /// 지표 테이블 CSV 경로
    pub metrics_path: PathBuf,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 주어진 조회 함수로 설정 로드
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("MESSARI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                CollectorError::Config(
                    "MESSARI_API_KEY 환경변수가 설정되지 않았습니다".to_string(),
                )
            })?;

        let config = Self {
            api_key: SecretString::from(api_key),
            base_url: lookup("MESSARI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            lookback_days: env_var_parse(&lookup, "LOOKBACK_DAYS", 28),
            fetch: FetchSettings {
                concurrency: env_var_parse(&lookup, "FETCH_CONCURRENCY", 10),
                request_delay_ms: env_var_parse(&lookup, "REQUEST_DELAY_MS", 1000),
                request_timeout_secs: env_var_parse(&lookup, "REQUEST_TIMEOUT_SECS", 30),
                show_progress: env_var_bool(&lookup, "SHOW_PROGRESS", true),
            },
            output: OutputConfig {
                merged_path: lookup("OUTPUT_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("output/data.csv")),
                metrics_path: lookup("METRICS_OUTPUT_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("output/data_with_metrics.csv")),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// CLI 인자로 일부 값을 덮어씁니다.
    pub fn with_overrides(
        mut self,
        lookback_days: Option<u32>,
        concurrency: Option<usize>,
    ) -> Result<Self> {
        if let Some(days) = lookback_days {
            self.lookback_days = days;
        }
        if let Some(n) = concurrency {
            self.fetch.concurrency = n;
        }
        self.validate()?;
        Ok(self)
    }

    /// 네트워크 요청 전에 설정 값을 검증합니다.
    pub fn validate(&self) -> Result<()> {
        if self.lookback_days == 0 {
            return Err(CollectorError::Config(
                "LOOKBACK_DAYS는 1 이상이어야 합니다".to_string(),
            ));
        }
        if self.fetch.concurrency == 0 {
            return Err(CollectorError::Config(
                "FETCH_CONCURRENCY는 1 이상이어야 합니다".to_string(),
            ));
        }
        Ok(())
    }

    /// 수집기 설정으로 변환
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            request_delay: self.fetch.request_delay(),
            timeout: self.fetch.request_timeout(),
            show_progress: self.fetch.show_progress,
        }
    }
}

impl FetchSettings {
    /// 요청 전 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// 요청 타임아웃을 Duration으로 반환
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// 환경변수에서 bool 값 파싱
fn env_var_bool<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}
