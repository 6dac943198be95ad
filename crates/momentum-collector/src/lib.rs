//! Standalone news momentum collector.
//!
//! 이 crate는 뉴스/시세 수집부터 모멘텀 지표 계산까지 실행하는 바이너리를 제공합니다:
//! - 뉴스 피드 + 일봉 종가 수집 및 병합 (`fetch`)
//! - 병합 테이블에서 모멘텀 지표 계산 (`metrics`)
//! - 두 단계를 연속 실행 (`run-all`)

pub mod config;
pub mod error;
pub mod modules;
pub mod stats;
pub mod storage;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use stats::CollectionStats;
