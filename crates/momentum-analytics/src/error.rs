//! 분석 모듈 에러 타입.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// 날짜 단위/시간대 불일치로 의심되는 조인 결과
    #[error("Data consistency error: {0}")]
    DataConsistency(String),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
