//! 에러 타입 정의.

use std::fmt;

use momentum_analytics::AnalyticsError;
use momentum_data::DataError;

/// Collector 에러 타입
#[derive(Debug)]
pub enum CollectorError {
    /// 뉴스/시세 수집 에러
    Data(DataError),
    /// 병합/지표 계산 에러
    Analytics(AnalyticsError),
    /// 파일 입출력 에러
    Io(std::io::Error),
    /// CSV 읽기/쓰기 에러
    Csv(csv::Error),
    /// 설정 에러
    Config(String),
    /// 저장된 테이블의 정합성 에러
    DataConsistency(String),
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(e) => write!(f, "Data error: {}", e),
            Self::Analytics(e) => write!(f, "Analytics error: {}", e),
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Csv(e) => write!(f, "CSV error: {}", e),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::DataConsistency(msg) => write!(f, "Data consistency error: {}", msg),
        }
    }
}

impl std::error::Error for CollectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Data(e) => Some(e),
            Self::Analytics(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Config(_) | Self::DataConsistency(_) => None,
        }
    }
}

impl From<DataError> for CollectorError {
    fn from(err: DataError) -> Self {
        Self::Data(err)
    }
}

impl From<AnalyticsError> for CollectorError {
    fn from(err: AnalyticsError) -> Self {
        Self::Analytics(err)
    }
}

impl From<std::io::Error> for CollectorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CollectorError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
