//! 핵심 도메인 에러 타입.

use thiserror::Error;

use crate::window::EpochUnit;

/// 핵심 도메인 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 잘못된 조회 기간
    #[error("잘못된 조회 기간: {0}")]
    InvalidWindow(String),

    /// 날짜로 변환할 수 없는 타임스탬프
    #[error("타임스탬프 변환 실패: {value} ({unit:?})")]
    TimestampOutOfRange { value: i64, unit: EpochUnit },

    /// 레코드 내부 불일치 (count와 목록 길이 등)
    #[error("레코드 불일치: {0}")]
    Inconsistent(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
