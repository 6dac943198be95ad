//! 데이터 수집 오류 타입.

use thiserror::Error;

/// 데이터 수집 관련 오류.
///
/// `target`은 실패한 요청을 식별합니다 (예: `news page 3`).
#[derive(Debug, Error)]
pub enum DataError {
    /// 네트워크/HTTP 오류 (타임아웃, 비정상 상태 코드 포함)
    #[error("Transport error [{target}]: {reason}")]
    Transport { target: String, reason: String },

    /// 응답 본문에 필요한 필드가 없거나 형식이 잘못됨
    #[error("Malformed response [{target}]: {reason}")]
    MalformedResponse { target: String, reason: String },

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DataError {
    pub(crate) fn transport(target: &str, reason: impl ToString) -> Self {
        Self::Transport {
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }

    /// 실패한 요청의 식별자.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Transport { target, .. } | Self::MalformedResponse { target, .. } => {
                Some(target)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
