//! # Momentum Core
//!
//! 뉴스 모멘텀 파이프라인의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 파이프라인 전반에서 사용되는 기본 타입을 제공합니다:
//! - 조회 기간(`TimeWindow`)과 epoch 단위 → UTC 날짜 변환
//! - 뉴스 항목 및 자산별 일간 뉴스 집계 레코드
//! - 일간 가격 포인트
//! - 병합/지표 레코드
//! - 로깅 인프라

pub mod domain;
pub mod error;
pub mod logging;
pub mod window;

pub use domain::*;
pub use error::{CoreError, Result};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use window::{EpochUnit, TimeWindow, SECONDS_PER_DAY};
