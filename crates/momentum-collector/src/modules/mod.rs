//! 수집/지표 워크플로우 모듈.

pub mod fetch;
pub mod metrics;

pub use fetch::{collect_merged, run_fetch};
pub use metrics::{compute_metrics, run_all, run_metrics};
