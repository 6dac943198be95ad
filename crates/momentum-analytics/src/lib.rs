//! 뉴스/시세 병합 및 모멘텀 지표 계산.
//!
//! - `merger`: (asset_id, date) 기준 left join과 조인 정합성 검사
//! - `metrics`: 자산별 이동평균/변화율 지표 계산, 필터링, 순위 정렬

pub mod error;
pub mod merger;
pub mod metrics;

pub use error::{AnalyticsError, Result};
pub use merger::{check_alignment, merge_news_with_prices, MergeSummary};
pub use metrics::{pct_change, rolling_mean, MetricsEngine, ScoredRecord, ROLLING_WINDOW};
