//! 도메인 모델.

pub mod market;
pub mod news;
pub mod record;

pub use market::PricePoint;
pub use news::{AssetDailyNews, AssetRef, FeedPosition, NewsItem, MISSING_TEXT};
pub use record::{MergedRecord, MetricRecord};
