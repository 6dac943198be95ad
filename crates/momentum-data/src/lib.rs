//! 뉴스 및 시세 데이터 수집.
//!
//! 이 crate는 다음을 제공합니다:
//! - 동시 요청 수와 요청 간격을 제한하는 HTTP 수집기 (`RateLimitedFetcher`)
//! - 페이지 단위 뉴스 피드 수집 및 자산별 일간 집계 (`NewsIngestor`)
//! - 자산별 일봉 종가 수집 (`MarketIngestor`)

pub mod error;
pub mod fetcher;
pub mod provider;

pub use error::{DataError, Result};
pub use fetcher::{FetchRequest, FetcherConfig, RateLimitedFetcher};
pub use provider::{MarketIngestor, NewsAggregate, NewsIngestor};
