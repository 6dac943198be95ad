//! 데이터 Provider 모듈.
//!
//! ## 뉴스 피드
//! - `NewsIngestor`: 조회 기간의 전체 페이지 수를 확인한 뒤 모든 페이지를
//!   동시에 수집하고, (자산, 자산명, 날짜)별로 집계
//!
//! ## 시세
//! - `MarketIngestor`: 뉴스에서 발견된 자산마다 일봉 종가 시계열 수집

pub mod market;
pub mod news;

pub use market::{parse_price_series, MarketIngestor};
pub use news::{parse_news_page, parse_total_pages, NewsAggregate, NewsIngestor};
