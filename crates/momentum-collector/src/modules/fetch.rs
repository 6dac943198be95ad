//! 뉴스/시세 수집 및 병합 모듈.

use std::time::Instant;

use momentum_analytics::{check_alignment, merge_news_with_prices};
use momentum_core::{MergedRecord, TimeWindow};
use momentum_data::{MarketIngestor, NewsIngestor, RateLimitedFetcher};

use crate::error::CollectorError;
use crate::{storage, CollectionStats, CollectorConfig, Result};

/// 최근 `lookback_days`일 뉴스/시세를 수집해 병합 테이블을 저장합니다.
pub async fn run_fetch(config: &CollectorConfig) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    let window = lookback_window(config)?;
    let merged = collect_merged(config, &window, &mut stats).await?;

    storage::write_merged(&config.output.merged_path, &merged)?;

    stats.elapsed = start.elapsed();
    Ok(stats)
}

/// 현재 시각 기준 조회 기간.
pub(crate) fn lookback_window(config: &CollectorConfig) -> Result<TimeWindow> {
    TimeWindow::last_days(config.lookback_days).map_err(|e| CollectorError::Config(e.to_string()))
}

/// 주어진 기간의 뉴스와 시세를 수집하고 병합합니다.
///
/// 뉴스 수집이 끝난 뒤 시세 수집을 시작합니다. 시세를 요청할 자산 목록이
/// 뉴스 집계에서 나오기 때문입니다.
pub async fn collect_merged(
    config: &CollectorConfig,
    window: &TimeWindow,
    stats: &mut CollectionStats,
) -> Result<Vec<MergedRecord>> {
    let concurrency = config.fetch.concurrency;

    tracing::info!(
        start = %window.start(),
        end = %window.end(),
        days = window.days(),
        concurrency = concurrency,
        "수집 범위 설정 완료"
    );

    let fetcher = RateLimitedFetcher::new(&config.api_key, config.fetcher_config())?;

    // 1. 뉴스
    let news = NewsIngestor::new(fetcher.clone(), &config.base_url);
    let page_count = news.discover_page_count(window).await?;
    let items = news.fetch_pages(window, page_count, concurrency).await?;
    let aggregate = NewsIngestor::aggregate(&items);

    stats.pages = page_count;
    stats.news_items = items.len();
    stats.aggregate_rows = aggregate.table.len();
    stats.assets = aggregate.asset_ids.len();
    stats.dates = aggregate.dates.len();

    tracing::info!(
        items = items.len(),
        rows = aggregate.table.len(),
        assets = aggregate.asset_ids.len(),
        "뉴스 집계 완료"
    );

    if aggregate.asset_ids.is_empty() {
        tracing::warn!("뉴스에 등장한 자산이 없습니다");
    }

    // 2. 시세
    let market = MarketIngestor::new(fetcher, &config.base_url);
    let prices = market
        .fetch_all(&aggregate.asset_ids, window, concurrency)
        .await?;
    stats.price_points = prices.len();

    // 3. 병합
    let merged = merge_news_with_prices(aggregate.table, &prices);
    stats.merged_rows = merged.len();
    stats.rows_with_price = merged.iter().filter(|r| r.close.is_some()).count();

    if let Err(e) = check_alignment(&merged, prices.len()) {
        tracing::warn!(error = %e, "뉴스/시세 날짜가 맞지 않습니다");
    }

    Ok(merged)
}
