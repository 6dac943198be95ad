//! 뉴스 피드 수집 및 자산별 일간 집계.
//!
//! # 응답 형식
//!
//! ```json
//! {
//!   "data": [
//!     {
//!       "title": "...", "description": "...", "url": "...",
//!       "publishTimeMillis": 1710115199000,
//!       "assets": [{ "id": "...", "name": "Bitcoin" }]
//!     }
//!   ],
//!   "metadata": { "totalPages": 12 }
//! }
//! ```
//!
//! # 알려진 한계
//!
//! 집계 키는 (asset_id, asset_name, date)입니다. 기간 중 같은 asset_id가
//! 다른 이름으로 등장하면 하나로 합치지 않고 별도 행으로 남습니다.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use momentum_core::{AssetDailyNews, AssetRef, EpochUnit, FeedPosition, NewsItem, TimeWindow};
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::fetcher::{FetchRequest, RateLimitedFetcher};

/// 뉴스 피드 경로.
pub const NEWS_FEED_PATH: &str = "/news/v1/news/feed";

/// 페이지당 항목 수.
pub const PAGE_LIMIT: u32 = 100;

/// 정렬 방식 (게시 시각 기준).
const SORT_ORDER: u32 = 1;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNewsItem {
    publish_time_millis: i64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    assets: Option<Vec<RawAsset>>,
}

#[derive(Debug, Deserialize)]
struct RawAsset {
    id: String,
    name: String,
}

/// 뉴스 집계 결과.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsAggregate {
    /// (asset_id, asset_name, date) 순으로 정렬된 집계 행
    pub table: Vec<AssetDailyNews>,
    /// 집계에 등장한 자산 ID
    pub asset_ids: BTreeSet<String>,
    /// 집계에 등장한 날짜
    pub dates: BTreeSet<NaiveDate>,
}

/// 뉴스 피드 수집기.
#[derive(Clone)]
pub struct NewsIngestor {
    fetcher: RateLimitedFetcher,
    feed_url: String,
}

impl NewsIngestor {
    pub fn new(fetcher: RateLimitedFetcher, base_url: &str) -> Self {
        Self {
            fetcher,
            feed_url: format!("{}{}", base_url.trim_end_matches('/'), NEWS_FEED_PATH),
        }
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    fn page_request<T>(
        &self,
        window: &TimeWindow,
        page: u32,
        parser: impl Fn(&str) -> std::result::Result<Vec<T>, String> + Send + Sync + 'static,
    ) -> FetchRequest<T> {
        FetchRequest::new(format!("news page {}", page), self.feed_url.clone(), parser)
            .query("sort", SORT_ORDER)
            .query("publishedBefore", window.end_in(EpochUnit::Millis))
            .query("publishedAfter", window.start_in(EpochUnit::Millis))
            .query("limit", PAGE_LIMIT)
            .query("page", page)
    }

    /// 1페이지 응답의 `metadata.totalPages`로 전체 페이지 수를 확인합니다.
    pub async fn discover_page_count(&self, window: &TimeWindow) -> Result<u32> {
        let request = self.page_request(window, 1, |body| parse_total_pages(body).map(|n| vec![n]));
        let pages = self
            .fetcher
            .fetch_one(request)
            .await?
            .into_iter()
            .next()
            .unwrap_or(0);

        tracing::info!(total_pages = pages, "뉴스 페이지 수 확인");
        Ok(pages)
    }

    /// 페이지 수를 확인한 뒤 모든 페이지를 수집합니다.
    pub async fn fetch_all(&self, window: &TimeWindow, concurrency: usize) -> Result<Vec<NewsItem>> {
        let page_count = self.discover_page_count(window).await?;
        self.fetch_pages(window, page_count, concurrency).await
    }

    /// 1..=`page_count` 페이지를 각각 한 번씩 수집합니다.
    ///
    /// 결과는 피드 내 위치(페이지, 순번) 순으로 정렬됩니다.
    pub async fn fetch_pages(
        &self,
        window: &TimeWindow,
        page_count: u32,
        concurrency: usize,
    ) -> Result<Vec<NewsItem>> {
        let requests: Vec<FetchRequest<NewsItem>> = (1..=page_count)
            .map(|page| self.page_request(window, page, move |body| parse_news_page(page, body)))
            .collect();

        let mut items = self
            .fetcher
            .fetch_all("뉴스 페이지", requests, concurrency)
            .await?;
        items.sort_by_key(|item| item.position);

        Ok(items)
    }

    /// 뉴스 항목을 (asset_id, asset_name, date)별로 집계합니다.
    ///
    /// - 자산 정보가 없는 항목은 제외합니다.
    /// - 한 항목이 여러 자산을 언급하면 자산마다 한 번씩 집계합니다.
    /// - 목록 순서는 피드 내 위치 순서이므로 입력 순서와 무관하게 결정적입니다.
    pub fn aggregate(items: &[NewsItem]) -> NewsAggregate {
        let mut ordered: Vec<&NewsItem> = items.iter().collect();
        ordered.sort_by_key(|item| item.position);

        let mut groups: BTreeMap<(String, String, NaiveDate), AssetDailyNews> = BTreeMap::new();
        let mut asset_ids = BTreeSet::new();
        let mut dates = BTreeSet::new();
        let mut dropped = 0usize;

        for item in ordered {
            let assets = match item.assets.as_deref() {
                Some(assets) if !assets.is_empty() => assets,
                _ => {
                    dropped += 1;
                    continue;
                }
            };

            let date = item.published_date();
            for asset in assets {
                groups
                    .entry((asset.asset_id.clone(), asset.asset_name.clone(), date))
                    .or_insert_with(|| AssetDailyNews::new(&asset.asset_id, &asset.asset_name, date))
                    .push_mention(
                        item.title.as_deref(),
                        item.description.as_deref(),
                        item.url.as_deref(),
                    );
                asset_ids.insert(asset.asset_id.clone());
                dates.insert(date);
            }
        }

        if dropped > 0 {
            tracing::debug!(dropped, "자산 정보 없는 뉴스 제외");
        }

        NewsAggregate {
            table: groups.into_values().collect(),
            asset_ids,
            dates,
        }
    }
}

/// 응답 본문에서 `metadata.totalPages`를 읽습니다.
pub fn parse_total_pages(body: &str) -> std::result::Result<u32, String> {
    let value: Value = serde_json::from_str(body).map_err(|e| format!("JSON 파싱 실패: {}", e))?;
    let total = value
        .get("metadata")
        .and_then(|m| m.get("totalPages"))
        .ok_or_else(|| "metadata.totalPages 필드가 없습니다".to_string())?;

    total
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| format!("metadata.totalPages 값이 잘못되었습니다: {}", total))
}

/// 뉴스 페이지 하나를 파싱합니다.
///
/// `data`가 null이면 빈 페이지로, 필드 자체가 없으면 잘못된 응답으로 처리합니다.
pub fn parse_news_page(page: u32, body: &str) -> std::result::Result<Vec<NewsItem>, String> {
    let value: Value = serde_json::from_str(body).map_err(|e| format!("JSON 파싱 실패: {}", e))?;
    let data = value
        .get("data")
        .ok_or_else(|| "data 필드가 없습니다".to_string())?;
    if data.is_null() {
        return Ok(Vec::new());
    }

    let raw_items =
        Vec::<RawNewsItem>::deserialize(data).map_err(|e| format!("뉴스 항목 파싱 실패: {}", e))?;

    raw_items
        .into_iter()
        .enumerate()
        .map(|(offset, raw)| {
            let published_at = EpochUnit::Millis
                .to_datetime(raw.publish_time_millis)
                .map_err(|e| e.to_string())?;

            Ok(NewsItem {
                published_at,
                title: raw.title,
                description: raw.description,
                url: raw.url,
                assets: raw.assets.map(|assets| {
                    assets
                        .into_iter()
                        .map(|a| AssetRef::new(a.id, a.name))
                        .collect()
                }),
                position: FeedPosition { page, offset },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use momentum_core::MISSING_TEXT;
    use proptest::prelude::*;

    fn item(page: u32, offset: usize, millis: i64, title: Option<&str>, assets: &[(&str, &str)]) -> NewsItem {
        NewsItem {
            published_at: EpochUnit::Millis.to_datetime(millis).unwrap(),
            title: title.map(str::to_string),
            description: Some(format!("d{}-{}", page, offset)),
            url: None,
            assets: if assets.is_empty() {
                None
            } else {
                Some(assets.iter().map(|(id, name)| AssetRef::new(*id, *name)).collect())
            },
            position: FeedPosition { page, offset },
        }
    }

    fn day_millis(day: u32, hour: u32) -> i64 {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn test_parse_total_pages() {
        assert_eq!(
            parse_total_pages(r#"{"data": [], "metadata": {"totalPages": 7}}"#),
            Ok(7)
        );
        assert!(parse_total_pages(r#"{"data": []}"#).is_err());
        assert!(parse_total_pages(r#"{"metadata": {"totalPages": "x"}}"#).is_err());
        assert!(parse_total_pages("not json").is_err());
    }

    #[test]
    fn test_parse_news_page() {
        let body = r#"{
            "data": [
                {"title": "A", "description": null, "url": "https://a",
                 "publishTimeMillis": 1714608000000,
                 "assets": [{"id": "btc", "name": "Bitcoin", "slug": "bitcoin"}]},
                {"title": "B", "publishTimeMillis": 1714611600000, "assets": null}
            ],
            "metadata": {"totalPages": 1}
        }"#;

        let items = parse_news_page(3, body).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].position, FeedPosition { page: 3, offset: 0 });
        assert_eq!(items[1].position, FeedPosition { page: 3, offset: 1 });
        assert_eq!(items[0].description, None);
        assert_eq!(
            items[0].assets.as_deref(),
            Some(&[AssetRef::new("btc", "Bitcoin")][..])
        );
        assert_eq!(items[1].assets, None);
        assert_eq!(
            items[0].published_date(),
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
        );
    }

    #[test]
    fn test_parse_news_page_missing_or_null_data() {
        assert!(parse_news_page(1, r#"{"metadata": {}}"#).is_err());
        assert_eq!(parse_news_page(1, r#"{"data": null}"#), Ok(Vec::new()));
    }

    #[test]
    fn test_aggregate_explodes_and_groups() {
        let items = vec![
            item(1, 0, day_millis(1, 9), Some("t1"), &[("btc", "Bitcoin"), ("eth", "Ethereum")]),
            item(1, 1, day_millis(1, 10), None, &[("btc", "Bitcoin")]),
            item(1, 2, day_millis(1, 11), Some("t3"), &[]),
            item(2, 0, day_millis(2, 1), Some("t4"), &[("btc", "Bitcoin")]),
        ];

        let aggregate = NewsIngestor::aggregate(&items);

        assert_eq!(aggregate.table.len(), 3);
        let btc_day1 = &aggregate.table[0];
        assert_eq!(btc_day1.asset_id, "btc");
        assert_eq!(btc_day1.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(btc_day1.count(), 2);
        assert_eq!(btc_day1.titles(), ["t1", MISSING_TEXT]);
        assert_eq!(btc_day1.urls(), [MISSING_TEXT, MISSING_TEXT]);

        assert_eq!(aggregate.table[1].asset_id, "btc");
        assert_eq!(aggregate.table[1].count(), 1);
        assert_eq!(aggregate.table[2].asset_id, "eth");

        assert_eq!(
            aggregate.asset_ids.iter().cloned().collect::<Vec<_>>(),
            vec!["btc".to_string(), "eth".to_string()]
        );
        assert_eq!(aggregate.dates.len(), 2);
    }

    #[test]
    fn test_aggregate_orders_lists_by_feed_position() {
        let items = vec![
            item(2, 0, day_millis(3, 12), Some("late"), &[("sol", "Solana")]),
            item(1, 1, day_millis(3, 11), Some("second"), &[("sol", "Solana")]),
            item(1, 0, day_millis(3, 13), Some("first"), &[("sol", "Solana")]),
        ];

        let aggregate = NewsIngestor::aggregate(&items);
        assert_eq!(aggregate.table.len(), 1);
        assert_eq!(aggregate.table[0].titles(), ["first", "second", "late"]);
    }

    #[test]
    fn test_renamed_asset_is_not_merged() {
        let items = vec![
            item(1, 0, day_millis(4, 1), Some("a"), &[("x1", "OldName")]),
            item(1, 1, day_millis(4, 2), Some("b"), &[("x1", "NewName")]),
        ];

        let aggregate = NewsIngestor::aggregate(&items);
        assert_eq!(aggregate.table.len(), 2);
        assert_eq!(aggregate.asset_ids.len(), 1);
        assert_eq!(aggregate.table[0].asset_name, "NewName");
        assert_eq!(aggregate.table[1].asset_name, "OldName");
    }

    fn arb_items() -> impl Strategy<Value = Vec<NewsItem>> {
        let assets = prop::sample::subsequence(
            vec![("a1", "Alpha"), ("b2", "Beta"), ("c3", "Gamma")],
            0..=3,
        );
        prop::collection::vec(
            (1u32..=5, 0i64..(5 * 86_400_000), prop::option::of("[a-z]{1,6}"), assets),
            0..40,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(offset, (day, millis, title, assets))| {
                    item(
                        1,
                        offset,
                        day_millis(day, 0) + millis % 86_400_000,
                        title.as_deref(),
                        &assets,
                    )
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_aggregate_is_idempotent(items in arb_items()) {
            let first = NewsIngestor::aggregate(&items);
            let second = NewsIngestor::aggregate(&items);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_aggregate_independent_of_input_order(items in arb_items()) {
            let mut reversed = items.clone();
            reversed.reverse();
            prop_assert_eq!(NewsIngestor::aggregate(&items), NewsIngestor::aggregate(&reversed));
        }

        #[test]
        fn prop_count_matches_list_lengths(items in arb_items()) {
            let aggregate = NewsIngestor::aggregate(&items);
            let mentions: usize = items
                .iter()
                .map(|i| i.assets.as_ref().map_or(0, |a| a.len()))
                .sum();

            let mut total = 0;
            for row in &aggregate.table {
                prop_assert_eq!(row.count(), row.titles().len());
                prop_assert_eq!(row.count(), row.descriptions().len());
                prop_assert_eq!(row.count(), row.urls().len());
                total += row.count();
            }
            prop_assert_eq!(total, mentions);
        }
    }
}
