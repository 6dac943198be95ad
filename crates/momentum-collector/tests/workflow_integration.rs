//! mockito 서버와 임시 디렉토리를 사용한 워크플로우 통합 테스트.

use std::collections::HashMap;
use std::path::Path;

use chrono::{NaiveDate, TimeZone, Utc};
use mockito::{Matcher, Server, ServerGuard};
use momentum_collector::modules::{collect_merged, run_fetch, run_metrics};
use momentum_collector::{storage, CollectionStats, CollectorConfig, CollectorError};
use momentum_core::TimeWindow;
use momentum_data::provider::news::NEWS_FEED_PATH;
use momentum_data::DataError;
use serde_json::json;

/// 2024-05-01T00:00:00Z
const DAY0_SECS: i64 = 1_714_521_600;
const DAYS: i64 = 10;

fn config(server_url: &str, dir: &Path) -> CollectorConfig {
    let vars: HashMap<&str, String> = HashMap::from([
        ("MESSARI_API_KEY", "test-key".to_string()),
        ("MESSARI_BASE_URL", server_url.to_string()),
        ("REQUEST_DELAY_MS", "0".to_string()),
        ("FETCH_CONCURRENCY", "2".to_string()),
        ("SHOW_PROGRESS", "false".to_string()),
        (
            "OUTPUT_PATH",
            dir.join("out/data.csv").display().to_string(),
        ),
        (
            "METRICS_OUTPUT_PATH",
            dir.join("out/data_with_metrics.csv").display().to_string(),
        ),
    ]);
    CollectorConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

fn news_item(asset: &str, day: i64, n: usize) -> serde_json::Value {
    json!({
        "title": format!("{} day{} #{}", asset, day, n),
        "description": null,
        "url": format!("https://news/{}/{}/{}", asset, day, n),
        "publishTimeMillis": (DAY0_SECS + day * 86_400) * 1000 + (n as i64 % 3_600) * 1000,
        "assets": [{ "id": asset, "name": asset.to_uppercase() }]
    })
}

/// "a"는 하루 뉴스 수가 2배씩 늘고, "b"는 매일 1건.
fn feed_body() -> String {
    let mut data = Vec::new();
    for day in 0..DAYS {
        for n in 0..(1usize << day) {
            data.push(news_item("a", day, n));
        }
        data.push(news_item("b", day, 0));
    }
    json!({ "data": data, "metadata": { "totalPages": 1 } }).to_string()
}

fn series_body(closes: impl Fn(i64) -> f64) -> String {
    let data: Vec<_> = (0..DAYS)
        .map(|day| json!({ "timestamp": DAY0_SECS + day * 86_400, "close": closes(day) }))
        .collect();
    json!({ "data": data }).to_string()
}

async fn mock_series(server: &mut ServerGuard, asset: &str, body: String) -> mockito::Mock {
    server
        .mock(
            "GET",
            format!("/marketdata/v1/assets/{}/price/time-series", asset).as_str(),
        )
        .match_query(Matcher::UrlEncoded("interval".into(), "1d".into()))
        .with_status(200)
        .with_body(body)
        .expect(1)
        .create_async()
        .await
}

#[tokio::test]
async fn test_collect_then_metrics_ranks_accelerating_asset() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = Server::new_async().await;

    // 페이지 수 확인 + 본 수집
    let feed = server
        .mock("GET", NEWS_FEED_PATH)
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_body(feed_body())
        .expect(2)
        .create_async()
        .await;
    let series_a = mock_series(&mut server, "a", series_body(|d| 100.0 + 10.0 * d as f64)).await;
    let series_b = mock_series(&mut server, "b", series_body(|_| 50.0)).await;

    let config = config(&server.url(), dir.path());
    let end = Utc.with_ymd_and_hms(2024, 5, 11, 0, 0, 0).unwrap();
    let window = TimeWindow::lookback(end, 10).unwrap();

    let mut stats = CollectionStats::new();
    let merged = collect_merged(&config, &window, &mut stats).await.unwrap();

    feed.assert_async().await;
    series_a.assert_async().await;
    series_b.assert_async().await;

    assert_eq!(stats.pages, 1);
    assert_eq!(stats.news_items, 1023 + 10);
    assert_eq!(stats.assets, 2);
    assert_eq!(stats.dates, 10);
    assert_eq!(stats.price_points, 20);
    assert_eq!(merged.len(), 20);
    assert_eq!(stats.rows_with_price, 20);

    storage::write_merged(&config.output.merged_path, &merged).unwrap();
    let stats = run_metrics(&config).unwrap();
    assert_eq!(stats.merged_rows, 20);
    assert_eq!(stats.metric_rows, 2);

    let mut rdr = csv::Reader::from_path(&config.output.metrics_path).unwrap();
    let rows: Vec<(String, String)> = rdr
        .records()
        .map(|r| {
            let r = r.unwrap();
            (r[0].to_string(), r[2].to_string())
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            ("a".to_string(), "2024-05-10".to_string()),
            ("a".to_string(), "2024-05-09".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_failed_page_aborts_fetch_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = Server::new_async().await;

    let page_body = |page: u32| {
        json!({
            "data": [news_item("a", 0, page as usize)],
            "metadata": { "totalPages": 2 }
        })
        .to_string()
    };
    let _page1 = server
        .mock("GET", NEWS_FEED_PATH)
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_body(page_body(1))
        .create_async()
        .await;
    let _page2 = server
        .mock("GET", NEWS_FEED_PATH)
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_status(503)
        .with_body("busy")
        .create_async()
        .await;

    let config = config(&server.url(), dir.path());
    let err = run_fetch(&config).await.unwrap_err();

    match err {
        CollectorError::Data(ref e @ DataError::Transport { .. }) => {
            assert_eq!(e.target(), Some("news page 2"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(!config.output.merged_path.exists());
}

#[tokio::test]
async fn test_fetch_without_price_match_still_writes_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = Server::new_async().await;

    let _feed = server
        .mock("GET", NEWS_FEED_PATH)
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_body(
            json!({ "data": [news_item("a", 0, 0)], "metadata": { "totalPages": 1 } })
                .to_string(),
        )
        .create_async()
        .await;
    // 뉴스와 다른 날짜의 종가만 존재
    let _series = server
        .mock("GET", "/marketdata/v1/assets/a/price/time-series")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({ "data": [{ "timestamp": DAY0_SECS + 5 * 86_400, "close": 1.0 }] }).to_string())
        .create_async()
        .await;

    let config = config(&server.url(), dir.path());
    let stats = run_fetch(&config).await.unwrap();

    assert_eq!(stats.merged_rows, 1);
    assert_eq!(stats.rows_with_price, 0);

    let merged = storage::read_merged(&config.output.merged_path).unwrap();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].close, None);
    assert_eq!(
        merged[0].date(),
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    );
}
