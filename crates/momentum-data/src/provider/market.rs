//! 자산별 일봉 종가 수집.
//!
//! 시세 API의 `timestamp`는 초 단위 epoch이며, 뉴스와 같은 UTC 날짜
//! 경계로 절삭합니다. 데이터가 없는 자산은 빈 본문(또는 falsy JSON)을
//! 돌려주며 이는 에러가 아니라 0건 결과입니다.

use momentum_core::{EpochUnit, PricePoint, TimeWindow};
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::fetcher::{FetchRequest, RateLimitedFetcher};

/// 자산 시세 경로.
pub const MARKET_ASSETS_PATH: &str = "/marketdata/v1/assets";

/// 일봉 간격.
pub const DAILY_INTERVAL: &str = "1d";

#[derive(Debug, Deserialize)]
struct RawPricePoint {
    timestamp: i64,
    #[serde(default)]
    close: Option<f64>,
}

/// 시세 수집기.
#[derive(Clone)]
pub struct MarketIngestor {
    fetcher: RateLimitedFetcher,
    assets_url: String,
}

impl MarketIngestor {
    pub fn new(fetcher: RateLimitedFetcher, base_url: &str) -> Self {
        Self {
            fetcher,
            assets_url: format!("{}{}", base_url.trim_end_matches('/'), MARKET_ASSETS_PATH),
        }
    }

    /// 자산의 시계열 URL.
    pub fn series_url(&self, asset_id: &str) -> String {
        format!("{}/{}/price/time-series", self.assets_url, asset_id)
    }

    /// 자산마다 일봉 시계열을 한 번씩 요청합니다.
    pub async fn fetch_all<I, S>(
        &self,
        asset_ids: I,
        window: &TimeWindow,
        concurrency: usize,
    ) -> Result<Vec<PricePoint>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let requests: Vec<FetchRequest<PricePoint>> = asset_ids
            .into_iter()
            .map(|asset_id| {
                let asset_id = asset_id.as_ref().to_string();
                let url = self.series_url(&asset_id);
                let label = format!("market asset {}", asset_id);

                FetchRequest::new(label, url, move |body| parse_price_series(&asset_id, body))
                    .query("interval", DAILY_INTERVAL)
                    .query("startTime", window.start_in(EpochUnit::Seconds))
                    .query("endTime", window.end_in(EpochUnit::Seconds))
            })
            .collect();

        self.fetcher.fetch_all("시세", requests, concurrency).await
    }
}

/// 시세 응답 하나를 파싱합니다.
///
/// 빈 본문, `null`, `{}`, `[]`, `{"data": null}`은 0건으로 처리합니다.
/// 종가가 null인 포인트는 건너뜁니다.
pub fn parse_price_series(
    asset_id: &str,
    body: &str,
) -> std::result::Result<Vec<PricePoint>, String> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(body).map_err(|e| format!("JSON 파싱 실패: {}", e))?;
    if is_falsy(&value) {
        return Ok(Vec::new());
    }

    let data = value
        .get("data")
        .ok_or_else(|| "data 필드가 없습니다".to_string())?;
    if data.is_null() {
        return Ok(Vec::new());
    }

    let raw_points =
        Vec::<RawPricePoint>::deserialize(data).map_err(|e| format!("시세 파싱 실패: {}", e))?;

    let mut points = Vec::with_capacity(raw_points.len());
    for raw in raw_points {
        let Some(close) = raw.close else {
            continue;
        };
        let date = EpochUnit::Seconds
            .to_date(raw.timestamp)
            .map_err(|e| e.to_string())?;
        points.push(PricePoint::new(asset_id, date, close));
    }

    Ok(points)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
