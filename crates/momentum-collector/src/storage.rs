//! 병합/지표 테이블 CSV 저장.
//!
//! `title`, `description`, `url` 열은 JSON 배열 문자열로 저장하고, 종가가
//! 없는 행의 `close`는 빈 칸으로 남깁니다.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use momentum_core::{AssetDailyNews, MergedRecord, MetricRecord};
use serde::{Deserialize, Serialize};

use crate::error::CollectorError;
use crate::Result;

const MERGED_HEADER: [&str; 8] = [
    "asset_id",
    "asset_name",
    "date",
    "title",
    "description",
    "url",
    "count",
    "close",
];

const METRIC_COLUMNS: [&str; 5] = [
    "count_7d_avg",
    "trend_score",
    "acceleration_score",
    "price_score",
    "momentum_score",
];

#[derive(Debug, Serialize, Deserialize)]
struct MergedRow {
    asset_id: String,
    asset_name: String,
    date: NaiveDate,
    title: String,
    description: String,
    url: String,
    count: usize,
    close: Option<f64>,
}

#[derive(Debug, Serialize)]
struct MetricRow {
    asset_id: String,
    asset_name: String,
    date: NaiveDate,
    title: String,
    description: String,
    url: String,
    count: usize,
    close: f64,
    count_7d_avg: f64,
    trend_score: f64,
    acceleration_score: f64,
    price_score: f64,
    momentum_score: f64,
}

/// 병합 테이블을 CSV로 저장하고 행 수를 반환합니다.
pub fn write_merged(path: &Path, records: &[MergedRecord]) -> Result<usize> {
    let mut wtr = create_writer(path, MERGED_HEADER.iter())?;

    for record in records {
        let news = &record.news;
        wtr.serialize(MergedRow {
            asset_id: news.asset_id.clone(),
            asset_name: news.asset_name.clone(),
            date: news.date,
            title: encode_list(news.titles())?,
            description: encode_list(news.descriptions())?,
            url: encode_list(news.urls())?,
            count: news.count(),
            close: record.close,
        })?;
    }
    wtr.flush()?;

    tracing::info!(path = %path.display(), rows = records.len(), "병합 테이블 저장");
    Ok(records.len())
}

/// [`write_merged`]로 저장한 병합 테이블을 읽습니다.
///
/// `count`가 목록 길이와 다르거나 세 목록의 길이가 다르면 에러를 반환합니다.
pub fn read_merged(path: &Path) -> Result<Vec<MergedRecord>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut records = Vec::new();

    for (idx, row) in rdr.deserialize::<MergedRow>().enumerate() {
        let row = row?;
        // 헤더가 1행
        let line = idx + 2;

        let titles = decode_list(&row.title, "title", line)?;
        let descriptions = decode_list(&row.description, "description", line)?;
        let urls = decode_list(&row.url, "url", line)?;

        if titles.len() != row.count {
            return Err(CollectorError::DataConsistency(format!(
                "{}행 ({} {}): count={} 이지만 title {}개",
                line,
                row.asset_id,
                row.date,
                row.count,
                titles.len()
            )));
        }

        let news = AssetDailyNews::from_parts(
            row.asset_id,
            row.asset_name,
            row.date,
            titles,
            descriptions,
            urls,
        )
        .map_err(|e| CollectorError::DataConsistency(format!("{}행: {}", line, e)))?;

        records.push(MergedRecord::new(news, row.close));
    }

    tracing::info!(path = %path.display(), rows = records.len(), "병합 테이블 로드");
    Ok(records)
}

/// 지표 테이블을 CSV로 저장하고 행 수를 반환합니다.
pub fn write_metrics(path: &Path, records: &[MetricRecord]) -> Result<usize> {
    let mut wtr = create_writer(path, MERGED_HEADER.iter().chain(METRIC_COLUMNS.iter()))?;

    for record in records {
        let news = &record.news;
        wtr.serialize(MetricRow {
            asset_id: news.asset_id.clone(),
            asset_name: news.asset_name.clone(),
            date: news.date,
            title: encode_list(news.titles())?,
            description: encode_list(news.descriptions())?,
            url: encode_list(news.urls())?,
            count: news.count(),
            close: record.close,
            count_7d_avg: record.count_7d_avg,
            trend_score: record.trend_score,
            acceleration_score: record.acceleration_score,
            price_score: record.price_score,
            momentum_score: record.momentum_score,
        })?;
    }
    wtr.flush()?;

    tracing::info!(path = %path.display(), rows = records.len(), "지표 테이블 저장");
    Ok(records.len())
}

/// 상위 디렉토리를 만들고 헤더를 먼저 쓴 writer를 반환합니다.
///
/// 빈 테이블도 헤더는 남도록 serde 자동 헤더 대신 직접 씁니다.
fn create_writer<I, T>(path: &Path, header: I) -> Result<csv::Writer<fs::File>>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    wtr.write_record(header)?;
    Ok(wtr)
}

fn encode_list(values: &[String]) -> Result<String> {
    serde_json::to_string(values)
        .map_err(|e| CollectorError::DataConsistency(format!("목록 직렬화 실패: {}", e)))
}

fn decode_list(cell: &str, column: &str, line: usize) -> Result<Vec<String>> {
    serde_json::from_str(cell).map_err(|e| {
        CollectorError::DataConsistency(format!("{}행 {} 열 파싱 실패: {}", line, column, e))
    })
}
