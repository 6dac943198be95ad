//! 병합 레코드와 모멘텀 지표 레코드.

use chrono::NaiveDate;

use super::news::AssetDailyNews;

/// 뉴스 집계에 종가를 붙인 레코드.
///
/// 가격이 없는 날은 `close`가 `None`입니다.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub news: AssetDailyNews,
    pub close: Option<f64>,
}

impl MergedRecord {
    pub fn new(news: AssetDailyNews, close: Option<f64>) -> Self {
        Self { news, close }
    }

    pub fn asset_id(&self) -> &str {
        &self.news.asset_id
    }

    pub fn date(&self) -> NaiveDate {
        self.news.date
    }

    pub fn count(&self) -> usize {
        self.news.count()
    }
}

/// 모멘텀 지표가 계산된 최종 레코드.
///
/// 종가와 네 점수가 모두 유한한 값인 행만 만들어집니다.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub news: AssetDailyNews,
    pub close: f64,
    /// 최근 7행 뉴스 수 이동평균
    pub count_7d_avg: f64,
    /// 7행 전 대비 이동평균 변화율
    pub trend_score: f64,
    /// 직전 행 대비 trend_score 변화율
    pub acceleration_score: f64,
    /// 7행 전 대비 종가 변화율
    pub price_score: f64,
    /// trend × acceleration × price
    pub momentum_score: f64,
}

impl MetricRecord {
    pub fn asset_id(&self) -> &str {
        &self.news.asset_id
    }

    pub fn date(&self) -> NaiveDate {
        self.news.date
    }
}
