//! 수집 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 워크플로우 실행 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionStats {
    /// 수집한 뉴스 페이지 수
    pub pages: u32,
    /// 수집한 뉴스 항목 수
    pub news_items: usize,
    /// (자산, 이름, 날짜) 집계 행 수
    pub aggregate_rows: usize,
    /// 뉴스에 등장한 자산 수
    pub assets: usize,
    /// 뉴스에 등장한 날짜 수
    pub dates: usize,
    /// 수집한 가격 포인트 수
    pub price_points: usize,
    /// 병합 행 수
    pub merged_rows: usize,
    /// 종가가 붙은 병합 행 수
    pub rows_with_price: usize,
    /// 필터링 후 지표 행 수
    pub metric_rows: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CollectionStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 병합 행 중 종가가 있는 비율 (%)
    pub fn price_coverage(&self) -> f64 {
        if self.merged_rows == 0 {
            0.0
        } else {
            (self.rows_with_price as f64 / self.merged_rows as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            pages = self.pages,
            news_items = self.news_items,
            aggregate_rows = self.aggregate_rows,
            assets = self.assets,
            dates = self.dates,
            price_points = self.price_points,
            merged_rows = self.merged_rows,
            rows_with_price = self.rows_with_price,
            metric_rows = self.metric_rows,
            price_coverage = format!("{:.1}%", self.price_coverage()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "작업 완료"
        );
    }
}
