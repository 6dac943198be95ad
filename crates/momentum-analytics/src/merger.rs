//! 뉴스 집계와 일간 종가의 left join.

use std::collections::HashMap;

use chrono::NaiveDate;
use momentum_core::{AssetDailyNews, MergedRecord, PricePoint};

use crate::error::{AnalyticsError, Result};

/// 병합 결과 요약.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// 병합된 행 수 (= 뉴스 집계 행 수)
    pub rows: usize,
    /// 종가가 붙은 행 수
    pub with_price: usize,
    /// 입력 가격 포인트 수
    pub price_points: usize,
}

/// 뉴스 집계 행마다 같은 (asset_id, date)의 종가를 붙입니다.
///
/// 모든 뉴스 행이 입력 순서대로 유지되며, 가격이 없으면 `close`는 `None`입니다.
/// 같은 키의 가격 포인트가 여러 개면 나중 것이 사용됩니다.
pub fn merge_news_with_prices(
    news: Vec<AssetDailyNews>,
    prices: &[PricePoint],
) -> Vec<MergedRecord> {
    let mut closes: HashMap<(&str, NaiveDate), f64> = HashMap::with_capacity(prices.len());
    let mut duplicates = 0usize;
    for point in prices {
        if closes
            .insert((point.asset_id.as_str(), point.date), point.close)
            .is_some()
        {
            duplicates += 1;
        }
    }
    if duplicates > 0 {
        tracing::warn!(duplicates, "같은 (자산, 날짜)의 가격 포인트 중복, 마지막 값 사용");
    }

    news.into_iter()
        .map(|row| {
            let close = closes.get(&(row.asset_id.as_str(), row.date)).copied();
            MergedRecord::new(row, close)
        })
        .collect()
}

/// 병합 결과를 점검합니다.
///
/// 가격 포인트가 있는데 종가가 붙은 행이 하나도 없으면 두 API의 날짜
/// 변환(단위 또는 시간대)이 어긋났을 가능성이 높으므로 에러를 반환합니다.
pub fn check_alignment(merged: &[MergedRecord], price_points: usize) -> Result<MergeSummary> {
    let summary = MergeSummary {
        rows: merged.len(),
        with_price: merged.iter().filter(|r| r.close.is_some()).count(),
        price_points,
    };

    if summary.rows > 0 && summary.price_points > 0 && summary.with_price == 0 {
        return Err(AnalyticsError::DataConsistency(format!(
            "가격 포인트 {}개 중 뉴스 행 {}개와 일치하는 것이 없습니다 (날짜 단위/시간대 확인 필요)",
            summary.price_points, summary.rows
        )));
    }

    Ok(summary)
}
