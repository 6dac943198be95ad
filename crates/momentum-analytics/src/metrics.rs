//! 뉴스 모멘텀 지표 계산.
//!
//! 모든 창(window) 연산은 자산별로 날짜 오름차순 정렬된 행에 대해 수행됩니다.
//!
//! | 지표 | 정의 |
//! |------|------|
//! | `count_7d_avg` | 최근 7행 `count` 평균 (최소 1행) |
//! | `trend_score` | `count_7d_avg`의 7행 전 대비 변화율 |
//! | `acceleration_score` | `trend_score`의 직전 행 대비 변화율 |
//! | `price_score` | `close`의 7행 전 대비 변화율 |
//! | `momentum_score` | trend × acceleration × price |
//!
//! 변화율은 `(현재 - 이전) / 이전`이며, 이전 값이 0이어서 생기는 ±inf와 NaN은
//! 모두 null로 취급합니다. 중간에 빠진 값(종가 없는 날 등)은 같은 자산의
//! 직전 값으로 채운 뒤 비교합니다.

use std::cmp::Ordering;
use std::collections::VecDeque;

use momentum_core::{MergedRecord, MetricRecord};

/// 이동평균 및 변화율 기간 (행 수).
pub const ROLLING_WINDOW: usize = 7;

/// 필터링 전 지표가 계산된 행.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: MergedRecord,
    pub count_7d_avg: f64,
    pub trend_score: Option<f64>,
    pub acceleration_score: Option<f64>,
    pub price_score: Option<f64>,
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Clone)]
pub struct MetricsEngine {
    window: usize,
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self {
            window: ROLLING_WINDOW,
        }
    }
}

impl MetricsEngine {
    /// 창 크기를 지정해 생성합니다 (최소 1).
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// 병합 레코드에 지표를 계산하고 필터링/정렬한 최종 테이블을 반환합니다.
    pub fn compute(&self, records: Vec<MergedRecord>) -> Vec<MetricRecord> {
        self.rank(self.score(records))
    }

    /// (asset_id, date) 순으로 정렬한 뒤 자산별로 지표를 계산합니다.
    ///
    /// 반환되는 행 수는 입력과 같으며, 계산할 수 없거나 유한하지 않은
    /// 점수는 `None`입니다.
    pub fn score(&self, mut records: Vec<MergedRecord>) -> Vec<ScoredRecord> {
        records.sort_by(|a, b| {
            a.asset_id()
                .cmp(b.asset_id())
                .then_with(|| a.date().cmp(&b.date()))
        });

        let n = records.len();
        let mut avg = Vec::with_capacity(n);
        let mut trend = Vec::with_capacity(n);
        let mut accel = Vec::with_capacity(n);
        let mut price = Vec::with_capacity(n);

        let mut start = 0;
        while start < n {
            let asset_id = records[start].asset_id();
            let len = records[start..]
                .iter()
                .take_while(|r| r.asset_id() == asset_id)
                .count();
            let group = &records[start..start + len];

            let counts: Vec<f64> = group.iter().map(|r| r.count() as f64).collect();
            let closes: Vec<f64> = group
                .iter()
                .map(|r| r.close.unwrap_or(f64::NAN))
                .collect();

            let group_avg = rolling_mean(&counts, self.window);
            let group_trend = pct_change(&group_avg, self.window);
            // ±inf 치환 전의 trend로 계산 (0/0으로 생긴 NaN은 직전 값으로 채움)
            let group_accel = pct_change(&group_trend, 1);
            let group_price = pct_change(&closes, self.window);

            avg.extend(group_avg);
            trend.extend(group_trend);
            accel.extend(group_accel);
            price.extend(group_price);

            start += len;
        }

        records
            .into_iter()
            .enumerate()
            .map(|(i, record)| ScoredRecord {
                record,
                count_7d_avg: avg[i],
                trend_score: finite(trend[i]),
                acceleration_score: finite(accel[i]),
                price_score: finite(price[i]),
            })
            .collect()
    }

    /// 계산된 행을 필터링하고 순위대로 정렬합니다.
    ///
    /// - 종가 또는 점수 중 하나라도 null인 행 제외
    /// - `momentum_score > 0`이고 `acceleration_score > 0`인 행만 유지
    /// - 날짜 내림차순, 같은 날짜는 `momentum_score` 내림차순
    pub fn rank(&self, scored: Vec<ScoredRecord>) -> Vec<MetricRecord> {
        let mut ranked: Vec<MetricRecord> = scored
            .into_iter()
            .filter_map(|s| {
                let close = s.record.close.and_then(finite)?;
                let trend_score = s.trend_score?;
                let acceleration_score = s.acceleration_score?;
                let price_score = s.price_score?;
                let momentum_score = trend_score * acceleration_score * price_score;

                let keep = momentum_score.is_finite()
                    && momentum_score > 0.0
                    && acceleration_score > 0.0;

                keep.then(|| MetricRecord {
                    news: s.record.news,
                    close,
                    count_7d_avg: s.count_7d_avg,
                    trend_score,
                    acceleration_score,
                    price_score,
                    momentum_score,
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.date().cmp(&a.date()).then_with(|| {
                b.momentum_score
                    .partial_cmp(&a.momentum_score)
                    .unwrap_or(Ordering::Equal)
            })
        });

        tracing::debug!(rows = ranked.len(), "모멘텀 순위 계산 완료");
        ranked
    }
}

/// 최근 `window`개 값의 평균 (값이 `window`개 미만이면 있는 만큼의 평균).
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut recent: VecDeque<f64> = VecDeque::with_capacity(window);

    values
        .iter()
        .map(|&value| {
            if recent.len() == window {
                recent.pop_front();
            }
            recent.push_back(value);
            recent.iter().sum::<f64>() / recent.len() as f64
        })
        .collect()
}

/// `periods`행 전 대비 변화율. 앞쪽 `periods`행은 NaN입니다.
///
/// NaN은 직전 값으로 채운 뒤 계산하므로 첫 유효 값 이전의 NaN만 남습니다.
/// 이전 값이 0이면 결과는 ±inf 또는 NaN이 될 수 있습니다.
pub fn pct_change(values: &[f64], periods: usize) -> Vec<f64> {
    let filled = forward_fill(values);

    filled
        .iter()
        .enumerate()
        .map(|(i, &current)| {
            if i < periods {
                f64::NAN
            } else {
                let previous = filled[i - periods];
                (current - previous) / previous
            }
        })
        .collect()
}

/// NaN을 직전의 NaN이 아닌 값으로 채웁니다. ±inf는 그대로 둡니다.
fn forward_fill(values: &[f64]) -> Vec<f64> {
    let mut last = f64::NAN;
    values
        .iter()
        .map(|&value| {
            if !value.is_nan() {
                last = value;
            }
            last
        })
        .collect()
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use momentum_core::AssetDailyNews;

    fn record(asset: &str, day: u32, count: usize, close: Option<f64>) -> MergedRecord {
        let date = NaiveDate::from_ymd_opt(2024, 7, day).unwrap();
        let mut news = AssetDailyNews::new(asset, asset, date);
        for _ in 0..count {
            news.push_mention(Some("t"), Some("d"), Some("u"));
        }
        MergedRecord::new(news, close)
    }

    fn scored(
        day: u32,
        trend: Option<f64>,
        accel: Option<f64>,
        price: Option<f64>,
        close: Option<f64>,
    ) -> ScoredRecord {
        ScoredRecord {
            record: record("x", day, 1, close),
            count_7d_avg: 1.0,
            trend_score: trend,
            acceleration_score: accel,
            price_score: price,
        }
    }

    #[test]
    fn test_rolling_mean_min_periods_one() {
        let avg = rolling_mean(&[2.0, 4.0, 6.0], 7);
        assert_eq!(avg, vec![2.0, 3.0, 4.0]);

        assert_eq!(rolling_mean(&[5.0], 7), vec![5.0]);
    }

    #[test]
    fn test_rolling_mean_drops_old_values() {
        let values: Vec<f64> = (1..=9).map(|v| v as f64).collect();
        let avg = rolling_mean(&values, 7);
        // 8번째 값: (2..=8) 평균
        assert_eq!(avg[7], 5.0);
        assert_eq!(avg[8], 6.0);
    }

    #[test]
    fn test_pct_change() {
        let change = pct_change(&[1.0, 2.0, 3.0], 1);
        assert!(change[0].is_nan());
        assert_eq!(change[1], 1.0);
        assert_eq!(change[2], 0.5);

        let zero = pct_change(&[0.0, 1.0, 0.0, 0.0], 1);
        assert_eq!(zero[1], f64::INFINITY);
        assert_eq!(zero[2], -1.0);
        assert!(zero[3].is_nan());
    }

    #[test]
    fn test_pct_change_fills_gaps_with_last_value() {
        let change = pct_change(&[f64::NAN, 2.0, f64::NAN, f64::NAN, 4.0], 2);
        // 앞쪽 NaN은 채우지 않는다
        assert!(change[0].is_nan());
        assert!(change[1].is_nan());
        assert!(change[2].is_nan());
        // [NaN, 2, 2, 2, 4]
        assert_eq!(change[3], 0.0);
        assert_eq!(change[4], 1.0);
    }

    #[test]
    fn test_forward_fill_keeps_infinity() {
        let filled = forward_fill(&[f64::NAN, f64::INFINITY, f64::NAN, 1.0]);
        assert!(filled[0].is_nan());
        assert_eq!(&filled[1..], &[f64::INFINITY, f64::INFINITY, 1.0]);
    }

    #[test]
    fn test_score_maps_infinity_to_none() {
        // 가격이 0에서 시작하면 7행 뒤 price_score가 +inf
        let records: Vec<MergedRecord> = (1..=8)
            .map(|d| record("z", d, 1, Some(if d == 1 { 0.0 } else { 1.0 })))
            .collect();

        let scored = MetricsEngine::default().score(records);
        assert_eq!(scored.len(), 8);
        assert_eq!(scored[7].price_score, None);
        assert!(scored.iter().all(|s| s.trend_score.map_or(true, f64::is_finite)));
    }

    #[test]
    fn test_score_sorts_and_groups_per_asset() {
        let records = vec![
            record("b", 2, 1, Some(1.0)),
            record("a", 2, 3, Some(1.0)),
            record("b", 1, 5, Some(1.0)),
            record("a", 1, 1, Some(1.0)),
        ];

        let scored = MetricsEngine::default().score(records);
        let keys: Vec<(&str, u32)> = scored
            .iter()
            .map(|s| (s.record.asset_id(), chrono::Datelike::day(&s.record.date())))
            .collect();
        assert_eq!(keys, vec![("a", 1), ("a", 2), ("b", 1), ("b", 2)]);

        // 자산별로 독립 계산: b의 첫 행은 a의 값을 보지 않는다
        assert_eq!(scored[1].count_7d_avg, 2.0);
        assert_eq!(scored[2].count_7d_avg, 5.0);
        assert_eq!(scored[3].count_7d_avg, 3.0);
    }

    #[test]
    fn test_rank_requires_positive_acceleration() {
        let rows = vec![
            // 곱은 양수지만 acceleration이 음수
            scored(1, Some(-1.0), Some(-2.0), Some(0.5), Some(10.0)),
            // 곱이 음수
            scored(2, Some(1.0), Some(2.0), Some(-0.5), Some(10.0)),
            // 유지
            scored(3, Some(1.0), Some(2.0), Some(0.5), Some(10.0)),
        ];

        let ranked = MetricsEngine::default().rank(rows);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].momentum_score, 1.0);
        assert_eq!(chrono::Datelike::day(&ranked[0].date()), 3);
    }

    #[test]
    fn test_rank_drops_nulls() {
        let rows = vec![
            scored(1, None, Some(1.0), Some(1.0), Some(10.0)),
            scored(2, Some(1.0), None, Some(1.0), Some(10.0)),
            scored(3, Some(1.0), Some(1.0), None, Some(10.0)),
            scored(4, Some(1.0), Some(1.0), Some(1.0), None),
        ];
        assert!(MetricsEngine::default().rank(rows).is_empty());
    }

    #[test]
    fn test_rank_orders_by_date_then_momentum() {
        let rows = vec![
            scored(1, Some(1.0), Some(1.0), Some(3.0), Some(1.0)),
            scored(2, Some(1.0), Some(1.0), Some(1.0), Some(1.0)),
            scored(2, Some(1.0), Some(1.0), Some(2.0), Some(1.0)),
        ];

        let ranked = MetricsEngine::default().rank(rows);
        let order: Vec<(u32, f64)> = ranked
            .iter()
            .map(|r| (chrono::Datelike::day(&r.date()), r.momentum_score))
            .collect();
        assert_eq!(order, vec![(2, 2.0), (2, 1.0), (1, 3.0)]);
    }
}
