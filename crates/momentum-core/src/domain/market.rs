//! 일간 가격 데이터.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 자산의 일간 종가.
///
/// (asset_id, date)당 최대 하나만 존재합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub asset_id: String,
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(asset_id: impl Into<String>, date: NaiveDate, close: f64) -> Self {
        Self {
            asset_id: asset_id.into(),
            date,
            close,
        }
    }
}
