//! 조회 기간과 epoch 타임스탬프 변환.
//!
//! 뉴스 API는 밀리초, 시세 API는 초 단위 epoch를 사용합니다.
//! 두 API의 결과는 (자산, 날짜)로 조인되므로 날짜 변환은 반드시
//! [`EpochUnit`]을 통해 UTC 기준으로만 수행해야 합니다.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// 하루의 초 수.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// epoch 타임스탬프 단위.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpochUnit {
    /// 초 (시세 API)
    Seconds,
    /// 밀리초 (뉴스 API)
    Millis,
}

impl EpochUnit {
    /// epoch 값을 UTC 시각으로 변환합니다.
    pub fn to_datetime(self, value: i64) -> Result<DateTime<Utc>> {
        let converted = match self {
            Self::Seconds => DateTime::from_timestamp(value, 0),
            Self::Millis => DateTime::from_timestamp_millis(value),
        };
        converted.ok_or(CoreError::TimestampOutOfRange { value, unit: self })
    }

    /// epoch 값을 UTC 달력 날짜로 절삭합니다.
    pub fn to_date(self, value: i64) -> Result<NaiveDate> {
        self.to_datetime(value).map(|dt| dt.date_naive())
    }

    /// UTC 시각을 이 단위의 epoch 값으로 변환합니다.
    pub fn from_datetime(self, dt: &DateTime<Utc>) -> i64 {
        match self {
            Self::Seconds => dt.timestamp(),
            Self::Millis => dt.timestamp_millis(),
        }
    }
}

/// 뉴스와 시세를 조회하는 기간 `[start, end]`.
///
/// 생성 시 한 번 계산되며 이후 변경되지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// `end`에서 `lookback_days`일 전까지의 기간을 생성합니다.
    ///
    /// 양 끝은 초 단위로 절삭되므로 밀리초 값은 항상 초 값의 1000배입니다.
    pub fn lookback(end: DateTime<Utc>, lookback_days: u32) -> Result<Self> {
        if lookback_days == 0 {
            return Err(CoreError::InvalidWindow(
                "lookback_days는 1 이상이어야 합니다".to_string(),
            ));
        }

        let end_secs = end.timestamp();
        let start_secs = end_secs - SECONDS_PER_DAY * i64::from(lookback_days);

        Ok(Self {
            start: EpochUnit::Seconds.to_datetime(start_secs)?,
            end: EpochUnit::Seconds.to_datetime(end_secs)?,
        })
    }

    /// 현재 시각 기준 최근 `lookback_days`일 기간.
    pub fn last_days(lookback_days: u32) -> Result<Self> {
        Self::lookback(Utc::now(), lookback_days)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// 시작 시각 (지정 단위 epoch).
    pub fn start_in(&self, unit: EpochUnit) -> i64 {
        unit.from_datetime(&self.start)
    }

    /// 종료 시각 (지정 단위 epoch).
    pub fn end_in(&self, unit: EpochUnit) -> i64 {
        unit.from_datetime(&self.end)
    }

    /// 기간의 일 수.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}
