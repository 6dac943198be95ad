//! 뉴스 항목과 자산별 일간 뉴스 집계.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// 값이 없는 제목/설명/URL을 대신하는 문자열.
///
/// 목록 길이를 `count`와 맞추기 위해 null 값을 버리지 않고 이 값으로 채웁니다.
pub const MISSING_TEXT: &str = "None";

/// 뉴스가 언급한 자산.
///
/// 식별자는 `asset_id`이며 `asset_name`은 설명용입니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetRef {
    pub asset_id: String,
    pub asset_name: String,
}

impl AssetRef {
    pub fn new(asset_id: impl Into<String>, asset_name: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            asset_name: asset_name.into(),
        }
    }
}

/// 뉴스 피드 내 원본 위치 (페이지, 페이지 내 순번).
///
/// 동시 수집은 순서를 보장하지 않으므로 집계 전에 이 값으로 재정렬합니다.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct FeedPosition {
    pub page: u32,
    pub offset: usize,
}

/// 뉴스 피드의 원본 항목 하나.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// 게시 시각 (UTC)
    pub published_at: DateTime<Utc>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    /// 언급된 자산 (없으면 집계에서 제외)
    pub assets: Option<Vec<AssetRef>>,
    /// 피드 내 위치
    pub position: FeedPosition,
}

impl NewsItem {
    /// 게시 날짜 (UTC 기준).
    pub fn published_date(&self) -> NaiveDate {
        self.published_at.date_naive()
    }
}

/// 한 자산의 하루치 뉴스 언급 집계.
///
/// `titles`, `descriptions`, `urls`는 항상 같은 길이를 유지하며
/// `count()`는 그 길이입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDailyNews {
    pub asset_id: String,
    pub asset_name: String,
    pub date: NaiveDate,
    titles: Vec<String>,
    descriptions: Vec<String>,
    urls: Vec<String>,
}

impl AssetDailyNews {
    /// 언급이 없는 빈 집계를 생성합니다.
    pub fn new(asset_id: impl Into<String>, asset_name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            asset_id: asset_id.into(),
            asset_name: asset_name.into(),
            date,
            titles: Vec::new(),
            descriptions: Vec::new(),
            urls: Vec::new(),
        }
    }

    /// 저장된 목록에서 집계를 복원합니다.
    ///
    /// 세 목록의 길이가 다르면 에러를 반환합니다.
    pub fn from_parts(
        asset_id: impl Into<String>,
        asset_name: impl Into<String>,
        date: NaiveDate,
        titles: Vec<String>,
        descriptions: Vec<String>,
        urls: Vec<String>,
    ) -> Result<Self> {
        let asset_id = asset_id.into();
        if titles.len() != descriptions.len() || titles.len() != urls.len() {
            return Err(CoreError::Inconsistent(format!(
                "{} {}: title {}개, description {}개, url {}개",
                asset_id,
                date,
                titles.len(),
                descriptions.len(),
                urls.len()
            )));
        }

        Ok(Self {
            asset_id,
            asset_name: asset_name.into(),
            date,
            titles,
            descriptions,
            urls,
        })
    }

    /// 뉴스 언급 하나를 추가합니다. 없는 값은 [`MISSING_TEXT`]로 채웁니다.
    pub fn push_mention(
        &mut self,
        title: Option<&str>,
        description: Option<&str>,
        url: Option<&str>,
    ) {
        self.titles.push(title.unwrap_or(MISSING_TEXT).to_string());
        self.descriptions
            .push(description.unwrap_or(MISSING_TEXT).to_string());
        self.urls.push(url.unwrap_or(MISSING_TEXT).to_string());
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn descriptions(&self) -> &[String] {
        &self.descriptions
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// 집계된 언급 수.
    pub fn count(&self) -> usize {
        self.titles.len()
    }
}
