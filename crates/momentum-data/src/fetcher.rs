//! 동시 요청 수와 요청 간격을 제한하는 HTTP 수집기.
//!
//! 요청 하나는 [`FetchRequest`]로 기술합니다: URL, 쿼리 파라미터, 그리고
//! 응답 본문을 0개 이상의 레코드로 바꾸는 파서.
//!
//! [`RateLimitedFetcher::fetch_all`]은 크기 N의 세마포어로 동시에 진행 중인
//! 요청을 N개 이하로 유지하고, 각 슬롯은 permit을 얻은 뒤 고정 지연만큼
//! 쉬고 나서 요청을 보냅니다. 요청 하나라도 실패하면 배치 전체가 즉시
//! 중단됩니다. 일부만 수집된 뉴스/시세 테이블은 이후 조인 결과를 조용히
//! 왜곡하므로 재시도나 부분 결과 반환은 하지 않습니다.

use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Semaphore;

use crate::error::{DataError, Result};

/// API 키를 전달하는 HTTP 헤더.
pub const API_KEY_HEADER: &str = "x-messari-api-key";

/// 슬롯별 요청 전 기본 지연.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(1);

/// 요청별 기본 타임아웃.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

type ParseFn<T> = Box<dyn Fn(&str) -> std::result::Result<Vec<T>, String> + Send + Sync>;

/// HTTP GET 요청 하나와 응답 파서.
pub struct FetchRequest<T> {
    label: String,
    url: String,
    query: Vec<(&'static str, String)>,
    parser: ParseFn<T>,
}

impl<T> FetchRequest<T> {
    /// 새 요청 기술자를 생성합니다.
    ///
    /// # Arguments
    /// * `label` - 에러/로그에서 이 요청을 식별하는 이름 (예: `news page 3`)
    /// * `url` - 완성된 요청 URL
    /// * `parser` - 응답 본문 → 레코드 목록. 실패 시 원인 문자열 반환
    pub fn new<F>(label: impl Into<String>, url: impl Into<String>, parser: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<Vec<T>, String> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            url: url.into(),
            query: Vec::new(),
            parser: Box::new(parser),
        }
    }

    /// 쿼리 파라미터를 추가합니다.
    pub fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn query_pairs(&self) -> &[(&'static str, String)] {
        &self.query
    }
}

/// 수집기 설정.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// 슬롯이 permit을 얻은 뒤 요청 전까지 쉬는 시간
    pub request_delay: Duration,
    /// 요청별 타임아웃 (초과 시 전송 오류로 처리)
    pub timeout: Duration,
    /// stderr 진행 표시줄 사용 여부
    pub show_progress: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_delay: DEFAULT_REQUEST_DELAY,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            show_progress: false,
        }
    }
}

/// 동시성 제한 + 고정 지연 HTTP 수집기.
///
/// 내부 `reqwest::Client`는 공유 가능하므로 복제 비용이 낮습니다.
#[derive(Clone)]
pub struct RateLimitedFetcher {
    client: reqwest::Client,
    config: FetcherConfig,
}

impl RateLimitedFetcher {
    /// API 키 헤더가 고정된 수집기를 생성합니다.
    pub fn new(api_key: &SecretString, config: FetcherConfig) -> Result<Self> {
        let mut key = HeaderValue::from_str(api_key.expose_secret()).map_err(|_| {
            DataError::ConfigError("API 키에 헤더로 사용할 수 없는 문자가 있습니다".to_string())
        })?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(API_KEY_HEADER, key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// 지연 없이 요청 하나를 실행합니다 (메타데이터 조회용).
    pub async fn fetch_one<T>(&self, request: FetchRequest<T>) -> Result<Vec<T>> {
        self.execute(&request).await
    }

    /// 모든 요청을 최대 `concurrency`개씩 동시에 실행하고 결과를 이어 붙입니다.
    ///
    /// 요청 간 순서는 보장하지 않으며, 한 요청 안의 레코드 순서는 유지합니다.
    /// 요청 하나라도 실패하면 나머지 요청을 취소하고 그 에러를 반환합니다.
    pub async fn fetch_all<T>(
        &self,
        description: &str,
        requests: Vec<FetchRequest<T>>,
        concurrency: usize,
    ) -> Result<Vec<T>> {
        if concurrency == 0 {
            return Err(DataError::ConfigError(
                "동시 요청 수는 1 이상이어야 합니다".to_string(),
            ));
        }
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let total = requests.len();
        let progress = self.progress_bar(description, total as u64);
        let gate = Semaphore::new(concurrency);

        tracing::info!(
            description = description,
            requests = total,
            concurrency = concurrency,
            "배치 수집 시작"
        );

        let mut pending: FuturesUnordered<_> = requests
            .into_iter()
            .map(|request| {
                let gate = &gate;
                async move {
                    let _permit = gate
                        .acquire()
                        .await
                        .map_err(|e| DataError::transport(&request.label, e))?;
                    tokio::time::sleep(self.config.request_delay).await;
                    self.execute(&request).await
                }
            })
            .collect();

        let mut records = Vec::new();
        while let Some(result) = pending.next().await {
            match result {
                Ok(batch) => {
                    records.extend(batch);
                    progress.inc(1);
                }
                Err(e) => {
                    progress.abandon();
                    tracing::error!(
                        description = description,
                        descriptor = e.target().unwrap_or("-"),
                        error = %e,
                        "배치 수집 중단"
                    );
                    return Err(e);
                }
            }
        }

        progress.finish_and_clear();
        tracing::info!(
            description = description,
            requests = total,
            records = records.len(),
            elapsed = format!("{:.1}s", start.elapsed().as_secs_f64()),
            "배치 수집 완료"
        );

        Ok(records)
    }

    async fn execute<T>(&self, request: &FetchRequest<T>) -> Result<Vec<T>> {
        tracing::debug!(descriptor = %request.label, url = %request.url, "API 요청");

        let response = self
            .client
            .get(&request.url)
            .query(&request.query)
            .send()
            .await
            .map_err(|e| DataError::transport(&request.label, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::transport(
                &request.label,
                format!("{} - {}", status, body),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DataError::transport(&request.label, e))?;

        (request.parser)(&body).map_err(|reason| DataError::MalformedResponse {
            target: request.label.clone(),
            reason,
        })
    }

    fn progress_bar(&self, description: &str, total: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
        {
            pb.set_style(style);
        }
        pb.set_message(description.to_string());
        pb
    }
}
