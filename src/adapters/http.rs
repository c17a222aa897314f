use crate::adapters::sqlite::Store;
use crate::core::pagination;
use crate::domain::model::{DownloadOutcome, PageResponse, RequestLogEntry};
use crate::domain::ports::{ConfigProvider, PageSource, Storage};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{Instrument, Span};
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://api.scryfall.com/";
pub const DEFAULT_USER_AGENT: &str = concat!("set-archive/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub user_agent: String,
    /// Fixed pause before every request.
    pub throttle: Duration,
    pub timeout: Option<Duration>,
}

impl ClientSettings {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            base_url: config.api_base().to_string(),
            user_agent: config.user_agent().to_string(),
            throttle: config.throttle(),
            timeout: config.request_timeout(),
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            throttle: DEFAULT_THROTTLE,
            timeout: None,
        }
    }
}

/// A fully read response. Non-2xx statuses are data, not errors.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub url: String,
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// HTTP client that throttles every GET and writes one audit row per call
/// before handing the response back.
pub struct AuditedClient {
    client: Client,
    store: Store,
    settings: ClientSettings,
    headers: BTreeMap<&'static str, String>,
    headers_snapshot: String,
    span: Span,
}

impl AuditedClient {
    pub fn new(store: Store, settings: ClientSettings) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let mut headers = BTreeMap::new();
        headers.insert("Content-Type", "application/json".to_string());
        headers.insert("User-Agent", settings.user_agent.clone());
        let headers_snapshot = serde_json::to_string(&headers)?;

        Ok(Self {
            client,
            store,
            settings,
            headers,
            headers_snapshot,
            span: tracing::info_span!("scryfall"),
        })
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Header set as it is written to the audit log.
    pub fn headers_snapshot(&self) -> &str {
        &self.headers_snapshot
    }

    pub fn resolve_url(&self, segment: &str) -> Result<String> {
        resolve_url(&self.settings.base_url, segment)
    }

    pub async fn send(&self, url: &str) -> Result<ApiResponse> {
        self.send_logged(url).instrument(self.span.clone()).await
    }

    async fn send_logged(&self, url: &str) -> Result<ApiResponse> {
        tokio::time::sleep(self.settings.throttle).await;
        tracing::info!("Sending request to {}", url);

        let mut request = self.client.get(url);
        for (name, value) in &self.headers {
            request = request.header(*name, value);
        }

        let received = match request.send().await {
            Ok(response) => {
                let status = response.status();
                response.bytes().await.map(|body| (status, body.to_vec()))
            }
            Err(e) => Err(e),
        };

        match received {
            Ok((status, body)) => {
                let error = if status.is_success() {
                    tracing::info!("Request successful");
                    None
                } else {
                    tracing::warn!("Request failed with code {}", status.as_u16());
                    Some(String::from_utf8_lossy(&body).into_owned())
                };

                self.store
                    .record_request(&RequestLogEntry {
                        url: url.to_string(),
                        headers: self.headers_snapshot.clone(),
                        response_code: Some(status.as_u16()),
                        error,
                    })
                    .await?;

                Ok(ApiResponse {
                    url: url.to_string(),
                    status,
                    body,
                })
            }
            Err(e) => {
                tracing::warn!("Request to {} did not complete: {}", url, e);
                self.store
                    .record_request(&RequestLogEntry {
                        url: url.to_string(),
                        headers: self.headers_snapshot.clone(),
                        response_code: None,
                        error: Some(e.to_string()),
                    })
                    .await?;
                Err(EtlError::ApiError(e))
            }
        }
    }

    /// Fetches `segment` (relative to the API base, or absolute) and every continuation page.
    pub async fn fetch_paginated(&self, segment: &str) -> Result<PageResponse> {
        let url = self.resolve_url(segment)?;
        let span = self.span.clone();
        async move {
            tracing::info!("Requesting endpoint: {}", segment);
            let pages = pagination::walk(self, &url).await?;
            tracing::info!("Retrieved {} pages", pages.total);
            Ok(pages)
        }
        .instrument(span)
        .await
    }

    /// Writes the body to `path` inside `storage` when the response is 2xx.
    /// Any other status leaves the filesystem untouched.
    pub async fn download<S: Storage>(
        &self,
        url: &str,
        storage: &S,
        path: &str,
    ) -> Result<DownloadOutcome> {
        let response = self.send(url).await?;

        if !response.is_success() {
            let status = response.status.as_u16();
            self.span
                .in_scope(|| tracing::warn!("Download failed with code {}", status));
            return Ok(DownloadOutcome::Failed { status });
        }

        storage.write_file(path, &response.body).await?;
        self.span.in_scope(|| {
            tracing::info!("Downloaded file {}", storage.resolve(path).display());
        });
        Ok(DownloadOutcome::Saved {
            bytes: response.body.len(),
        })
    }
}

#[async_trait]
impl PageSource for AuditedClient {
    async fn fetch_page(&self, url: &str) -> Result<serde_json::Value> {
        let response = self.send(url).await?;
        response.json()
    }
}

/// Absolute http(s) URLs pass through untouched; anything else is joined onto `base`.
pub fn resolve_url(base: &str, segment: &str) -> Result<String> {
    if let Ok(url) = Url::parse(segment) {
        if matches!(url.scheme(), "http" | "https") {
            return Ok(segment.to_string());
        }
    }

    let mut base_url = Url::parse(base).map_err(|e| EtlError::ConfigValidationError {
        field: "source.base_url".to_string(),
        message: format!("Invalid API base URL '{}': {}", base, e),
    })?;
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }

    // "./" keeps a `host:port` style segment from parsing as its own scheme.
    base_url
        .join(&format!("./{}", segment.trim_start_matches('/')))
        .map(|url| url.to_string())
        .map_err(|e| EtlError::ConfigValidationError {
            field: "source.endpoint".to_string(),
            message: format!("Cannot join '{}' onto '{}': {}", segment, base, e),
        })
}
