//! HTTP transport for the SharePoint REST API.
//!
//! [`SpTransport`] is the seam every resolver / lister call goes through.
//! [`SpHttpClient`] implements it on top of `reqwest::Client` with optional
//! Bearer-token injection, `odata=nometadata` default headers, and retry
//! with exponential back-off for 429 / 503 / 504 and connection failures.
//!
//! The transport never turns an HTTP status into an error: callers get the
//! status and body back and decide what a non-success means for them.

use crate::onedrive::error::{OneDriveError, OneDriveResult};
use crate::onedrive::types::SiteConfig;
use async_trait::async_trait;
use log::{debug, warn};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

const ODATA_NOMETADATA: &str = "application/json;odata=nometadata";

/// Upper bound for a single back-off sleep.
const MAX_RETRY_DELAY_MS: u64 = 30_000;

/// Characters left alone by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a single URL component (path or query value).
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// A fully-assembled REST call.
#[derive(Debug, Clone, PartialEq)]
pub struct SpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl SpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    /// Add a per-request header (overrides the client defaults).
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Everything after the first `?`, if any.
    pub fn query_string(&self) -> Option<&str> {
        self.url.split_once('?').map(|(_, q)| q)
    }
}

/// Raw response: status plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpResponse {
    pub status: u16,
    pub body: String,
}

impl SpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body.
    pub fn json<T: DeserializeOwned>(&self) -> OneDriveResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Structured error for a non-success response.
    pub fn error(&self) -> OneDriveError {
        OneDriveError::from_response(self.status, &self.body)
    }
}

/// Async transport used by the resolver and the lister.
#[async_trait]
pub trait SpTransport: Send + Sync {
    /// Execute one request.  `Err` means no HTTP response was obtained.
    async fn execute(&self, request: SpRequest) -> OneDriveResult<SpResponse>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct SpHttpClient {
    inner: reqwest::Client,
    access_token: Option<String>,
    max_retries: u32,
}

impl SpHttpClient {
    /// Create a new client from site configuration.
    pub fn new(config: &SiteConfig) -> OneDriveResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ODATA_NOMETADATA));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(ODATA_NOMETADATA));

        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .default_headers(headers)
            .build()
            .map_err(|e| OneDriveError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            inner,
            access_token: config.access_token.clone(),
            max_retries: config.max_retries,
        })
    }

    /// Update the access token (after the host refreshed it).
    pub fn set_access_token(&mut self, token: &str) {
        self.access_token = Some(token.to_string());
    }

    fn build(&self, request: &SpRequest) -> reqwest::RequestBuilder {
        let mut builder = match request.method {
            HttpMethod::Get => self.inner.get(&request.url),
            HttpMethod::Post => self.inner.post(&request.url),
        };
        if let Some(token) = self.access_token.as_deref() {
            builder = builder.bearer_auth(token);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }
        builder
    }

    fn is_retryable_status(status: u16) -> bool {
        matches!(status, 429 | 503 | 504)
    }

    /// Back-off before retry `attempt` (1-based): 500 ms doubling, capped.
    fn retry_delay(attempt: u32) -> Duration {
        let millis = 500u64
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)))
            .min(MAX_RETRY_DELAY_MS);
        Duration::from_millis(millis)
    }
}

#[async_trait]
impl SpTransport for SpHttpClient {
    async fn execute(&self, request: SpRequest) -> OneDriveResult<SpResponse> {
        let mut last_err = OneDriveError::internal("No attempts made");

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Self::retry_delay(attempt);
                warn!("Retry {}/{} after {:?}", attempt, self.max_retries, delay);
                tokio::time::sleep(delay).await;
            }

            debug!("{} {}", request.method, request.url);
            match self.build(&request).send().await {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    let body = match resp.text().await {
                        Ok(body) => body,
                        Err(e) => {
                            warn!("Failed to read response body (status={}): {}", status, e);
                            last_err = OneDriveError::network(format!(
                                "Failed to read response body: {}",
                                e
                            ));
                            continue;
                        }
                    };
                    debug!("Response status={} body_len={}", status, body.len());

                    if Self::is_retryable_status(status) && attempt < self.max_retries {
                        last_err = OneDriveError::from_response(status, &body);
                        continue;
                    }
                    return Ok(SpResponse { status, body });
                }
                Err(e) => {
                    last_err = OneDriveError::from(e);
                }
            }
        }

        Err(last_err)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_component_matches_js() {
        assert_eq!(
            encode_component("/personal/jdoe/Documents"),
            "%2Fpersonal%2Fjdoe%2FDocuments"
        );
        assert_eq!(encode_component("My Pics (2024)"), "My%20Pics%20(2024)");
        assert_eq!(encode_component("a&b=c"), "a%26b%3Dc");
        assert_eq!(encode_component("it's-ok_~*!."), "it's-ok_~*!.");
        assert_eq!(encode_component("Résumé"), "R%C3%A9sum%C3%A9");
    }

    #[test]
    fn test_request_builders() {
        let req = SpRequest::get("https://x/_api/web?a=1&b=2").header("odata-version", "");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.query_string(), Some("a=1&b=2"));
        assert_eq!(req.headers, vec![("odata-version".to_string(), String::new())]);

        let req = SpRequest::post("https://x/_api/web", json!({}));
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.query_string(), None);
        assert_eq!(req.body, Some(json!({})));
    }

    #[test]
    fn test_response_helpers() {
        let ok = SpResponse::new(200, r#"{"value":[]}"#);
        assert!(ok.is_success());
        let v: serde_json::Value = ok.json().unwrap();
        assert!(v["value"].is_array());

        let bad = SpResponse::new(404, "");
        assert!(!bad.is_success());
        assert_eq!(bad.error().status, Some(404));
        assert!(SpResponse::new(200, "<html>").json::<serde_json::Value>().is_err());
    }

    #[test]
    fn test_is_retryable_status() {
        assert!(SpHttpClient::is_retryable_status(429));
        assert!(SpHttpClient::is_retryable_status(503));
        assert!(!SpHttpClient::is_retryable_status(500));
        assert!(!SpHttpClient::is_retryable_status(404));
    }

    #[test]
    fn test_retry_delay_doubles_and_caps() {
        assert_eq!(SpHttpClient::retry_delay(1), Duration::from_millis(500));
        assert_eq!(SpHttpClient::retry_delay(2), Duration::from_millis(1000));
        assert_eq!(SpHttpClient::retry_delay(4), Duration::from_millis(4000));
        let cap = Duration::from_millis(MAX_RETRY_DELAY_MS);
        assert_eq!(SpHttpClient::retry_delay(64), cap);
        assert_eq!(SpHttpClient::retry_delay(u32::MAX), cap);
    }

    #[test]
    fn test_set_access_token() {
        let config = SiteConfig::default();
        let mut client = SpHttpClient::new(&config).unwrap();
        assert!(client.access_token.is_none());
        client.set_access_token("new");
        assert_eq!(client.access_token.as_deref(), Some("new"));
    }

    #[test]
    fn test_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
    }
}
