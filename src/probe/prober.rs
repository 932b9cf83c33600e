//! HTTP prober
//!
//! Issues exactly one request per probe, a GET unless the request carries a
//! method or JSON body. There is no retry and no backoff: whatever the
//! endpoint answers is what gets reported.

use super::headers::{browser_headers, merge_headers};
use super::types::{ProbeRequest, ProbeResult};
use crate::auth::Credential;
use crate::error::{Error, Result};
use crate::types::StringMap;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// Default probe timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Characters of a failed response body kept in `raw_error`
pub const DEFAULT_MAX_ERROR_BODY: usize = 500;

/// Anything that can turn a `ProbeRequest` into a `ProbeResult`
#[async_trait]
pub trait Probe: Send + Sync {
    /// Probe the endpoint. Never fails: every outcome is a `ProbeResult`.
    async fn probe(&self, request: &ProbeRequest) -> ProbeResult;
}

/// Configuration for the HTTP prober
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Timeout used when the request does not set one
    pub timeout: Duration,
    /// Headers applied under the caller's headers
    pub default_headers: StringMap,
    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,
    /// Characters of a failed response body kept in `raw_error`
    pub max_error_body: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            default_headers: browser_headers(),
            accept_invalid_certs: false,
            max_error_body: DEFAULT_MAX_ERROR_BODY,
        }
    }
}

impl ProbeConfig {
    /// Create a new config builder
    pub fn builder() -> ProbeConfigBuilder {
        ProbeConfigBuilder::default()
    }
}

/// Builder for probe config
#[derive(Default)]
pub struct ProbeConfigBuilder {
    config: ProbeConfig,
}

impl ProbeConfigBuilder {
    /// Set the default timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Replace the default user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config
            .default_headers
            .retain(|k, _| !k.eq_ignore_ascii_case("user-agent"));
        self.config
            .default_headers
            .insert("User-Agent".to_string(), agent.into());
        self
    }

    /// Drop the browser-like default headers
    pub fn no_masquerade(mut self) -> Self {
        self.config.default_headers.clear();
        self
    }

    /// Skip TLS certificate verification
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.config.accept_invalid_certs = accept;
        self
    }

    /// Set how much of a failed response body is kept
    pub fn max_error_body(mut self, chars: usize) -> Self {
        self.config.max_error_body = chars;
        self
    }

    /// Build the config
    pub fn build(self) -> ProbeConfig {
        self.config
    }
}

/// Response data read by a successful fetch
struct Fetched {
    status: u16,
    content_type: Option<String>,
    body: String,
}

/// Prober backed by `reqwest`
pub struct HttpProber {
    client: Client,
    config: ProbeConfig,
}

impl HttpProber {
    /// Create a prober with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ProbeConfig::default())
    }

    /// Create a prober with custom configuration
    pub fn with_config(config: ProbeConfig) -> Result<Self> {
        if config.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for probes");
        }

        let client = Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the prober configuration
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Send the request and read the body
    async fn fetch(&self, request: &ProbeRequest) -> Result<Fetched> {
        let url = Url::parse(&request.url)?;
        let mut headers = merge_headers(&self.config.default_headers, &request.headers)?;

        // The credential owns its header; a caller copy would be sent twice
        if let Some(name) = request.credential.as_ref().and_then(Credential::header_name) {
            if headers.remove(name).is_some() {
                debug!(header = name, "Credential replaces caller header");
            }
        }

        let mut req = self.client.request(request.method.clone(), url).headers(headers);
        if let Some(ref body) = request.body {
            req = req.json(body);
        }
        if let Some(ref credential) = request.credential {
            debug!(kind = credential.kind(), "Attaching credential");
            req = credential.apply(req);
        }

        let response = req.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        // A failed status is already the answer; its body is only context.
        let body = if status.is_success() {
            response.text().await?
        } else {
            response.text().await.unwrap_or_default()
        };

        Ok(Fetched {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

impl std::fmt::Debug for HttpProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProber")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self, request: &ProbeRequest) -> ProbeResult {
        let timeout = request.timeout.unwrap_or(self.config.timeout);
        debug!(
            url = %request.url,
            method = %request.method,
            timeout_ms = elapsed_ms(timeout),
            "Probing endpoint"
        );

        let started = Instant::now();
        let outcome = tokio::time::timeout(timeout, self.fetch(request)).await;
        let latency_ms = elapsed_ms(started.elapsed());

        let result = match outcome {
            Ok(Ok(fetched)) => ProbeResult::from_response(
                fetched.status,
                fetched.content_type,
                fetched.body,
                latency_ms,
                self.config.max_error_body,
            ),
            Ok(Err(e)) => ProbeResult::from_error(&e, latency_ms),
            Err(_) => ProbeResult::from_error(
                &Error::Timeout {
                    timeout_ms: elapsed_ms(timeout),
                },
                latency_ms,
            ),
        };

        if result.status().is_fatal() {
            warn!(
                url = %request.url,
                status = %result.status(),
                http_status = ?result.http_status_code(),
                latency_ms,
                "Probe failed: {}",
                result.raw_error().unwrap_or("no detail")
            );
        } else {
            info!(
                url = %request.url,
                http_status = ?result.http_status_code(),
                latency_ms,
                "Probe succeeded"
            );
        }

        result
    }
}

fn elapsed_ms(duration: Duration) -> u64 {
    duration.as_millis() as u64
}
