//! Probe outcome types

use crate::auth::Credential;
use crate::error::Error;
use crate::types::{JsonValue, StringMap};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Classified outcome of a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    /// 2xx with a fully read body
    Reachable,
    /// 401/403, or any other non-2xx status below 500
    Blocked,
    /// The probe exceeded its timeout
    TimedOut,
    /// 5xx
    ServerError,
    /// DNS, connect, TLS or request-building failure
    NetworkError,
}

impl ProbeStatus {
    /// Classify an HTTP status code.
    ///
    /// Transport failures and timeouts are classified before a status code
    /// exists, so they never reach this function.
    pub fn from_http_status(code: u16) -> Self {
        match code {
            401 | 403 => ProbeStatus::Blocked,
            500.. => ProbeStatus::ServerError,
            200..=299 => ProbeStatus::Reachable,
            _ => ProbeStatus::Blocked,
        }
    }

    /// Whether later pipeline stages are skipped after this status
    pub fn is_fatal(self) -> bool {
        self != ProbeStatus::Reachable
    }
}

impl std::fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeStatus::Reachable => write!(f, "reachable"),
            ProbeStatus::Blocked => write!(f, "blocked"),
            ProbeStatus::TimedOut => write!(f, "timed_out"),
            ProbeStatus::ServerError => write!(f, "server_error"),
            ProbeStatus::NetworkError => write!(f, "network_error"),
        }
    }
}

/// Result of a single probe. Fields are read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    status: ProbeStatus,
    http_status_code: Option<u16>,
    latency_ms: u64,
    raw_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
    #[serde(skip)]
    body: Option<String>,
}

impl ProbeResult {
    /// Build a result from a received HTTP response.
    ///
    /// Non-2xx bodies are kept only as a truncated `raw_error`.
    pub fn from_response(
        code: u16,
        content_type: Option<String>,
        body: String,
        latency_ms: u64,
        max_error_body: usize,
    ) -> Self {
        let status = ProbeStatus::from_http_status(code);
        if status == ProbeStatus::Reachable {
            return Self {
                status,
                http_status_code: Some(code),
                latency_ms,
                raw_error: None,
                content_type,
                body: Some(body),
            };
        }

        let snippet: String = body.chars().take(max_error_body).collect();
        Self {
            status,
            http_status_code: Some(code),
            latency_ms,
            raw_error: Some(Error::http_status(code, snippet.trim()).to_string()),
            content_type,
            body: None,
        }
    }

    /// Build a result from an error raised before a response was read
    pub fn from_error(error: &Error, latency_ms: u64) -> Self {
        let status = match error {
            Error::Timeout { .. } => ProbeStatus::TimedOut,
            Error::Http(e) if e.is_timeout() => ProbeStatus::TimedOut,
            _ => ProbeStatus::NetworkError,
        };

        Self {
            status,
            http_status_code: None,
            latency_ms,
            raw_error: Some(error.full_message()),
            content_type: None,
            body: None,
        }
    }

    /// Result for a probe aborted by its caller
    pub fn cancelled(latency_ms: u64) -> Self {
        Self {
            status: ProbeStatus::NetworkError,
            http_status_code: None,
            latency_ms,
            raw_error: Some("probe cancelled by caller".to_string()),
            content_type: None,
            body: None,
        }
    }

    pub fn status(&self) -> ProbeStatus {
        self.status
    }

    pub fn http_status_code(&self) -> Option<u16> {
        self.http_status_code
    }

    pub fn latency_ms(&self) -> u64 {
        self.latency_ms
    }

    pub fn raw_error(&self) -> Option<&str> {
        self.raw_error.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Response body, present only for `Reachable` results
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

/// What to probe and how
#[derive(Debug, Clone, Default)]
pub struct ProbeRequest {
    /// Endpoint URL
    pub url: String,
    /// Caller headers, merged over the prober's defaults
    pub headers: StringMap,
    /// Optional credential
    pub credential: Option<Credential>,
    /// Override the prober's default timeout
    pub timeout: Option<Duration>,
    /// HTTP method, GET unless set
    pub method: Method,
    /// JSON body sent with the request
    pub body: Option<JsonValue>,
}

impl ProbeRequest {
    /// Create a request for a URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Replace all caller headers
    #[must_use]
    pub fn headers(mut self, headers: StringMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set the credential
    #[must_use]
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the HTTP method
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Send a JSON body. Switches a GET request to POST.
    #[must_use]
    pub fn json_body(mut self, body: JsonValue) -> Self {
        if self.method == Method::GET {
            self.method = Method::POST;
        }
        self.body = Some(body);
        self
    }
}
