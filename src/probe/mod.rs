//! Accessibility probe module
//!
//! Issues a single HTTP request against a candidate endpoint and classifies
//! the outcome.
//!
//! # Features
//!
//! - **Browser Masquerading**: Browser-like default headers, overridable per call
//! - **Credentials**: Bearer, API key and Basic credentials attached per request
//! - **Bounded**: One request, one timeout, no retries
//! - **Verbatim Failures**: Raw HTTP status and error text are preserved

mod headers;
mod prober;
mod types;

pub use headers::{
    browser_headers, merge_headers, parse_header_line, BROWSER_ACCEPT, BROWSER_ACCEPT_LANGUAGE,
    BROWSER_USER_AGENT,
};
pub use prober::{
    HttpProber, Probe, ProbeConfig, ProbeConfigBuilder, DEFAULT_MAX_ERROR_BODY, DEFAULT_TIMEOUT,
};
pub use types::{ProbeRequest, ProbeResult, ProbeStatus};
