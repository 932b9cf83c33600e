//! Browser masquerading headers
//!
//! Some institutional sources (OECD, IMF) answer 403 to scripting-library
//! user agents. The defaults below look like a desktop browser and are
//! applied under whatever the caller supplies.

use crate::error::{Error, Result};
use crate::types::StringMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Desktop Chrome user agent
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Accept header preferring machine-readable formats
pub const BROWSER_ACCEPT: &str = "application/json,text/csv,application/xml;q=0.9,*/*;q=0.8";

/// Accept-Language header
pub const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// The default browser-like header set
pub fn browser_headers() -> StringMap {
    StringMap::from([
        ("User-Agent".to_string(), BROWSER_USER_AGENT.to_string()),
        ("Accept".to_string(), BROWSER_ACCEPT.to_string()),
        (
            "Accept-Language".to_string(),
            BROWSER_ACCEPT_LANGUAGE.to_string(),
        ),
    ])
}

/// Build a fresh header map with `overrides` applied over `defaults`.
///
/// Header names compare case-insensitively, so `user-agent` replaces
/// `User-Agent`.
pub fn merge_headers(defaults: &StringMap, overrides: &StringMap) -> Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(defaults.len() + overrides.len());
    for (name, value) in defaults.iter().chain(overrides) {
        let (name, value) = parse_header(name, value)?;
        headers.insert(name, value);
    }
    Ok(headers)
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.trim().as_bytes())
        .map_err(|e| Error::invalid_header(name, e.to_string()))?;
    let header_value =
        HeaderValue::from_str(value.trim()).map_err(|e| Error::invalid_header(name, e.to_string()))?;
    Ok((header_name, header_value))
}

/// Parse a `Name: value` pair as typed on a command line
pub fn parse_header_line(line: &str) -> Result<(String, String)> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| Error::invalid_header(line, "expected 'Name: value'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::invalid_header(line, "empty header name"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
