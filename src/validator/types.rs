//! Validation request and criterion types

use crate::auth::Credential;
use crate::probe::ProbeRequest;
use crate::schema::{PayloadFormat, SchemaInferencer};
use crate::types::StringMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of one criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionStatus {
    Passed,
    Failed,
    /// An earlier stage failed, so this criterion was never checked
    NotEvaluated,
}

impl CriterionStatus {
    pub fn from_bool(passed: bool) -> Self {
        if passed {
            CriterionStatus::Passed
        } else {
            CriterionStatus::Failed
        }
    }

    pub fn passed(self) -> bool {
        self == CriterionStatus::Passed
    }
}

impl std::fmt::Display for CriterionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            CriterionStatus::Passed => "passed",
            CriterionStatus::Failed => "failed",
            CriterionStatus::NotEvaluated => "not evaluated",
        })
    }
}

/// One endpoint to validate
#[derive(Debug, Clone, Default)]
pub struct ValidationRequest {
    /// The HTTP request issued by the probe
    pub probe: ProbeRequest,
    /// Path to the records inside the response envelope
    pub record_path: Option<String>,
    /// Names for positional rows
    pub column_names: Option<Vec<String>>,
    /// Source-specific layout of a JSON body
    pub payload_format: PayloadFormat,
}

impl ValidationRequest {
    /// Validate a URL with no extra headers or credential
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            probe: ProbeRequest::new(url),
            ..Self::default()
        }
    }

    pub fn url(&self) -> &str {
        &self.probe.url
    }

    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.probe = self.probe.header(key, value);
        self
    }

    #[must_use]
    pub fn headers(mut self, headers: StringMap) -> Self {
        self.probe = self.probe.headers(headers);
        self
    }

    #[must_use]
    pub fn credential(mut self, credential: Credential) -> Self {
        self.probe = self.probe.credential(credential);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.probe = self.probe.timeout(timeout);
        self
    }

    #[must_use]
    pub fn record_path(mut self, path: impl Into<String>) -> Self {
        self.record_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn column_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn payload_format(mut self, format: PayloadFormat) -> Self {
        self.payload_format = format;
        self
    }

    /// Send a POST with a JSON body instead of a GET
    #[must_use]
    pub fn json_body(mut self, body: serde_json::Value) -> Self {
        self.probe = self.probe.json_body(body);
        self
    }

    /// Apply this request's payload hints to an inferencer
    pub(crate) fn configure(&self, mut inferencer: SchemaInferencer) -> SchemaInferencer {
        inferencer = inferencer.with_format(self.payload_format);
        if let Some(ref path) = self.record_path {
            inferencer = inferencer.with_record_path(path.clone());
        }
        if let Some(ref names) = self.column_names {
            inferencer = inferencer.with_column_names(names.iter().cloned());
        }
        inferencer
    }
}
