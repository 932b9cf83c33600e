//! Validation report

use super::types::CriterionStatus;
use crate::error::Result;
use crate::probe::{ProbeResult, ProbeStatus};
use crate::schema::SchemaProfile;
use crate::score::VisualPotentialScore;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Aggregated outcome of one validation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    url: String,
    checked_at: DateTime<Utc>,
    accessibility: CriterionStatus,
    completeness: CriterionStatus,
    visual_potential: CriterionStatus,
    verdict: bool,
    probe: ProbeResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<SchemaProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<VisualPotentialScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inference_error: Option<String>,
}

impl ValidationReport {
    /// Report for a probe that did not reach the endpoint
    pub fn probe_failed(url: impl Into<String>, probe: ProbeResult) -> Self {
        Self::assemble(
            url.into(),
            probe,
            CriterionStatus::NotEvaluated,
            CriterionStatus::NotEvaluated,
            None,
            None,
            None,
        )
    }

    /// Report for a reachable endpoint whose payload could not be read
    pub fn malformed(url: impl Into<String>, probe: ProbeResult, error: impl Into<String>) -> Self {
        Self::assemble(
            url.into(),
            probe,
            CriterionStatus::Failed,
            CriterionStatus::NotEvaluated,
            None,
            None,
            Some(error.into()),
        )
    }

    /// Report for a fully evaluated run.
    ///
    /// A missing score means the value series was empty, which fails the
    /// visual criterion.
    pub fn evaluated(
        url: impl Into<String>,
        probe: ProbeResult,
        schema: SchemaProfile,
        score: Option<VisualPotentialScore>,
    ) -> Self {
        let completeness = CriterionStatus::from_bool(schema.is_complete());
        let visual = CriterionStatus::from_bool(score.is_some_and(|s| s.verdict));
        Self::assemble(
            url.into(),
            probe,
            completeness,
            visual,
            Some(schema),
            score,
            None,
        )
    }

    fn assemble(
        url: String,
        probe: ProbeResult,
        completeness: CriterionStatus,
        visual_potential: CriterionStatus,
        schema: Option<SchemaProfile>,
        score: Option<VisualPotentialScore>,
        inference_error: Option<String>,
    ) -> Self {
        let accessibility = CriterionStatus::from_bool(probe.status() == ProbeStatus::Reachable);
        let verdict = accessibility.passed() && completeness.passed() && visual_potential.passed();

        Self {
            url,
            checked_at: Utc::now(),
            accessibility,
            completeness,
            visual_potential,
            verdict,
            probe,
            schema,
            score,
            inference_error,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }

    pub fn accessibility(&self) -> CriterionStatus {
        self.accessibility
    }

    pub fn completeness(&self) -> CriterionStatus {
        self.completeness
    }

    pub fn visual_potential(&self) -> CriterionStatus {
        self.visual_potential
    }

    /// True iff all three criteria passed
    pub fn verdict(&self) -> bool {
        self.verdict
    }

    pub fn probe(&self) -> &ProbeResult {
        &self.probe
    }

    pub fn schema(&self) -> Option<&SchemaProfile> {
        self.schema.as_ref()
    }

    pub fn score(&self) -> Option<&VisualPotentialScore> {
        self.score.as_ref()
    }

    /// Inference failure, verbatim
    pub fn inference_error(&self) -> Option<&str> {
        self.inference_error.as_deref()
    }

    /// The raw value series, for charting. Empty when nothing was inferred.
    pub fn value_series(&self) -> &[f64] {
        match self.schema {
            Some(ref schema) => schema.value_series(),
            None => &[],
        }
    }

    /// Serialize as pretty JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
