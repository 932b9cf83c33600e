//! Validation orchestrator
//!
//! Runs one validation as `Probing → Inferring → Scoring → Done`. Any
//! probe status other than `Reachable` goes straight to `Done`.

use super::report::ValidationReport;
use super::types::ValidationRequest;
use crate::auth::Credential;
use crate::config::ValidatorConfig;
use crate::error::Result;
use crate::probe::{HttpProber, Probe, ProbeResult};
use crate::schema::{RuleSet, SchemaInferencer};
use crate::score::VisualPotentialScorer;
use crate::types::StringMap;
use futures::future::join_all;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Pipeline stage, for log context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Probing,
    Inferring,
    Scoring,
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Probing => write!(f, "probing"),
            Stage::Inferring => write!(f, "inferring"),
            Stage::Scoring => write!(f, "scoring"),
            Stage::Done => write!(f, "done"),
        }
    }
}

/// Runs validations. Holds no per-run state, so one validator can serve
/// any number of concurrent runs.
pub struct Validator<P = HttpProber> {
    prober: P,
    rules: RuleSet,
    scorer: VisualPotentialScorer,
}

impl Validator<HttpProber> {
    /// Validator with the default HTTP prober, vocabulary and thresholds
    pub fn new() -> Result<Self> {
        Ok(Self::with_prober(HttpProber::new()?))
    }

    /// Validator built from a loaded configuration
    pub fn from_config(config: &ValidatorConfig) -> Result<Self> {
        let prober = HttpProber::with_config(config.probe_config())?;
        Ok(Self::with_prober(prober)
            .with_rules(config.rule_set()?)
            .with_scorer(config.scorer()))
    }
}

impl<P: Probe> Validator<P> {
    /// Validator around any prober
    pub fn with_prober(prober: P) -> Self {
        Self {
            prober,
            rules: RuleSet::standard(),
            scorer: VisualPotentialScorer::default(),
        }
    }

    #[must_use]
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_scorer(mut self, scorer: VisualPotentialScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn prober(&self) -> &P {
        &self.prober
    }

    /// Validate one endpoint. Always yields a report.
    pub async fn validate(&self, request: &ValidationRequest) -> ValidationReport {
        self.validate_with_cancel(request, std::future::pending::<()>())
            .await
    }

    /// Validate one endpoint, abandoning the probe if `cancel` completes
    /// first. A cancelled run reports `NetworkError`.
    pub async fn validate_with_cancel<F>(
        &self,
        request: &ValidationRequest,
        cancel: F,
    ) -> ValidationReport
    where
        F: Future<Output = ()>,
    {
        let url = request.url();
        debug!(url, stage = %Stage::Probing, "Validation started");

        let started = Instant::now();
        let probe = tokio::select! {
            result = self.prober.probe(&request.probe) => result,
            () = cancel => {
                warn!(url, "Probe cancelled by caller");
                ProbeResult::cancelled(started.elapsed().as_millis() as u64)
            }
        };

        let report = if probe.status().is_fatal() {
            ValidationReport::probe_failed(url, probe)
        } else {
            self.evaluate(request, probe)
        };

        info!(
            url,
            stage = %Stage::Done,
            accessibility = %report.accessibility(),
            completeness = %report.completeness(),
            visual_potential = %report.visual_potential(),
            verdict = report.verdict(),
            "Validation finished"
        );

        report
    }

    /// Validate independent endpoints concurrently. Reports come back in
    /// request order.
    pub async fn validate_all(&self, requests: &[ValidationRequest]) -> Vec<ValidationReport> {
        join_all(requests.iter().map(|request| self.validate(request))).await
    }

    /// Inferring and Scoring, on a reachable probe
    fn evaluate(&self, request: &ValidationRequest, probe: ProbeResult) -> ValidationReport {
        let url = request.url();
        debug!(url, stage = %Stage::Inferring, "Inferring schema");

        let inferencer = request.configure(SchemaInferencer::new().with_rules(self.rules.clone()));
        let inferred =
            inferencer.infer_body(probe.body().unwrap_or_default(), probe.content_type());

        let schema = match inferred {
            Ok(schema) => schema,
            Err(e) => {
                warn!(url, error = %e, "Schema inference failed");
                let message = e.to_string();
                return ValidationReport::malformed(url, probe, message);
            }
        };

        debug!(
            url,
            stage = %Stage::Scoring,
            value_field = schema.value_field().unwrap_or("-"),
            samples = schema.value_series().len(),
            "Scoring value series"
        );
        let score = self.scorer.score(schema.value_series());

        ValidationReport::evaluated(url, probe, schema, score)
    }
}

impl<P> std::fmt::Debug for Validator<P>
where
    P: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("prober", &self.prober)
            .field("rules", &self.rules.len())
            .field("scorer", &self.scorer)
            .finish()
    }
}

/// Validate one URL with the default validator.
///
/// Credentials are only ever taken from the arguments. If the HTTP client
/// cannot be built the failure is reported as a `NetworkError` probe.
pub async fn validate(
    url: &str,
    headers: StringMap,
    credential: Option<Credential>,
    timeout: Option<Duration>,
) -> ValidationReport {
    let mut request = ValidationRequest::new(url).headers(headers);
    if let Some(credential) = credential {
        request = request.credential(credential);
    }
    if let Some(timeout) = timeout {
        request = request.timeout(timeout);
    }

    match Validator::new() {
        Ok(validator) => validator.validate(&request).await,
        Err(e) => {
            warn!(url, error = %e, "Could not build HTTP prober");
            ValidationReport::probe_failed(url, ProbeResult::from_error(&e, 0))
        }
    }
}
