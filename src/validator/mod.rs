//! Validation orchestrator module
//!
//! Sequences probe, schema inference and scoring for one endpoint and
//! aggregates the results into a `ValidationReport`.
//!
//! # Features
//!
//! - **Short-Circuit**: A failed probe leaves later criteria `NotEvaluated`
//! - **Total**: Every run yields a report, errors included
//! - **Cancellable**: The probe can be raced against a caller future
//! - **Batch**: Independent endpoints validate concurrently

mod orchestrator;
mod report;
mod types;

pub use orchestrator::{validate, Validator};
pub use report::ValidationReport;
pub use types::{CriterionStatus, ValidationRequest};
