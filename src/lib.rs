// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # api-viability
//!
//! Decides whether a public data API is worth building a visualization on.
//! Each candidate endpoint is checked against three criteria:
//!
//! - **Accessibility**: one HTTP request, classified as reachable, blocked,
//!   timed out, server error or network error
//! - **Completeness**: the payload has a time or geographic dimension and a
//!   numeric value measure
//! - **Visual Potential**: the value series moves enough, or is dense enough,
//!   to be worth charting
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use api_viability::{validate, Credential};
//!
//! #[tokio::main]
//! async fn main() {
//!     let report = validate(
//!         "https://api.example.com/series",
//!         Default::default(),
//!         Some(Credential::bearer("token")),
//!         None,
//!     )
//!     .await;
//!
//!     println!("viable: {}", report.verdict());
//!     println!("{:?}", report.value_series());
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Validator (orchestrator)                  │
//! │   Probing ──fatal──▶ Done                                      │
//! │      │                                                         │
//! │      ▼                                                         │
//! │   Inferring ──malformed──▶ Done                                │
//! │      │                                                         │
//! │      ▼                                                         │
//! │   Scoring ─────────────▶ Done ─▶ ValidationReport              │
//! └────────────────────────────────────────────────────────────────┘
//!                                 │
//! ┌───────────────┬───────────────┴──────┬─────────────────────────┐
//! │    Probe      │       Schema         │        Score            │
//! ├───────────────┼──────────────────────┼─────────────────────────┤
//! │ Masquerading  │ Role rules           │ Volatility (CV)         │
//! │ Credentials   │ Payload shapes       │ Granularity             │
//! │ Timeout       │ Record paths         │ Verdict                 │
//! └───────────────┴──────────────────────┴─────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod probe;
pub mod schema;
pub mod score;
pub mod types;
pub mod validator;

// Re-exports for convenience
pub use auth::{Credential, Location};
pub use catalog::{build_request, list_sources, SourceInfo};
pub use config::ValidatorConfig;
pub use error::{Error, Result, ResultExt};
pub use probe::{HttpProber, Probe, ProbeConfig, ProbeRequest, ProbeResult, ProbeStatus};
pub use schema::{
    infer_profile, FieldRole, PayloadFormat, RuleSet, SchemaInferencer, SchemaProfile,
};
pub use score::{score_series, Granularity, VisualPotentialScore, VisualPotentialScorer};
pub use validator::{validate, CriterionStatus, ValidationReport, ValidationRequest, Validator};
