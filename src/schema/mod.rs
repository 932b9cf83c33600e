//! Schema inference module
//!
//! Classifies the top-level fields of a JSON or CSV payload into semantic
//! roles and extracts the value series to score.
//!
//! # Features
//!
//! - **Role Rules**: Ordered, pluggable rule list (substring, word, regex, numeric)
//! - **Payload Shapes**: Column-wise objects, arrays of records, tabular arrays
//! - **Record Paths**: Dot paths and wildcard JSONPath into response envelopes
//! - **Source Layouts**: IMF, SDMX-JSON and BLS bodies flattened into rows
//! - **CSV**: Header-row CSV bodies, with SDMX-CSV column names mapped
//! - **Lenient Series**: Non-numeric samples are dropped, never fatal

mod formats;
mod inference;
mod rules;
mod types;

pub use formats::PayloadFormat;
pub use inference::{infer_profile, SchemaInferencer};
pub use rules::{coerce_number, tokenize, FieldRole, Matcher, RoleRule, RuleSet};
pub use types::SchemaProfile;

#[cfg(test)]
mod tests;
