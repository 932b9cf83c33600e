//! CLI module
//!
//! Command-line presentation layer over the validator.
//!
//! # Commands
//!
//! - `validate` - Validate endpoint URLs
//! - `source` - Validate a dataset of a built-in source
//! - `catalog` - List built-in sources

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
