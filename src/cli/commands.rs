//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Check whether public data APIs are worth building a dashboard on
#[derive(Parser, Debug)]
#[command(name = "api-viability")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Validator configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate one or more endpoint URLs
    Validate {
        /// Endpoint URLs, validated concurrently
        #[arg(required = true)]
        urls: Vec<String>,

        /// Extra request header ('Name: value'), repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Bearer token
        #[arg(long)]
        bearer: Option<String>,

        /// HTTP basic credentials (USER:PASSWORD)
        #[arg(long)]
        basic: Option<String>,

        /// API key sent as a query parameter (NAME=VALUE)
        #[arg(long)]
        api_key_query: Option<String>,

        /// API key sent as a header (NAME=VALUE)
        #[arg(long)]
        api_key_header: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Path to the records inside the response (e.g. `data` or `$.results[*]`)
        #[arg(long)]
        record_path: Option<String>,

        /// Column names for positional rows (comma-separated)
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,

        /// Skip TLS certificate verification
        #[arg(long)]
        insecure: bool,
    },

    /// Validate a dataset of a built-in source
    Source {
        /// Source name (see `catalog`)
        source: String,

        /// Dataset id or URL, depending on the source
        dataset: String,

        /// API key for sources that take one
        #[arg(long)]
        api_key: Option<String>,

        /// Request timeout in seconds (overrides the source default)
        #[arg(long)]
        timeout: Option<u64>,

        /// Skip TLS certificate verification
        #[arg(long)]
        insecure: bool,
    },

    /// List built-in sources
    Catalog,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one document per line)
    Json,
    /// Human-readable output
    Pretty,
}
