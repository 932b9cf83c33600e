//! CLI runner - executes commands

use crate::auth::Credential;
use crate::catalog::{self, SourceInfo};
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ValidatorConfig;
use crate::error::{Error, Result, ResultExt};
use crate::probe::parse_header_line;
use crate::types::StringMap;
use crate::validator::{CriterionStatus, ValidationReport, ValidationRequest, Validator};
use serde_json::{json, Value};
use std::fmt::Write as _;
use std::time::Duration;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command. `Ok(false)` means a validation did not pass.
    pub async fn run(&self) -> Result<bool> {
        match &self.cli.command {
            Commands::Validate {
                urls,
                headers,
                bearer,
                basic,
                api_key_query,
                api_key_header,
                timeout,
                record_path,
                columns,
                insecure,
            } => {
                let credential = parse_credential(
                    bearer.as_deref(),
                    basic.as_deref(),
                    api_key_query.as_deref(),
                    api_key_header.as_deref(),
                )?;

                let mut template = ValidationRequest::default().headers(parse_headers(headers)?);
                if let Some(credential) = credential {
                    template = template.credential(credential);
                }
                if let Some(secs) = timeout {
                    template = template.timeout(Duration::from_secs(*secs));
                }
                if let Some(path) = record_path {
                    template = template.record_path(path.clone());
                }
                if let Some(names) = columns {
                    template = template.column_names(names.iter().cloned());
                }

                let requests: Vec<ValidationRequest> = urls
                    .iter()
                    .map(|url| {
                        let mut request = template.clone();
                        request.probe.url.clone_from(url);
                        request
                    })
                    .collect();

                self.validate(&requests, *insecure).await
            }
            Commands::Source {
                source,
                dataset,
                api_key,
                timeout,
                insecure,
            } => {
                let mut request = catalog::build_request(source, dataset, api_key.as_deref())
                    .with_context(|| format!("Cannot validate {source} dataset '{dataset}'"))?;
                if let Some(secs) = timeout {
                    request = request.timeout(Duration::from_secs(*secs));
                }
                self.validate(std::slice::from_ref(&request), *insecure).await
            }
            Commands::Catalog => {
                self.catalog();
                Ok(true)
            }
        }
    }

    /// Load the validator configuration, or defaults when none is given
    fn load_config(&self) -> Result<ValidatorConfig> {
        match self.cli.config {
            Some(ref path) => {
                debug!(path = %path.display(), "Loading validator config");
                ValidatorConfig::from_file(path)
            }
            None => Ok(ValidatorConfig::default()),
        }
    }

    /// Configuration with command-line overrides applied
    fn effective_config(&self, insecure: bool) -> Result<ValidatorConfig> {
        let mut config = self.load_config()?;
        if insecure {
            config.probe.accept_invalid_certs = true;
        }
        Ok(config)
    }

    async fn validate(&self, requests: &[ValidationRequest], insecure: bool) -> Result<bool> {
        let config = self.effective_config(insecure)?;
        let validator = Validator::from_config(&config)?;
        let reports = validator.validate_all(requests).await;

        for report in &reports {
            match self.cli.format {
                OutputFormat::Json => {
                    let line = serde_json::to_string(report).context("Failed to serialize report")?;
                    println!("{line}");
                }
                OutputFormat::Pretty => println!("{}", render_report(report)),
            }
        }

        Ok(reports.iter().all(ValidationReport::verdict))
    }

    fn catalog(&self) {
        match self.cli.format {
            OutputFormat::Json => {
                let sources: Vec<Value> = catalog::list_sources().iter().map(source_json).collect();
                println!("{}", json!({ "sources": sources }));
            }
            OutputFormat::Pretty => {
                for info in catalog::list_sources() {
                    println!("{}", render_source(info));
                }
            }
        }
    }
}

/// Parse repeated `-H 'Name: value'` arguments
fn parse_headers(lines: &[String]) -> Result<StringMap> {
    lines.iter().map(|line| parse_header_line(line)).collect()
}

/// At most one credential may be given
fn parse_credential(
    bearer: Option<&str>,
    basic: Option<&str>,
    api_key_query: Option<&str>,
    api_key_header: Option<&str>,
) -> Result<Option<Credential>> {
    let given = [bearer, basic, api_key_query, api_key_header]
        .iter()
        .filter(|c| c.is_some())
        .count();
    if given > 1 {
        return Err(Error::config(
            "Only one of --bearer, --basic, --api-key-query and --api-key-header may be given",
        ));
    }

    if let Some(token) = bearer {
        return Ok(Some(Credential::bearer(token)));
    }
    if let Some(pair) = basic {
        let (user, password) = pair
            .split_once(':')
            .ok_or_else(|| Error::invalid_value("--basic", "expected USER:PASSWORD"))?;
        return Ok(Some(Credential::basic(user, password)));
    }
    if let Some(pair) = api_key_query {
        let (name, value) = split_pair("--api-key-query", pair)?;
        return Ok(Some(Credential::query_param(name, value)));
    }
    if let Some(pair) = api_key_header {
        let (name, value) = split_pair("--api-key-header", pair)?;
        return Ok(Some(Credential::header(name, value)));
    }
    Ok(None)
}

fn split_pair<'a>(flag: &str, pair: &'a str) -> Result<(&'a str, &'a str)> {
    match pair.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => Err(Error::invalid_value(flag, "expected NAME=VALUE")),
    }
}

fn source_json(info: &SourceInfo) -> Value {
    let api_key = match (info.api_key_param, info.api_key_required) {
        (Some(_), true) => "required",
        (Some(_), false) => "optional",
        (None, _) => "none",
    };
    json!({
        "name": info.name,
        "title": info.title,
        "description": info.description,
        "aliases": info.aliases,
        "dataset": info.dataset_hint,
        "api_key": api_key,
        "samples": info.sample_datasets,
    })
}

fn render_source(info: &SourceInfo) -> String {
    let mut out = format!("{:<10} {} ({})", info.name, info.description, info.dataset_hint);
    if info.api_key_required {
        out.push_str(" [api key required]");
    }
    for sample in info.sample_datasets {
        let _ = write!(out, "\n{:<10}   e.g. {sample}", "");
    }
    out
}

/// Human-readable report
fn render_report(report: &ValidationReport) -> String {
    let probe = report.probe();
    let mut out = format!("{}\n", report.url());

    let mut access = format!("{}, {} ms", probe.status(), probe.latency_ms());
    if let Some(code) = probe.http_status_code() {
        let _ = write!(access, ", HTTP {code}");
    }
    criterion_line(&mut out, "accessibility", report.accessibility(), &access);
    if let Some(error) = probe.raw_error() {
        let _ = writeln!(out, "  {:<18} {error}", "");
    }

    let completeness = match (report.schema(), report.inference_error()) {
        (_, Some(error)) => error.to_string(),
        (Some(schema), None) => {
            let mut dims = Vec::new();
            if schema.has_time_dimension() {
                dims.push("time");
            }
            if schema.has_geo_dimension() {
                dims.push("geo");
            }
            if schema.has_network_dimension() {
                dims.push("network");
            }
            format!(
                "dimensions: {}, value field: {}",
                if dims.is_empty() { "none".to_string() } else { dims.join(", ") },
                schema.value_field().unwrap_or("none")
            )
        }
        (None, None) => String::new(),
    };
    criterion_line(&mut out, "completeness", report.completeness(), &completeness);

    let visual = match report.score() {
        Some(score) => format!(
            "volatility {:.3}, {}, {} samples",
            score.volatility, score.granularity, score.sample_count
        ),
        None if report.visual_potential() == CriterionStatus::Failed => "no value series".to_string(),
        None => String::new(),
    };
    criterion_line(&mut out, "visual potential", report.visual_potential(), &visual);

    let _ = write!(
        out,
        "  {:<18} {}",
        "verdict",
        if report.verdict() { "VIABLE" } else { "NOT VIABLE" }
    );
    out
}

fn criterion_line(out: &mut String, name: &str, status: CriterionStatus, detail: &str) {
    if detail.is_empty() {
        let _ = writeln!(out, "  {name:<18} {status}");
    } else {
        let _ = writeln!(out, "  {name:<18} {status:<14} {detail}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeResult;
    use crate::schema::infer_profile;
    use crate::score::score_series;

    #[test]
    fn test_parse_credential_variants() {
        assert_eq!(parse_credential(None, None, None, None).unwrap(), None);
        assert_eq!(
            parse_credential(Some("t"), None, None, None).unwrap(),
            Some(Credential::bearer("t"))
        );
        assert_eq!(
            parse_credential(None, Some("user:p:ss"), None, None).unwrap(),
            Some(Credential::basic("user", "p:ss"))
        );
        assert_eq!(
            parse_credential(None, None, Some("api_key=abc=="), None).unwrap(),
            Some(Credential::query_param("api_key", "abc=="))
        );
        assert_eq!(
            parse_credential(None, None, None, Some("X-Api-Key=k")).unwrap(),
            Some(Credential::header("X-Api-Key", "k"))
        );
    }

    #[test]
    fn test_parse_credential_errors() {
        assert!(parse_credential(Some("t"), None, Some("a=b"), None).is_err());
        assert!(parse_credential(None, Some("nocolon"), None, None).is_err());
        assert!(parse_credential(None, None, Some("novalue"), None).is_err());
        assert!(parse_credential(None, None, None, Some("=v")).is_err());
    }

    #[test]
    fn test_parse_headers() {
        let headers =
            parse_headers(&["Accept: application/json".to_string(), "X-A: 1".to_string()])
                .unwrap();
        assert_eq!(headers.get("Accept").map(String::as_str), Some("application/json"));
        assert_eq!(headers.len(), 2);

        assert!(parse_headers(&["broken".to_string()]).is_err());
    }

    #[test]
    fn test_render_passing_report() {
        let body = serde_json::json!({"date": ["2020", "2021"], "value": [1, 100]});
        let schema = infer_profile(&body).unwrap();
        let score = score_series(schema.value_series());
        let probe = ProbeResult::from_response(200, None, body.to_string(), 12, 500);
        let report = ValidationReport::evaluated("https://api.example.com", probe, schema, score);

        let text = render_report(&report);
        assert!(text.starts_with("https://api.example.com\n"));
        assert!(text.contains("reachable, 12 ms, HTTP 200"));
        assert!(text.contains("dimensions: time, value field: value"));
        assert!(text.contains("2 samples"));
        assert!(text.ends_with("VIABLE"));
        assert!(!text.contains("NOT VIABLE"));
    }

    #[test]
    fn test_render_blocked_report() {
        let probe = ProbeResult::from_response(403, None, "denied".to_string(), 4, 500);
        let report = ValidationReport::probe_failed("https://api.example.com", probe);

        let text = render_report(&report);
        assert!(text.contains("blocked, 4 ms, HTTP 403"));
        assert!(text.contains("HTTP 403: denied"));
        assert!(text.contains("not evaluated"));
        assert!(text.ends_with("NOT VIABLE"));
    }

    #[test]
    fn test_source_insecure_flag_reaches_config() {
        use clap::Parser;

        let cli = Cli::try_parse_from([
            "api-viability",
            "source",
            "ecb",
            "EXR.D.USD.EUR.SP00.A",
            "--insecure",
        ])
        .unwrap();
        let Commands::Source { insecure, .. } = cli.command else {
            panic!("expected the source command");
        };

        let runner = Runner::new(cli);
        assert!(runner.effective_config(insecure).unwrap().probe.accept_invalid_certs);
        assert!(!runner.effective_config(false).unwrap().probe.accept_invalid_certs);
    }

    #[test]
    fn test_source_json() {
        let fred = catalog::get_source("fred").unwrap();
        let value = source_json(fred);
        assert_eq!(value["api_key"], "required");
        assert_eq!(value["samples"][0], "GDP");

        let census = catalog::get_source("census").unwrap();
        assert_eq!(source_json(census)["api_key"], "optional");

        let bls = catalog::get_source("bls").unwrap();
        assert_eq!(source_json(bls)["samples"][0], "LNS14000000");
    }
}
