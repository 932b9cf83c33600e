//! Validator configuration
//!
//! Everything here has a default, so an empty YAML document is a valid
//! configuration:
//!
//! ```yaml
//! probe:
//!   timeout_secs: 20
//!   masquerade: true
//!   default_headers:
//!     X-Client: dashboard
//! scoring:
//!   min_volatility: 0.1
//! vocabulary:
//!   - role: network_dimension
//!     token: corridor
//!   - role: geo_dimension
//!     pattern: "^(nuts|fips)_?code$"
//! ```

use crate::error::{Error, Result};
use crate::probe::ProbeConfig;
use crate::schema::{FieldRole, Matcher, RoleRule, RuleSet};
use crate::score::VisualPotentialScorer;
use crate::types::StringMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete validator configuration loaded from YAML
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Probe settings
    pub probe: ProbeSettings,

    /// Visual potential thresholds
    pub scoring: VisualPotentialScorer,

    /// Extra role rules appended to the standard vocabulary
    pub vocabulary: Vec<VocabularyEntry>,
}

impl ValidatorConfig {
    /// Load a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse a configuration from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // An empty document deserializes as null
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse config YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.probe.timeout_secs == 0 {
            return Err(Error::invalid_value(
                "probe.timeout_secs",
                "must be greater than zero",
            ));
        }

        let scoring = &self.scoring;
        if !scoring.min_volatility.is_finite() || scoring.min_volatility < 0.0 {
            return Err(Error::invalid_value(
                "scoring.min_volatility",
                "must be a non-negative number",
            ));
        }
        if scoring.medium_min_samples > scoring.fine_min_samples {
            return Err(Error::invalid_value(
                "scoring.medium_min_samples",
                format!(
                    "must not exceed fine_min_samples ({})",
                    scoring.fine_min_samples
                ),
            ));
        }

        for entry in &self.vocabulary {
            entry.matcher()?;
        }

        Ok(())
    }

    /// Build the prober configuration
    pub fn probe_config(&self) -> ProbeConfig {
        let settings = &self.probe;
        let mut builder = ProbeConfig::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .accept_invalid_certs(settings.accept_invalid_certs);

        if !settings.masquerade {
            builder = builder.no_masquerade();
        }
        if let Some(ref agent) = settings.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        for (key, value) in &settings.default_headers {
            builder = builder.header(key.clone(), value.clone());
        }

        builder.build()
    }

    /// Standard vocabulary plus the configured entries
    pub fn rule_set(&self) -> Result<RuleSet> {
        let mut rules = RuleSet::standard();
        for entry in &self.vocabulary {
            rules.push(RoleRule::new(entry.role, entry.matcher()?));
        }
        Ok(rules)
    }

    pub fn scorer(&self) -> VisualPotentialScorer {
        self.scoring
    }
}

// ============================================================================
// Probe
// ============================================================================

/// Probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Send browser-like default headers
    pub masquerade: bool,

    /// Replace the default user agent
    pub user_agent: Option<String>,

    /// Extra default headers, applied under per-request headers
    pub default_headers: StringMap,

    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            masquerade: true,
            user_agent: None,
            default_headers: StringMap::new(),
            accept_invalid_certs: false,
        }
    }
}

// ============================================================================
// Vocabulary
// ============================================================================

/// One extra role rule. Exactly one of `contains`, `token` or `pattern`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub role: FieldRole,

    #[serde(default)]
    pub contains: Option<String>,

    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub pattern: Option<String>,
}

impl VocabularyEntry {
    /// Build the matcher this entry describes
    pub fn matcher(&self) -> Result<Matcher> {
        match (&self.contains, &self.token, &self.pattern) {
            (Some(needle), None, None) => Ok(Matcher::contains(needle)),
            (None, Some(token), None) => Ok(Matcher::token(token)),
            (None, None, Some(pattern)) => Matcher::pattern(pattern),
            (None, None, None) => Err(Error::invalid_value(
                "vocabulary",
                format!(
                    "entry for role '{}' needs one of contains, token or pattern",
                    self.role
                ),
            )),
            _ => Err(Error::invalid_value(
                "vocabulary",
                format!(
                    "entry for role '{}' sets more than one of contains, token and pattern",
                    self.role
                ),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::BROWSER_USER_AGENT;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ValidatorConfig::from_yaml_str("").unwrap();

        assert_eq!(config.probe.timeout_secs, 30);
        assert!(config.probe.masquerade);
        assert_eq!(config.scoring, VisualPotentialScorer::default());
        assert!(config.vocabulary.is_empty());
    }

    #[test]
    fn test_partial_config() {
        let yaml = r#"
probe:
  timeout_secs: 5
scoring:
  min_volatility: 0.2
"#;
        let config = ValidatorConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.probe.timeout_secs, 5);
        assert!(config.probe.masquerade);
        assert_eq!(config.scoring.min_volatility, 0.2);
        assert_eq!(config.scoring.fine_min_samples, 100);
    }

    #[test]
    fn test_probe_config_conversion() {
        let yaml = r#"
probe:
  timeout_secs: 7
  user_agent: probe/1.0
  default_headers:
    X-Client: dashboard
"#;
        let config = ValidatorConfig::from_yaml_str(yaml).unwrap();
        let probe = config.probe_config();

        assert_eq!(probe.timeout, Duration::from_secs(7));
        assert_eq!(
            probe.default_headers.get("User-Agent").map(String::as_str),
            Some("probe/1.0")
        );
        assert_eq!(
            probe.default_headers.get("X-Client").map(String::as_str),
            Some("dashboard")
        );
    }

    #[test]
    fn test_masquerade_default_and_disabled() {
        let config = ValidatorConfig::default();
        assert_eq!(
            config.probe_config().default_headers.get("User-Agent").map(String::as_str),
            Some(BROWSER_USER_AGENT)
        );

        let config = ValidatorConfig::from_yaml_str("probe:\n  masquerade: false\n").unwrap();
        assert!(config.probe_config().default_headers.is_empty());
    }

    #[test]
    fn test_vocabulary_extends_standard_rules() {
        let yaml = r#"
vocabulary:
  - role: network_dimension
    token: corridor
  - role: geo_dimension
    pattern: "^fips_?code$"
"#;
        let config = ValidatorConfig::from_yaml_str(yaml).unwrap();
        let rules = config.rule_set().unwrap();

        assert_eq!(rules.len(), RuleSet::standard().len() + 2);
        let sample = json!("x");
        assert_eq!(
            rules.classify("trade_corridor", &[&sample]),
            FieldRole::NetworkDimension
        );
        assert_eq!(rules.classify("FIPS_CODE", &[&sample]), FieldRole::GeoDimension);
    }

    #[test]
    fn test_vocabulary_entry_needs_one_matcher() {
        let err = ValidatorConfig::from_yaml_str("vocabulary:\n  - role: geo_dimension\n")
            .unwrap_err();
        assert!(err.to_string().contains("needs one of"));

        let yaml = "vocabulary:\n  - role: geo_dimension\n    token: a\n    contains: b\n";
        let err = ValidatorConfig::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("more than one"));
    }

    #[test]
    fn test_invalid_vocabulary_pattern() {
        let yaml = "vocabulary:\n  - role: geo_dimension\n    pattern: \"(unclosed\"\n";
        assert!(ValidatorConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let yaml = "vocabulary:\n  - role: colour\n    token: red\n";
        let err = ValidatorConfig::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config YAML"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(ValidatorConfig::from_yaml_str("probe:\n  timeout_secs: 0\n").is_err());
        assert!(ValidatorConfig::from_yaml_str("scoring:\n  min_volatility: -1\n").is_err());

        let yaml = "scoring:\n  medium_min_samples: 50\n  fine_min_samples: 10\n";
        let err = ValidatorConfig::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("scoring.medium_min_samples"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "probe:\n  timeout_secs: 12").unwrap();

        let config = ValidatorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.probe.timeout_secs, 12);
    }

    #[test]
    fn test_missing_file() {
        let err = ValidatorConfig::from_file("/nonexistent/validator.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
