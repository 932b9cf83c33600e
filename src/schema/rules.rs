//! Field role rules
//!
//! Classification walks an ordered list of `RoleRule`s and stops at the
//! first match. Rules are kept grouped by role rank so that Time beats Geo,
//! Geo beats Network, and every name rule beats the numeric fallback.

use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Semantic role of a top-level field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    TimeDimension,
    GeoDimension,
    NetworkDimension,
    ValueMeasure,
    Unclassified,
}

impl FieldRole {
    /// Position of this role's rules in the rule list
    fn rank(self) -> u8 {
        match self {
            FieldRole::TimeDimension => 0,
            FieldRole::GeoDimension => 1,
            FieldRole::NetworkDimension => 2,
            // Explicit exclusions (identifiers) must run before the numeric rule
            FieldRole::Unclassified => 3,
            FieldRole::ValueMeasure => 4,
        }
    }
}

impl std::fmt::Display for FieldRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldRole::TimeDimension => write!(f, "time"),
            FieldRole::GeoDimension => write!(f, "geo"),
            FieldRole::NetworkDimension => write!(f, "network"),
            FieldRole::ValueMeasure => write!(f, "value"),
            FieldRole::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// How a rule decides whether a field matches
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Lowercased field name contains the substring
    Contains(String),
    /// One of the field name's words equals the token
    Token(String),
    /// Case-insensitive regular expression on the field name
    Pattern(Regex),
    /// Field samples are mostly numbers
    Numeric,
}

impl Matcher {
    pub fn contains(needle: impl AsRef<str>) -> Self {
        Self::Contains(needle.as_ref().to_lowercase())
    }

    pub fn token(token: impl AsRef<str>) -> Self {
        Self::Token(token.as_ref().to_lowercase())
    }

    /// Compile a case-insensitive name pattern
    pub fn pattern(pattern: &str) -> Result<Self> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(Self::Pattern)
            .map_err(|e| Error::invalid_value("vocabulary.pattern", e.to_string()))
    }

    fn matches(&self, name: &FieldName<'_>, samples: &[&Value]) -> bool {
        match self {
            Matcher::Contains(needle) => name.lowered.contains(needle.as_str()),
            Matcher::Token(token) => name.tokens.iter().any(|t| t == token),
            Matcher::Pattern(re) => re.is_match(name.raw),
            Matcher::Numeric => is_numeric_column(samples),
        }
    }
}

/// A single classification rule
#[derive(Debug, Clone)]
pub struct RoleRule {
    pub role: FieldRole,
    pub matcher: Matcher,
}

impl RoleRule {
    pub fn new(role: FieldRole, matcher: Matcher) -> Self {
        Self { role, matcher }
    }
}

/// Ordered rule list
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<RoleRule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleSet {
    /// A rule set with no rules; every field is `Unclassified`
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The built-in vocabulary
    pub fn standard() -> Self {
        let mut set = Self::empty();

        for word in ["date", "time", "year", "period"] {
            set.push(RoleRule::new(FieldRole::TimeDimension, Matcher::contains(word)));
        }

        for word in ["country", "iso", "geo", "region"] {
            set.push(RoleRule::new(FieldRole::GeoDimension, Matcher::contains(word)));
        }
        for word in [
            "lat", "lon", "lng", "long", "latitude", "longitude", "state", "county", "city",
            "province", "area",
        ] {
            set.push(RoleRule::new(FieldRole::GeoDimension, Matcher::token(word)));
        }

        for word in ["network", "carrier", "operator", "partner", "counterpart"] {
            set.push(RoleRule::new(
                FieldRole::NetworkDimension,
                Matcher::contains(word),
            ));
        }
        for word in ["from", "to", "source", "target"] {
            set.push(RoleRule::new(FieldRole::NetworkDimension, Matcher::token(word)));
        }

        for word in ["id", "uuid"] {
            set.push(RoleRule::new(FieldRole::Unclassified, Matcher::token(word)));
        }

        set.push(RoleRule::new(FieldRole::ValueMeasure, Matcher::Numeric));
        set
    }

    /// Add a rule after the existing rules of the same rank
    pub fn push(&mut self, rule: RoleRule) {
        let rank = rule.role.rank();
        let pos = self
            .rules
            .iter()
            .rposition(|r| r.role.rank() <= rank)
            .map_or(0, |i| i + 1);
        self.rules.insert(pos, rule);
    }

    /// Builder-style `push`
    #[must_use]
    pub fn with_rule(mut self, rule: RoleRule) -> Self {
        self.push(rule);
        self
    }

    pub fn rules(&self) -> &[RoleRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Role of the first matching rule, or `Unclassified`
    pub fn classify(&self, name: &str, samples: &[&Value]) -> FieldRole {
        let name = FieldName::new(name);
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(&name, samples))
            .map_or(FieldRole::Unclassified, |rule| rule.role)
    }
}

/// Field name prepared for matching
struct FieldName<'a> {
    raw: &'a str,
    lowered: String,
    tokens: Vec<String>,
}

impl<'a> FieldName<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            raw,
            lowered: raw.to_lowercase(),
            tokens: tokenize(raw),
        }
    }
}

/// Split a field name into lowercase words.
///
/// Splits on anything non-alphanumeric and on camelCase boundaries:
/// `geo_code` → [geo, code], `fromNode` → [from, node].
pub fn tokenize(name: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in name.chars() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_numeric();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Coerce a JSON sample to a finite number.
///
/// Numeric strings (`"12.5"`, `" 3 "`) count; booleans, nulls and FRED's
/// `"."` placeholder do not.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// At least one numeric sample, and numbers make up at least half of the
/// non-null samples
fn is_numeric_column(samples: &[&Value]) -> bool {
    let non_null = samples.iter().filter(|v| !v.is_null()).count();
    let numeric = samples.iter().filter(|v| coerce_number(v).is_some()).count();
    numeric > 0 && numeric * 2 >= non_null
}
