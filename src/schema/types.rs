//! Schema profile

use super::rules::FieldRole;
use serde::Serialize;
use std::collections::BTreeMap;

/// Roles and value series inferred from one response body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaProfile {
    detected_roles: BTreeMap<String, FieldRole>,
    value_field: Option<String>,
    value_series: Vec<f64>,
    has_time_dimension: bool,
    has_geo_dimension: bool,
    has_network_dimension: bool,
    record_count: usize,
}

impl SchemaProfile {
    /// Build a profile. The dimension flags are derived from the roles.
    pub fn new(
        detected_roles: BTreeMap<String, FieldRole>,
        value_field: Option<String>,
        value_series: Vec<f64>,
        record_count: usize,
    ) -> Self {
        let has = |role| detected_roles.values().any(|r| *r == role);
        let has_time_dimension = has(FieldRole::TimeDimension);
        let has_geo_dimension = has(FieldRole::GeoDimension);
        let has_network_dimension = has(FieldRole::NetworkDimension);

        Self {
            detected_roles,
            value_field,
            value_series,
            has_time_dimension,
            has_geo_dimension,
            has_network_dimension,
            record_count,
        }
    }

    pub fn detected_roles(&self) -> &BTreeMap<String, FieldRole> {
        &self.detected_roles
    }

    /// Role of a field, if the field was seen
    pub fn role_of(&self, field: &str) -> Option<FieldRole> {
        self.detected_roles.get(field).copied()
    }

    /// Names of all fields carrying `role`, in name order
    pub fn fields_with_role(&self, role: FieldRole) -> Vec<&str> {
        self.detected_roles
            .iter()
            .filter(|(_, r)| **r == role)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Field the value series was drawn from
    pub fn value_field(&self) -> Option<&str> {
        self.value_field.as_deref()
    }

    pub fn value_series(&self) -> &[f64] {
        &self.value_series
    }

    pub fn has_time_dimension(&self) -> bool {
        self.has_time_dimension
    }

    pub fn has_geo_dimension(&self) -> bool {
        self.has_geo_dimension
    }

    pub fn has_network_dimension(&self) -> bool {
        self.has_network_dimension
    }

    pub fn has_value_measure(&self) -> bool {
        self.detected_roles
            .values()
            .any(|r| *r == FieldRole::ValueMeasure)
    }

    /// Number of records (rows, or the longest column) in the payload
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Completeness verdict: a time or geo axis plus something to measure
    pub fn is_complete(&self) -> bool {
        (self.has_time_dimension || self.has_geo_dimension) && self.has_value_measure()
    }
}
