//! Schema inference from JSON and CSV payloads

use super::formats::{is_csv, read_csv, PayloadFormat};
use super::rules::{coerce_number, FieldRole, RuleSet};
use super::types::SchemaProfile;
use crate::error::{Error, Result};
use crate::types::json_kind;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Schema inferencer with configuration options
#[derive(Debug, Clone, Default)]
pub struct SchemaInferencer {
    /// Role classification rules
    rules: RuleSet,
    /// Path to the records inside an envelope
    record_path: Option<String>,
    /// Names for positional rows (arrays of arrays without a header row)
    column_names: Option<Vec<String>>,
    /// Source-specific layout rewritten before the record path applies
    format: PayloadFormat,
}

/// One field and every sample seen for it, in record order
struct Column<'a> {
    name: String,
    samples: Vec<&'a Value>,
}

impl<'a> Column<'a> {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            samples: Vec::new(),
        }
    }
}

impl SchemaInferencer {
    /// Create an inferencer with the standard vocabulary
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom rule set
    #[must_use]
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Read records from a path such as `observations` or `$.data[*]`
    #[must_use]
    pub fn with_record_path(mut self, path: impl Into<String>) -> Self {
        self.record_path = Some(path.into());
        self
    }

    /// Name the columns of positional rows, e.g. `[timestamp, value]`
    #[must_use]
    pub fn with_column_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Rewrite a source-specific layout before inference
    #[must_use]
    pub fn with_format(mut self, format: PayloadFormat) -> Self {
        self.format = format;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn format(&self) -> PayloadFormat {
        self.format
    }

    /// Infer from a raw body, reading it as CSV when the content type says so
    /// and as JSON otherwise
    pub fn infer_body(&self, body: &str, content_type: Option<&str>) -> Result<SchemaProfile> {
        match content_type {
            Some(ct) if is_csv(ct) => self.infer_csv(body),
            _ => self.infer_str(body),
        }
    }

    /// Parse a raw JSON body and infer its profile
    pub fn infer_str(&self, body: &str) -> Result<SchemaProfile> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| Error::malformed(format!("response body is not valid JSON: {e}")))?;
        self.infer(&value)
    }

    /// Infer the profile of a CSV body. The first row is always the header.
    pub fn infer_csv(&self, body: &str) -> Result<SchemaProfile> {
        let (header, rows) = read_csv(body)?;
        let columns = fill_columns(header, &rows);
        Ok(self.profile(&columns, rows.len()))
    }

    /// Infer the profile of a parsed payload.
    ///
    /// Pure: the same body always yields the same profile.
    pub fn infer(&self, body: &Value) -> Result<SchemaProfile> {
        let body = self.format.normalize(body)?;
        let records = self.select_records(&body)?;
        let (columns, record_count) = self.columns(&records)?;
        Ok(self.profile(&columns, record_count))
    }

    /// Classify columns and pull out the value series
    fn profile(&self, columns: &[Column<'_>], record_count: usize) -> SchemaProfile {
        let mut roles = BTreeMap::new();
        let mut value_column = None;
        for (i, column) in columns.iter().enumerate() {
            let role = self.rules.classify(&column.name, &column.samples);
            if role == FieldRole::ValueMeasure && value_column.is_none() {
                value_column = Some(i);
            }
            roles.insert(column.name.clone(), role);
        }

        let (value_field, value_series) = match value_column {
            Some(i) => {
                let column = &columns[i];
                let series: Vec<f64> = column
                    .samples
                    .iter()
                    .filter_map(|v| coerce_number(v))
                    .collect();
                (Some(column.name.clone()), series)
            }
            None => (None, Vec::new()),
        };

        debug!(
            fields = columns.len(),
            records = record_count,
            value_field = value_field.as_deref().unwrap_or("-"),
            samples = value_series.len(),
            "Inferred schema profile"
        );

        SchemaProfile::new(roles, value_field, value_series, record_count)
    }

    /// Apply the record path, if any
    fn select_records<'a>(&self, body: &'a Value) -> Result<Cow<'a, Value>> {
        let Some(path) = self.record_path.as_deref() else {
            return Ok(Cow::Borrowed(body));
        };

        if path.contains('*') {
            return extract_with_jsonpath(body, path).map(Cow::Owned);
        }

        extract_simple_path(body, path)
            .map(Cow::Borrowed)
            .ok_or_else(|| Error::malformed(format!("record path '{path}' not found in payload")))
    }

    /// Split the payload into columns
    fn columns<'a>(&self, value: &'a Value) -> Result<(Vec<Column<'a>>, usize)> {
        match value {
            Value::Object(map) => {
                // Column-wise: array values contribute their elements
                let columns: Vec<Column<'a>> = map
                    .iter()
                    .map(|(key, val)| Column {
                        name: key.clone(),
                        samples: match val {
                            Value::Array(items) => items.iter().collect(),
                            other => vec![other],
                        },
                    })
                    .collect();
                let record_count = columns.iter().map(|c| c.samples.len()).max().unwrap_or(0);
                Ok((columns, record_count))
            }
            Value::Array(items) if items.is_empty() => Ok((Vec::new(), 0)),
            Value::Array(items) if items.iter().all(Value::is_object) => {
                Ok((row_columns(items), items.len()))
            }
            Value::Array(items) if items.iter().all(Value::is_array) => self.tabular_columns(items),
            Value::Array(items) => {
                let offending = items
                    .iter()
                    .find(|v| !v.is_object())
                    .map_or("value", json_kind);
                Err(Error::malformed(format!(
                    "expected an array of objects, found an array containing {offending}"
                )))
            }
            other => Err(Error::malformed(format!(
                "expected a JSON object or an array of objects, found {}",
                json_kind(other)
            ))),
        }
    }

    /// Columns from an array of arrays: named positions or a header row
    fn tabular_columns<'a>(&self, rows: &'a [Value]) -> Result<(Vec<Column<'a>>, usize)> {
        let (header, data): (Vec<String>, &'a [Value]) = match &self.column_names {
            Some(names) => (names.clone(), rows),
            None => {
                let header = rows
                    .first()
                    .and_then(Value::as_array)
                    .and_then(|cells| {
                        cells
                            .iter()
                            .map(|c| c.as_str().map(String::from))
                            .collect::<Option<Vec<_>>>()
                    })
                    .ok_or_else(|| {
                        Error::malformed(
                            "array of arrays has no header row and no column names were given",
                        )
                    })?;
                (header, &rows[1..])
            }
        };

        Ok((fill_columns(header, data), data.len()))
    }
}

/// Columns from positional rows under a header; short rows leave gaps
fn fill_columns(header: Vec<String>, rows: &[Value]) -> Vec<Column<'_>> {
    let mut columns: Vec<Column<'_>> = header.into_iter().map(Column::new).collect();
    for row in rows {
        if let Value::Array(cells) = row {
            for (column, cell) in columns.iter_mut().zip(cells) {
                column.samples.push(cell);
            }
        }
    }
    columns
}

/// Columns from an array of objects, fields in first-seen order
fn row_columns(records: &[Value]) -> Vec<Column<'_>> {
    let mut columns: Vec<Column<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        if let Value::Object(map) = record {
            for (key, val) in map {
                let i = *index.entry(key.as_str()).or_insert_with(|| {
                    columns.push(Column::new(key.as_str()));
                    columns.len() - 1
                });
                columns[i].samples.push(val);
            }
        }
    }
    columns
}

/// Infer a profile with the standard vocabulary (convenience function)
pub fn infer_profile(body: &Value) -> Result<SchemaProfile> {
    SchemaInferencer::new().infer(body)
}

/// Follow a dot path with optional `[n]` indices (negative counts from the end)
fn extract_simple_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    let mut current = value;

    for part in path.split('.').filter(|p| !p.is_empty()) {
        if let Some(bracket_pos) = part.find('[') {
            let name = &part[..bracket_pos];
            let index_str = part[bracket_pos + 1..].strip_suffix(']')?;

            if !name.is_empty() {
                current = current.get(name)?;
            }

            let index: i64 = index_str.parse().ok()?;
            let arr = current.as_array()?;
            let idx = if index < 0 {
                arr.len().checked_sub(index.unsigned_abs() as usize)?
            } else {
                index as usize
            };
            current = arr.get(idx)?;
        } else {
            current = current.get(part)?;
        }
    }

    Some(current)
}

/// Evaluate a wildcard JSONPath; the matches become the record array
fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Value> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path)
        .map_err(|e| Error::json_path(format!("Invalid JSONPath: {e}")))?;

    match jp.find(value) {
        Value::Null => Err(Error::malformed(format!(
            "record path '{path}' not found in payload"
        ))),
        Value::Array(arr) => Ok(Value::Array(arr)),
        other => Ok(Value::Array(vec![other])),
    }
}
