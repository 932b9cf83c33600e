//! Source-specific payload layouts
//!
//! Some institutional APIs nest their observations so deeply that no record
//! path reaches a flat table. A `PayloadFormat` rewrites such a body into an
//! array of `{date, value}` rows before inference sees it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::borrow::Cow;
use tracing::debug;

/// How to read a response body before inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    /// Read the body as it is
    #[default]
    Plain,
    /// IMF DataMapper (`values`) or IMF CompactData (`CompactData`)
    Imf,
    /// SDMX-JSON data message (ECB, OECD)
    SdmxJson,
    /// BLS timeseries response
    Bls,
}

impl PayloadFormat {
    /// Rewrite `body` into flat rows. `Plain` borrows the body unchanged.
    pub fn normalize<'a>(&self, body: &'a Value) -> Result<Cow<'a, Value>> {
        let rows = match self {
            PayloadFormat::Plain => return Ok(Cow::Borrowed(body)),
            PayloadFormat::Imf => imf_rows(body)?,
            PayloadFormat::SdmxJson => sdmx_rows(body)?,
            PayloadFormat::Bls => bls_rows(body)?,
        };
        debug!(format = ?self, rows = rows.len(), "Normalized payload");
        Ok(Cow::Owned(Value::Array(rows)))
    }
}

impl std::fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadFormat::Plain => write!(f, "plain"),
            PayloadFormat::Imf => write!(f, "imf"),
            PayloadFormat::SdmxJson => write!(f, "sdmx_json"),
            PayloadFormat::Bls => write!(f, "bls"),
        }
    }
}

// ============================================================================
// IMF
// ============================================================================

fn imf_rows(body: &Value) -> Result<Vec<Value>> {
    if let Some(compact) = body.get("CompactData") {
        return imf_compact_rows(compact);
    }
    if let Some(values) = body.get("values") {
        return imf_datamapper_rows(values);
    }
    Err(Error::malformed(
        "IMF payload has neither CompactData nor DataMapper values",
    ))
}

/// `values.<indicator>.<country>.<year>`; only the first indicator is read
fn imf_datamapper_rows(values: &Value) -> Result<Vec<Value>> {
    let countries = values
        .as_object()
        .and_then(|indicators| indicators.values().next())
        .and_then(Value::as_object)
        .ok_or_else(|| Error::malformed("IMF DataMapper values hold no indicator"))?;

    let mut rows = Vec::new();
    for (country, years) in countries {
        let Some(years) = years.as_object() else {
            continue;
        };
        for (year, value) in years {
            rows.push(json!({ "country": country, "date": year, "value": value }));
        }
    }
    Ok(rows)
}

/// `CompactData.DataSet.Series[].Obs[]`, where either level may be a
/// single object instead of a list
fn imf_compact_rows(compact: &Value) -> Result<Vec<Value>> {
    let series = compact
        .get("DataSet")
        .and_then(|d| d.get("Series"))
        .ok_or_else(|| Error::malformed("IMF CompactData has no DataSet.Series"))?;

    let mut rows = Vec::new();
    for s in one_or_many(series) {
        let country = s.get("@REF_AREA").cloned().unwrap_or(Value::Null);
        let Some(obs) = s.get("Obs") else {
            continue;
        };
        for o in one_or_many(obs) {
            rows.push(json!({
                "country": country,
                "date": o.get("@TIME_PERIOD").cloned().unwrap_or(Value::Null),
                "value": o.get("@OBS_VALUE").cloned().unwrap_or(Value::Null),
            }));
        }
    }
    Ok(rows)
}

fn one_or_many(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

// ============================================================================
// SDMX-JSON
// ============================================================================

/// First series of the first data set, dated by the observation dimension
fn sdmx_rows(body: &Value) -> Result<Vec<Value>> {
    let series = body
        .get("dataSets")
        .and_then(|d| d.get(0))
        .and_then(|d| d.get("series"))
        .and_then(Value::as_object)
        .ok_or_else(|| Error::malformed("SDMX-JSON payload has no dataSets[0].series"))?;

    let Some((key, first)) = series.iter().next() else {
        return Err(Error::malformed("SDMX-JSON data set holds no series"));
    };
    let observations = first
        .get("observations")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::malformed(format!("SDMX-JSON series '{key}' has no observations")))?;

    let periods = body
        .pointer("/structure/dimensions/observation/0/values")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            Error::malformed("SDMX-JSON structure has no observation dimension values")
        })?;

    let mut rows = Vec::with_capacity(observations.len());
    for (index, observation) in observations {
        let period = index
            .parse::<usize>()
            .ok()
            .and_then(|i| periods.get(i))
            .and_then(|p| p.get("name").or_else(|| p.get("id")))
            .cloned()
            .unwrap_or(Value::Null);
        let value = observation.get(0).cloned().unwrap_or(Value::Null);
        rows.push(json!({ "date": period, "value": value }));
    }
    Ok(rows)
}

// ============================================================================
// BLS
// ============================================================================

/// Monthly observations of every returned series, dated `YYYY-MM`.
/// Annual averages (`M13`) and non-monthly periods are skipped.
fn bls_rows(body: &Value) -> Result<Vec<Value>> {
    if let Some(status) = body.get("status").and_then(Value::as_str) {
        if status != "REQUEST_SUCCEEDED" {
            let message = body
                .get("message")
                .map(|m| match m {
                    Value::Array(parts) => parts
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join("; "),
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_default();
            return Err(Error::malformed(
                format!("BLS request failed: {status} {message}").trim_end(),
            ));
        }
    }

    let series = body
        .pointer("/Results/series")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::malformed("BLS payload has no Results.series"))?;

    let mut rows = Vec::new();
    for s in series {
        let series_id = s.get("seriesID").cloned().unwrap_or(Value::Null);
        let Some(data) = s.get("data").and_then(Value::as_array) else {
            continue;
        };
        for point in data {
            let year = point.get("year").and_then(Value::as_str);
            let month = point
                .get("period")
                .and_then(Value::as_str)
                .and_then(|p| p.strip_prefix('M'))
                .filter(|m| matches!(m.parse::<u8>(), Ok(1..=12)));
            let (Some(year), Some(month)) = (year, month) else {
                continue;
            };

            rows.push(json!({
                "series_id": series_id,
                "date": format!("{year}-{month}"),
                "value": point.get("value").cloned().unwrap_or(Value::Null),
            }));
        }
    }
    Ok(rows)
}

// ============================================================================
// CSV
// ============================================================================

/// Is this content type a CSV body
pub fn is_csv(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("csv")
}

/// Read a CSV body into a header row plus data rows of string cells.
/// Empty cells become `null`.
pub fn read_csv(body: &str) -> Result<(Vec<String>, Vec<Value>)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| Error::malformed(format!("response body is not valid CSV: {e}")))?
        .iter()
        .map(String::from)
        .collect();
    if header.iter().all(String::is_empty) {
        return Err(Error::malformed("CSV body has no header row"));
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| Error::malformed(format!("CSV row {} is invalid: {e}", idx + 1)))?;
        rows.push(Value::Array(
            record
                .iter()
                .map(|cell| {
                    if cell.is_empty() {
                        Value::Null
                    } else {
                        Value::String(cell.to_string())
                    }
                })
                .collect(),
        ));
    }

    Ok((sdmx_csv_header(header), rows))
}

/// Rename SDMX-CSV columns: `TIME_PERIOD`/`OBS_VALUE` become `date`/`value`,
/// and `REF_AREA`/`COUNTERPART_AREA` become `source`/`target` when both
/// are present.
fn sdmx_csv_header(mut header: Vec<String>) -> Vec<String> {
    let network = header.iter().any(|h| h == "REF_AREA")
        && header.iter().any(|h| h == "COUNTERPART_AREA");

    for name in &mut header {
        let renamed = match name.as_str() {
            "TIME_PERIOD" => "date",
            "OBS_VALUE" => "value",
            "REF_AREA" if network => "source",
            "COUNTERPART_AREA" if network => "target",
            _ => continue,
        };
        *name = renamed.to_string();
    }
    header
}
