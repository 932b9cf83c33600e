//! Built-in catalog of public data sources
//!
//! Turns a `(source, dataset)` pair into a ready `ValidationRequest`, so
//! users can run `source fred GDP` instead of assembling the URL, record
//! path and credential by hand.

use crate::auth::Credential;
use crate::error::{Error, Result};
use crate::schema::PayloadFormat;
use crate::validator::ValidationRequest;
use chrono::Datelike;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Source metadata for display and lookup
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub aliases: &'static [&'static str],
    /// What the dataset argument is
    pub dataset_hint: &'static str,
    /// Query parameter carrying the API key, if the source takes one
    pub api_key_param: Option<&'static str>,
    pub api_key_required: bool,
    pub sample_datasets: &'static [&'static str],
}

static SOURCES: &[SourceInfo] = &[
    SourceInfo {
        name: "fred",
        title: "FRED",
        description: "Federal Reserve Economic Data series observations",
        aliases: &["st-louis-fed"],
        dataset_hint: "series id",
        api_key_param: Some("api_key"),
        api_key_required: true,
        sample_datasets: &["GDP", "UNRATE", "CPIAUCSL"],
    },
    SourceInfo {
        name: "coingecko",
        title: "CoinGecko",
        description: "30-day USD market chart for a coin",
        aliases: &["crypto"],
        dataset_hint: "coin id",
        api_key_param: None,
        api_key_required: false,
        sample_datasets: &["bitcoin", "ethereum", "solana"],
    },
    SourceInfo {
        name: "imf",
        title: "IMF",
        description: "IMF DataMapper or SDMX data services",
        aliases: &[],
        dataset_hint: "full API URL",
        api_key_param: None,
        api_key_required: false,
        sample_datasets: &["https://www.imf.org/external/datamapper/api/v1/NGDP_RPCH"],
    },
    SourceInfo {
        name: "oecd",
        title: "OECD",
        description: "OECD SDMX data explorer",
        aliases: &[],
        dataset_hint: "full SDMX URL",
        api_key_param: None,
        api_key_required: false,
        sample_datasets: &[
            "https://sdmx.oecd.org/public/rest/data/OECD.SDD.STES,DSD_STES@DF_CLI/.M.LI...AA...H?format=jsondata",
        ],
    },
    SourceInfo {
        name: "ecb",
        title: "ECB",
        description: "European Central Bank data portal",
        aliases: &["ecb-sdw"],
        dataset_hint: "FLOW.KEY or FLOW/KEY",
        api_key_param: None,
        api_key_required: false,
        sample_datasets: &["EXR.D.USD.EUR.SP00.A", "ICP/M.U2.N.000000.4.ANR"],
    },
    SourceInfo {
        name: "census",
        title: "US Census",
        description: "US Census Bureau data API",
        aliases: &["us-census"],
        dataset_hint: "full API URL",
        api_key_param: Some("key"),
        api_key_required: false,
        sample_datasets: &["api.census.gov/data/2021/acs/acs1?get=NAME,B01001_001E&for=state:*"],
    },
    SourceInfo {
        name: "bls",
        title: "BLS",
        description: "US Bureau of Labor Statistics timeseries, last 20 years",
        aliases: &["labor-stats"],
        dataset_hint: "series id",
        api_key_param: Some("registrationkey"),
        api_key_required: false,
        sample_datasets: &["LNS14000000", "CUUR0000SA0", "CES0000000001"],
    },
];

const BLS_URL: &str = "https://api.bls.gov/publicAPI/v2/timeseries/data/";

/// Years of history requested from BLS, including the current one
const BLS_YEARS: i32 = 20;

/// Lookup by name or alias
static SOURCE_INDEX: LazyLock<HashMap<&'static str, &'static SourceInfo>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    for source in SOURCES {
        m.insert(source.name, source);
        for alias in source.aliases {
            m.insert(*alias, source);
        }
    }
    m
});

/// All built-in sources, in display order
pub fn list_sources() -> &'static [SourceInfo] {
    SOURCES
}

/// Find a source by name or alias, ignoring case
pub fn get_source(name: &str) -> Option<&'static SourceInfo> {
    SOURCE_INDEX
        .get(name.trim().to_ascii_lowercase().as_str())
        .copied()
}

pub fn is_known(name: &str) -> bool {
    get_source(name).is_some()
}

/// Build the validation request for a dataset of a built-in source
pub fn build_request(
    source: &str,
    dataset: &str,
    api_key: Option<&str>,
) -> Result<ValidationRequest> {
    let info = get_source(source).ok_or_else(|| Error::unknown_source(source))?;

    let dataset = dataset.trim();
    if dataset.is_empty() {
        return Err(Error::invalid_value(
            "dataset",
            format!("{} needs a {}", info.title, info.dataset_hint),
        ));
    }

    let api_key = api_key.map(str::trim).filter(|k| !k.is_empty());
    if info.api_key_required && api_key.is_none() {
        return Err(Error::missing_field("api_key"));
    }

    let mut request = match info.name {
        "fred" => fred(dataset)?,
        "coingecko" => coingecko(dataset)?,
        "imf" => ValidationRequest::new(full_url(info, dataset)?)
            .payload_format(PayloadFormat::Imf)
            .timeout(Duration::from_secs(45)),
        "oecd" => ValidationRequest::new(full_url(info, dataset)?)
            .header("Referer", "https://data-explorer.oecd.org/")
            .payload_format(PayloadFormat::SdmxJson)
            .timeout(Duration::from_secs(25)),
        "ecb" => ecb(dataset)?,
        "census" => census(dataset)?,
        "bls" => bls(dataset, api_key, chrono::Utc::now().year()),
        other => return Err(Error::unknown_source(other)),
    };

    match (api_key, info.api_key_param) {
        // BLS carries its key in the POST body
        (Some(_), Some(_)) if info.name == "bls" => {}
        (Some(key), Some(param)) => {
            request = request.credential(Credential::query_param(param, key));
        }
        (Some(_), None) => warn!(source = info.name, "Source takes no API key, ignoring it"),
        (None, _) => {}
    }

    debug!(source = info.name, dataset, url = request.url(), "Built catalog request");
    Ok(request)
}

fn fred(series_id: &str) -> Result<ValidationRequest> {
    let mut url = Url::parse("https://api.stlouisfed.org/fred/series/observations")?;
    url.query_pairs_mut()
        .append_pair("series_id", series_id)
        .append_pair("file_type", "json");

    Ok(ValidationRequest::new(url).record_path("observations"))
}

fn coingecko(coin_id: &str) -> Result<ValidationRequest> {
    let mut url = Url::parse("https://api.coingecko.com/api/v3/coins")?;
    url.path_segments_mut()
        .map_err(|()| Error::config("CoinGecko base URL cannot take path segments"))?
        .push(coin_id)
        .push("market_chart");
    url.query_pairs_mut()
        .append_pair("vs_currency", "usd")
        .append_pair("days", "30");

    Ok(ValidationRequest::new(url)
        .record_path("prices")
        .column_names(["timestamp", "value"]))
}

fn ecb(dataset: &str) -> Result<ValidationRequest> {
    // Short form "EXR.D.USD.EUR.SP00.A" is flow "EXR", key "D.USD.EUR.SP00.A"
    let resource = match dataset.split_once('.') {
        Some((flow, key)) if !dataset.contains('/') => format!("{flow}/{key}"),
        _ => dataset.to_string(),
    };

    let mut url = Url::parse("https://data-api.ecb.europa.eu/service/data/")?.join(&resource)?;
    url.query_pairs_mut().append_pair("format", "jsondata");

    Ok(ValidationRequest::new(url)
        .header("Accept", "application/json")
        .payload_format(PayloadFormat::SdmxJson)
        .timeout(Duration::from_secs(15)))
}

fn bls(series_id: &str, api_key: Option<&str>, end_year: i32) -> ValidationRequest {
    ValidationRequest::new(BLS_URL)
        .json_body(bls_payload(series_id, api_key, end_year))
        .payload_format(PayloadFormat::Bls)
        .timeout(Duration::from_secs(10))
}

fn bls_payload(series_id: &str, api_key: Option<&str>, end_year: i32) -> Value {
    let mut payload = json!({
        "seriesid": [series_id],
        "startyear": (end_year - BLS_YEARS + 1).to_string(),
        "endyear": end_year.to_string(),
    });
    if let Some(key) = api_key {
        payload["registrationkey"] = Value::String(key.to_string());
    }
    payload
}

fn census(dataset: &str) -> Result<ValidationRequest> {
    let url = if dataset.starts_with("http") {
        dataset.to_string()
    } else {
        format!("https://{dataset}")
    };
    Url::parse(&url)?;
    Ok(ValidationRequest::new(url))
}

/// Sources that take a pasted URL instead of an id
fn full_url(info: &SourceInfo, dataset: &str) -> Result<String> {
    if !dataset.starts_with("http") {
        return Err(Error::invalid_value(
            "dataset",
            format!(
                "{} datasets must be a full API URL starting with http or https",
                info.title
            ),
        ));
    }
    Url::parse(dataset)?;
    Ok(dataset.to_string())
}
