//! Schema inference tests

use super::*;
use crate::error::Error;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

#[test]
fn test_date_and_value_columns() {
    let body = json!({"date": ["2020", "2021"], "value": [1, 100]});

    let profile = infer_profile(&body).unwrap();

    assert_eq!(profile.role_of("date"), Some(FieldRole::TimeDimension));
    assert_eq!(profile.role_of("value"), Some(FieldRole::ValueMeasure));
    assert_eq!(profile.detected_roles().len(), 2);
    assert_eq!(profile.value_series(), &[1.0, 100.0]);
    assert_eq!(profile.value_field(), Some("value"));
    assert_eq!(profile.record_count(), 2);
    assert!(profile.has_time_dimension());
    assert!(!profile.has_geo_dimension());
    assert!(profile.is_complete());
}

#[test]
fn test_identifier_only_payload() {
    let body = json!({"id": [1, 2, 3]});

    let profile = infer_profile(&body).unwrap();

    assert_eq!(profile.role_of("id"), Some(FieldRole::Unclassified));
    assert!(!profile.has_time_dimension());
    assert!(!profile.has_geo_dimension());
    assert!(!profile.has_value_measure());
    assert!(profile.value_series().is_empty());
    assert!(!profile.is_complete());
}

#[test]
fn test_infer_is_idempotent() {
    let body = json!([
        {"country": "FRA", "year": 2020, "gdp": 2.1},
        {"country": "USA", "year": 2020, "gdp": "3.4"},
    ]);
    let inferencer = SchemaInferencer::new();

    let first = inferencer.infer(&body).unwrap();
    let second = inferencer.infer(&body).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_array_of_records() {
    let body = json!([
        {"date": "2024-01-01", "country": "FRA", "value": "1.5"},
        {"date": "2024-02-01", "country": "FRA", "value": "."},
        {"date": "2024-03-01", "country": "FRA", "value": 2.5},
    ]);

    let profile = infer_profile(&body).unwrap();

    assert_eq!(profile.role_of("country"), Some(FieldRole::GeoDimension));
    assert_eq!(profile.role_of("value"), Some(FieldRole::ValueMeasure));
    // "." is dropped, order is kept
    assert_eq!(profile.value_series(), &[1.5, 2.5]);
    assert_eq!(profile.record_count(), 3);
    assert!(profile.has_time_dimension());
    assert!(profile.has_geo_dimension());
    assert!(profile.is_complete());
}

#[test]
fn test_records_with_missing_fields() {
    let body = json!([
        {"period": "2024-Q1", "obs": 10},
        {"period": "2024-Q2"},
        {"period": "2024-Q3", "obs": 30, "note": "revised"},
    ]);

    let profile = infer_profile(&body).unwrap();

    assert_eq!(profile.value_series(), &[10.0, 30.0]);
    assert_eq!(profile.role_of("note"), Some(FieldRole::Unclassified));
}

#[test_case("date", FieldRole::TimeDimension; "date")]
#[test_case("TIME_PERIOD", FieldRole::TimeDimension; "sdmx time period")]
#[test_case("realtime_start", FieldRole::TimeDimension; "substring time")]
#[test_case("Year", FieldRole::TimeDimension; "case insensitive")]
#[test_case("country_name", FieldRole::GeoDimension; "country")]
#[test_case("ISO3", FieldRole::GeoDimension; "iso")]
#[test_case("geo_code", FieldRole::GeoDimension; "geo")]
#[test_case("lat", FieldRole::GeoDimension; "lat token")]
#[test_case("network_type", FieldRole::NetworkDimension; "network")]
#[test_case("Carrier", FieldRole::NetworkDimension; "carrier")]
#[test_case("source", FieldRole::NetworkDimension; "source token")]
#[test_case("to", FieldRole::NetworkDimension; "to token")]
#[test_case("series_id", FieldRole::Unclassified; "identifier")]
#[test_case("label", FieldRole::Unclassified; "text")]
fn test_name_classification(name: &str, expected: FieldRole) {
    let mut record = serde_json::Map::new();
    record.insert(name.to_string(), json!("x"));
    let body = serde_json::Value::Array(vec![serde_json::Value::Object(record)]);
    let profile = infer_profile(&body).unwrap();
    assert_eq!(profile.role_of(name), Some(expected));
}

#[test]
fn test_word_tokens_do_not_match_inside_words() {
    let body = json!([{"population": 10, "total": 3}]);
    let profile = infer_profile(&body).unwrap();

    // "lat" inside "population" and "to" inside "total" are not words
    assert_eq!(profile.role_of("population"), Some(FieldRole::ValueMeasure));
    assert_eq!(profile.role_of("total"), Some(FieldRole::ValueMeasure));
}

#[test]
fn test_tie_break_prefers_time_over_geo() {
    let body = json!([{"country_year": 2020, "region_operator": "x", "geo_network": "y"}]);
    let profile = infer_profile(&body).unwrap();

    assert_eq!(profile.role_of("country_year"), Some(FieldRole::TimeDimension));
    assert_eq!(profile.role_of("region_operator"), Some(FieldRole::GeoDimension));
    assert_eq!(profile.role_of("geo_network"), Some(FieldRole::GeoDimension));
}

#[test]
fn test_numeric_name_match_beats_value() {
    // A numeric year column is a time axis, not the measure
    let body = json!({"year": [2019, 2020, 2021], "rate": [1.0, 1.2, 0.9]});
    let profile = infer_profile(&body).unwrap();

    assert_eq!(profile.role_of("year"), Some(FieldRole::TimeDimension));
    assert_eq!(profile.value_field(), Some("rate"));
}

#[test]
fn test_first_value_field_in_document_order() {
    let body = json!({"date": ["2020", "2021"], "price": [5, 6], "volume": [100, 200]});
    let profile = infer_profile(&body).unwrap();

    assert_eq!(profile.fields_with_role(FieldRole::ValueMeasure), vec!["price", "volume"]);
    assert_eq!(profile.value_field(), Some("price"));
    assert_eq!(profile.value_series(), &[5.0, 6.0]);
}

#[test]
fn test_mostly_text_column_is_not_numeric() {
    let body = json!({"date": ["a", "b", "c"], "status": ["ok", "ok", "1"]});
    let profile = infer_profile(&body).unwrap();

    assert_eq!(profile.role_of("status"), Some(FieldRole::Unclassified));
    assert!(!profile.is_complete());
}

#[test]
fn test_booleans_are_not_numeric() {
    let body = json!([{"flag": true}, {"flag": false}]);
    let profile = infer_profile(&body).unwrap();
    assert_eq!(profile.role_of("flag"), Some(FieldRole::Unclassified));
}

#[test]
fn test_scalar_object_is_single_record() {
    let body = json!({"country": "USA", "value": 42});
    let profile = infer_profile(&body).unwrap();

    assert_eq!(profile.record_count(), 1);
    assert_eq!(profile.value_series(), &[42.0]);
    assert!(profile.is_complete());
}

#[test]
fn test_empty_array_yields_empty_profile() {
    let profile = infer_profile(&json!([])).unwrap();

    assert!(profile.detected_roles().is_empty());
    assert!(profile.value_series().is_empty());
    assert_eq!(profile.record_count(), 0);
    assert!(!profile.is_complete());
}

#[test]
fn test_tabular_with_header_row() {
    let body = json!([
        ["NAME", "POP", "state"],
        ["Alabama", "5024279", "01"],
        ["Alaska", "733391", "02"],
    ]);

    let profile = infer_profile(&body).unwrap();

    assert_eq!(profile.record_count(), 2);
    assert_eq!(profile.value_field(), Some("POP"));
    assert_eq!(profile.value_series(), &[5_024_279.0, 733_391.0]);
    assert_eq!(profile.role_of("state"), Some(FieldRole::GeoDimension));
    assert!(profile.is_complete());
}

#[test]
fn test_tabular_with_column_names() {
    let body = json!({"prices": [[1_700_000_000_000_i64, 35000.5], [1_700_086_400_000_i64, 36100.0]]});

    let profile = SchemaInferencer::new()
        .with_record_path("prices")
        .with_column_names(["timestamp", "value"])
        .infer(&body)
        .unwrap();

    assert_eq!(profile.role_of("timestamp"), Some(FieldRole::TimeDimension));
    assert_eq!(profile.value_series(), &[35000.5, 36100.0]);
    assert!(profile.is_complete());
}

#[test]
fn test_tabular_without_header_is_malformed() {
    let err = infer_profile(&json!([[1, 2], [3, 4]])).unwrap_err();
    assert!(matches!(err, Error::MalformedPayload { .. }));
}

#[test]
fn test_record_path() {
    let body = json!({
        "count": 2,
        "observations": [
            {"date": "2024-01-01", "value": "27956.998"},
            {"date": "2024-04-01", "value": "28255.928"},
        ]
    });

    let profile = SchemaInferencer::new()
        .with_record_path("observations")
        .infer(&body)
        .unwrap();

    assert_eq!(profile.value_series(), &[27956.998, 28255.928]);
    assert!(profile.role_of("count").is_none());
}

#[test]
fn test_record_path_with_index() {
    let body = json!({"data": [{"rows": [{"year": 2020, "v": 1}]}, {"rows": []}]});

    let profile = SchemaInferencer::new()
        .with_record_path("$.data[0].rows")
        .infer(&body)
        .unwrap();
    assert_eq!(profile.value_series(), &[1.0]);

    let profile = SchemaInferencer::new()
        .with_record_path("data[-1].rows")
        .infer(&body)
        .unwrap();
    assert_eq!(profile.record_count(), 0);
}

#[test]
fn test_missing_record_path_is_malformed() {
    let err = SchemaInferencer::new()
        .with_record_path("results")
        .infer(&json!({"data": []}))
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Malformed payload: record path 'results' not found in payload"
    );
}

#[test]
fn test_wildcard_record_path() {
    let body = json!({"series": [
        {"obs": {"date": "2020", "value": 1}},
        {"obs": {"date": "2021", "value": 3}},
    ]});

    let profile = SchemaInferencer::new()
        .with_record_path("$.series[*].obs")
        .infer(&body)
        .unwrap();

    assert_eq!(profile.value_series(), &[1.0, 3.0]);
}

#[test_case(json!(42), "number"; "number")]
#[test_case(json!("text"), "string"; "string")]
#[test_case(json!(null), "null"; "null")]
#[test_case(json!([1, 2, 3]), "number"; "array of numbers")]
#[test_case(json!([{"a": 1}, "b"]), "string"; "mixed array")]
fn test_malformed_payloads(body: serde_json::Value, kind: &str) {
    let err = infer_profile(&body).unwrap_err();
    assert!(matches!(err, Error::MalformedPayload { .. }));
    assert!(err.to_string().contains(kind));
}

#[test]
fn test_infer_str_rejects_invalid_json() {
    let err = SchemaInferencer::new().infer_str("<html>").unwrap_err();
    assert!(err
        .to_string()
        .starts_with("Malformed payload: response body is not valid JSON"));
}

#[test]
fn test_custom_rules() {
    let rules = RuleSet::standard()
        .with_rule(RoleRule::new(
            FieldRole::GeoDimension,
            Matcher::pattern("^(provincia|estado)$").unwrap(),
        ))
        .with_rule(RoleRule::new(FieldRole::TimeDimension, Matcher::contains("fecha")));

    let body = json!([{"Estado": "Jalisco", "Fecha": "2024", "OBS_VALUE": 1.0}]);
    let profile = SchemaInferencer::new().with_rules(rules).infer(&body).unwrap();

    assert_eq!(profile.role_of("Estado"), Some(FieldRole::GeoDimension));
    assert_eq!(profile.role_of("Fecha"), Some(FieldRole::TimeDimension));
    assert_eq!(profile.role_of("OBS_VALUE"), Some(FieldRole::ValueMeasure));
}

#[test]
fn test_pushed_rules_keep_priority_order() {
    let rules = RuleSet::empty()
        .with_rule(RoleRule::new(FieldRole::ValueMeasure, Matcher::Numeric))
        .with_rule(RoleRule::new(FieldRole::GeoDimension, Matcher::contains("zone")))
        .with_rule(RoleRule::new(FieldRole::TimeDimension, Matcher::contains("zone")));

    let roles: Vec<FieldRole> = rules.rules().iter().map(|r| r.role).collect();
    assert_eq!(
        roles,
        vec![
            FieldRole::TimeDimension,
            FieldRole::GeoDimension,
            FieldRole::ValueMeasure
        ]
    );
    assert_eq!(rules.classify("time_zone", &[]), FieldRole::TimeDimension);
}

#[test]
fn test_empty_rules_classify_nothing() {
    let profile = SchemaInferencer::new()
        .with_rules(RuleSet::empty())
        .infer(&json!({"date": ["2020"], "value": [1]}))
        .unwrap();

    assert!(profile
        .detected_roles()
        .values()
        .all(|r| *r == FieldRole::Unclassified));
}

#[test]
fn test_invalid_pattern() {
    assert!(Matcher::pattern("(unclosed").is_err());
}

#[test]
fn test_tokenize() {
    assert_eq!(tokenize("geo_code"), vec!["geo", "code"]);
    assert_eq!(tokenize("fromNode"), vec!["from", "node"]);
    assert_eq!(tokenize("Counterpart area"), vec!["counterpart", "area"]);
    assert_eq!(tokenize("OBS_VALUE"), vec!["obs", "value"]);
}

#[test]
fn test_coerce_number() {
    assert_eq!(coerce_number(&json!(3)), Some(3.0));
    assert_eq!(coerce_number(&json!(" 2.5 ")), Some(2.5));
    assert_eq!(coerce_number(&json!(".")), None);
    assert_eq!(coerce_number(&json!("NaN")), None);
    assert_eq!(coerce_number(&json!(true)), None);
    assert_eq!(coerce_number(&json!(null)), None);
}

// ============================================================================
// Source Layouts
// ============================================================================

#[test]
fn test_imf_datamapper_layout() {
    let body = json!({
        "values": {
            "NGDP_RPCH": {
                "DEU": {"2021": 3.2, "2022": 1.8, "2023": -0.3},
                "FRA": {"2021": 6.4, "2022": 2.5, "2023": 0.9}
            }
        },
        "api": {"version": "1", "output-method": "json"}
    });

    let profile = SchemaInferencer::new()
        .with_format(PayloadFormat::Imf)
        .infer(&body)
        .unwrap();

    assert_eq!(profile.role_of("country"), Some(FieldRole::GeoDimension));
    assert_eq!(profile.role_of("date"), Some(FieldRole::TimeDimension));
    assert_eq!(profile.value_field(), Some("value"));
    assert_eq!(profile.value_series(), &[3.2, 1.8, -0.3, 6.4, 2.5, 0.9]);
    assert_eq!(profile.record_count(), 6);
    assert!(profile.is_complete());
}

#[test]
fn test_imf_compact_data_single_series() {
    // One series and one observation arrive as objects, not lists
    let body = json!({
        "CompactData": {
            "@xmlns": "http://www.SDMX.org/resources/SDMXML/schemas/v2_0/message",
            "DataSet": {
                "Series": {
                    "@FREQ": "A",
                    "@REF_AREA": "US",
                    "@INDICATOR": "NGDP_R_XDC",
                    "Obs": {"@TIME_PERIOD": "2022", "@OBS_VALUE": "20014.128"}
                }
            }
        }
    });

    let profile = SchemaInferencer::new()
        .with_format(PayloadFormat::Imf)
        .infer(&body)
        .unwrap();

    assert_eq!(profile.value_series(), &[20014.128]);
    assert_eq!(profile.record_count(), 1);
    assert!(profile.has_geo_dimension());
}

#[test]
fn test_imf_compact_data_many_series() {
    let body = json!({
        "CompactData": {
            "DataSet": {
                "Series": [
                    {
                        "@REF_AREA": "GB",
                        "Obs": [
                            {"@TIME_PERIOD": "2021-01", "@OBS_VALUE": "1.2"},
                            {"@TIME_PERIOD": "2021-02", "@OBS_VALUE": "1.4"}
                        ]
                    },
                    {
                        "@REF_AREA": "JP",
                        "Obs": [{"@TIME_PERIOD": "2021-01", "@OBS_VALUE": "0.1"}]
                    }
                ]
            }
        }
    });

    let profile = SchemaInferencer::new()
        .with_format(PayloadFormat::Imf)
        .infer(&body)
        .unwrap();

    assert_eq!(profile.value_series(), &[1.2, 1.4, 0.1]);
    assert!(profile.is_complete());
}

#[test]
fn test_imf_unknown_layout() {
    let err = SchemaInferencer::new()
        .with_format(PayloadFormat::Imf)
        .infer(&json!({"data": []}))
        .unwrap_err();
    assert!(matches!(err, Error::MalformedPayload { .. }));
}

#[test]
fn test_sdmx_json_layout() {
    let body = json!({
        "header": {"id": "a1b2", "prepared": "2024-05-02T10:00:00Z"},
        "dataSets": [{
            "action": "Replace",
            "series": {
                "0:0:0:0:0": {
                    "attributes": [0, null, 0],
                    "observations": {
                        "0": [1.0856, 0],
                        "1": [1.0812, 0],
                        "2": [1.0874, 0]
                    }
                },
                "0:1:0:0:0": {
                    "observations": {"0": [150.2]}
                }
            }
        }],
        "structure": {
            "dimensions": {
                "series": [{"id": "FREQ", "values": [{"id": "D", "name": "Daily"}]}],
                "observation": [{
                    "id": "TIME_PERIOD",
                    "values": [
                        {"id": "2024-04-29", "name": "2024-04-29"},
                        {"id": "2024-04-30", "name": "2024-04-30"},
                        {"id": "2024-05-01", "name": "2024-05-01"}
                    ]
                }]
            }
        }
    });

    let profile = SchemaInferencer::new()
        .with_format(PayloadFormat::SdmxJson)
        .infer(&body)
        .unwrap();

    assert_eq!(profile.role_of("date"), Some(FieldRole::TimeDimension));
    assert_eq!(profile.value_series(), &[1.0856, 1.0812, 1.0874]);
    assert_eq!(profile.record_count(), 3);
}

#[test]
fn test_sdmx_json_without_series() {
    let body = json!({"dataSets": [], "structure": {}});
    let err = SchemaInferencer::new()
        .with_format(PayloadFormat::SdmxJson)
        .infer(&body)
        .unwrap_err();
    assert!(err.to_string().contains("dataSets[0].series"));
}

#[test]
fn test_bls_layout_keeps_monthly_points() {
    let body = json!({
        "status": "REQUEST_SUCCEEDED",
        "responseTime": 120,
        "message": [],
        "Results": {
            "series": [{
                "seriesID": "LNS14000000",
                "data": [
                    {"year": "2024", "period": "M03", "periodName": "March", "value": "3.9", "footnotes": [{}]},
                    {"year": "2024", "period": "M02", "periodName": "February", "value": "3.9", "footnotes": [{}]},
                    {"year": "2023", "period": "M13", "periodName": "Annual", "value": "3.6", "footnotes": [{}]},
                    {"year": "2024", "period": "M01", "periodName": "January", "value": "3.7", "footnotes": [{}]}
                ]
            }]
        }
    });

    let profile = SchemaInferencer::new()
        .with_format(PayloadFormat::Bls)
        .infer(&body)
        .unwrap();

    assert_eq!(profile.role_of("date"), Some(FieldRole::TimeDimension));
    assert_eq!(profile.role_of("series_id"), Some(FieldRole::Unclassified));
    assert_eq!(profile.value_series(), &[3.9, 3.9, 3.7]);
}

#[test]
fn test_bls_failed_request() {
    let body = json!({
        "status": "REQUEST_NOT_PROCESSED",
        "message": ["Daily threshold for total number of requests allocated has been reached."],
        "Results": {}
    });

    let err = SchemaInferencer::new()
        .with_format(PayloadFormat::Bls)
        .infer(&body)
        .unwrap_err();
    assert!(err.to_string().contains("REQUEST_NOT_PROCESSED"));
    assert!(err.to_string().contains("Daily threshold"));
}

// ============================================================================
// CSV
// ============================================================================

#[test]
fn test_csv_body() {
    let body = "date,region,value\n2024-01,North,10.5\n2024-02,North,12\n2024-03,North,\n";

    let profile = SchemaInferencer::new()
        .infer_body(body, Some("text/csv; charset=utf-8"))
        .unwrap();

    assert_eq!(profile.role_of("date"), Some(FieldRole::TimeDimension));
    assert_eq!(profile.role_of("region"), Some(FieldRole::GeoDimension));
    assert_eq!(profile.value_field(), Some("value"));
    assert_eq!(profile.value_series(), &[10.5, 12.0]);
    assert_eq!(profile.record_count(), 3);
}

#[test]
fn test_sdmx_csv_columns() {
    let body = "\
STRUCTURE,STRUCTURE_ID,ACTION,REF_AREA,FREQ,TIME_PERIOD,OBS_VALUE,UNIT_MULT
DATAFLOW,OECD.SDD.STES:DSD_STES@DF_CLI(4.1),I,FRA,M,2024-01,99.1,0
DATAFLOW,OECD.SDD.STES:DSD_STES@DF_CLI(4.1),I,FRA,M,2024-02,99.4,0
DATAFLOW,OECD.SDD.STES:DSD_STES@DF_CLI(4.1),I,DEU,M,2024-01,98.7,0
";

    let profile = SchemaInferencer::new()
        .infer_body(body, Some("application/vnd.sdmx.data+csv; version=2"))
        .unwrap();

    assert_eq!(profile.role_of("date"), Some(FieldRole::TimeDimension));
    assert_eq!(profile.role_of("REF_AREA"), Some(FieldRole::GeoDimension));
    assert_eq!(profile.value_field(), Some("value"));
    assert_eq!(profile.value_series(), &[99.1, 99.4, 98.7]);
    assert!(profile.is_complete());
}

#[test]
fn test_sdmx_csv_counterpart_columns_form_network() {
    let body = "\
REF_AREA,COUNTERPART_AREA,Reference area,TIME_PERIOD,OBS_VALUE
FRA,USA,France,2021,1520
FRA,DEU,France,2021,980
";

    let profile = SchemaInferencer::new().infer_csv(body).unwrap();

    assert_eq!(profile.role_of("source"), Some(FieldRole::NetworkDimension));
    assert_eq!(profile.role_of("target"), Some(FieldRole::NetworkDimension));
    assert!(profile.has_network_dimension());
    assert_eq!(profile.value_series(), &[1520.0, 980.0]);
}

#[test]
fn test_csv_content_type_only_switches_parser() {
    // JSON content type keeps the JSON parser
    let err = SchemaInferencer::new()
        .infer_body("date,value\n2024,1\n", Some("application/json"))
        .unwrap_err();
    assert!(err.to_string().contains("not valid JSON"));
}

#[test]
fn test_empty_csv_body() {
    let err = SchemaInferencer::new().infer_body("", Some("text/csv")).unwrap_err();
    assert!(matches!(err, Error::MalformedPayload { .. }));
}
