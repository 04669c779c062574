//! Flattening properties exercised against raw JSON documents, the way the
//! batch endpoint actually delivers them.

use resultview::summary::{flatten, unique_indicators, BatchResults};

fn parse(raw: &str) -> BatchResults {
    serde_json::from_str(raw).expect("document should parse")
}

const ONE_GROUP: &str = r#"{
    "grouped_distributional_summaries": [{
        "group_keys": ["inputID", "instanceID", "versionID"],
        "group_values": ["i1", "a", "v1"],
        "indicator_keys": ["latency"],
        "indicator_distributions": {
            "latency": {
                "min": 1, "max": 9, "count": 5, "mean": 5, "std": 2,
                "shifted_geometric_mean": {"value": 4.8, "shift": 0.1},
                "percentiles": {
                    "p01": 1, "p05": 1, "p10": 2, "p25": 3, "p50": 5,
                    "p75": 7, "p90": 8, "p95": 9, "p99": 9
                }
            }
        }
    }]
}"#;

#[test]
fn single_group_single_indicator_flattens_to_one_row() {
    let rows = flatten(&parse(ONE_GROUP)).unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.input_id, "i1");
    assert_eq!(row.instance_id, "a");
    assert_eq!(row.version_id, "v1");
    assert_eq!(row.indicator, "latency");
    assert_eq!(row.min, 1.0);
    assert_eq!(row.max, 9.0);
    assert_eq!(row.count, 5.0);
    assert_eq!(row.mean, 5.0);
    assert_eq!(row.std, 2.0);
    assert_eq!(row.shifted_geometric_mean_value, 4.8);
    assert_eq!(row.shifted_geometric_mean_shift, 0.1);
    assert_eq!(row.p50, 5.0);
    assert_eq!(row.p99, 9.0);
}

#[test]
fn row_count_is_groups_times_indicators() {
    let raw = r#"{
        "grouped_distributional_summaries": [
            {
                "group_keys": ["inputID", "instanceID", "versionID"],
                "group_values": ["i1", "a", "v1"],
                "indicator_keys": ["latency", "value"],
                "indicator_distributions": {
                    "latency": {
                        "min": 1, "max": 9, "count": 5, "mean": 5, "std": 2,
                        "shifted_geometric_mean": {"value": 4.8, "shift": 0.1},
                        "percentiles": {"p01": 1, "p05": 1, "p10": 2, "p25": 3,
                                         "p50": 5, "p75": 7, "p90": 8, "p95": 9, "p99": 9}
                    },
                    "value": {
                        "min": 0, "max": 100, "count": 5, "mean": 50, "std": 10,
                        "shifted_geometric_mean": {"value": 48.0, "shift": 1.0},
                        "percentiles": {"p01": 2, "p05": 5, "p10": 10, "p25": 25,
                                         "p50": 50, "p75": 75, "p90": 90, "p95": 95, "p99": 99}
                    }
                }
            },
            {
                "group_keys": ["instanceID"],
                "group_values": ["only-instance"],
                "indicator_keys": ["latency"],
                "indicator_distributions": {
                    "latency": {
                        "min": 1, "max": 9, "count": 5, "mean": 5, "std": 2,
                        "shifted_geometric_mean": {"value": 4.8, "shift": 0.1},
                        "percentiles": {"p01": 1, "p05": 1, "p10": 2, "p25": 3,
                                         "p50": 5, "p75": 7, "p90": 8, "p95": 9, "p99": 9}
                    }
                }
            },
            {
                "group_keys": ["inputID", "instanceID", "versionID"],
                "group_values": ["i2", "b", "v1"],
                "indicator_keys": ["latency", "value"],
                "indicator_distributions": {
                    "latency": {
                        "min": 2, "max": 8, "count": 5, "mean": 4, "std": 1,
                        "shifted_geometric_mean": {"value": 3.9, "shift": 0.1},
                        "percentiles": {"p01": 2, "p05": 2, "p10": 2, "p25": 3,
                                         "p50": 4, "p75": 5, "p90": 7, "p95": 8, "p99": 8}
                    },
                    "value": {
                        "min": 0, "max": 90, "count": 5, "mean": 45, "std": 9,
                        "shifted_geometric_mean": {"value": 43.0, "shift": 1.0},
                        "percentiles": {"p01": 1, "p05": 4, "p10": 9, "p25": 22,
                                         "p50": 45, "p75": 68, "p90": 81, "p95": 86, "p99": 89}
                    }
                }
            }
        ]
    }"#;
    let rows = flatten(&parse(raw)).unwrap();
    // 2 qualifying groups x 2 indicators; the one-key group contributes nothing.
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.instance_id != "only-instance"));
    assert_eq!(unique_indicators(&rows), vec!["latency", "value"]);
}

#[test]
fn identical_documents_flatten_identically() {
    let first = flatten(&parse(ONE_GROUP)).unwrap();
    let second = flatten(&parse(ONE_GROUP)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn missing_percentile_field_fails_to_parse() {
    // p50 removed: a present indicator with an incomplete distribution is
    // fatal, never defaulted.
    let raw = r#"{
        "grouped_distributional_summaries": [{
            "group_keys": ["inputID", "instanceID", "versionID"],
            "group_values": ["i1", "a", "v1"],
            "indicator_keys": ["latency"],
            "indicator_distributions": {
                "latency": {
                    "min": 1, "max": 9, "count": 5, "mean": 5, "std": 2,
                    "shifted_geometric_mean": {"value": 4.8, "shift": 0.1},
                    "percentiles": {"p01": 1, "p05": 1, "p10": 2, "p25": 3,
                                     "p75": 7, "p90": 8, "p95": 9, "p99": 9}
                }
            }
        }]
    }"#;
    assert!(serde_json::from_str::<BatchResults>(raw).is_err());
}

#[test]
fn missing_shifted_geometric_mean_fails_to_parse() {
    let raw = r#"{
        "grouped_distributional_summaries": [{
            "group_keys": ["inputID", "instanceID", "versionID"],
            "group_values": ["i1", "a", "v1"],
            "indicator_keys": ["latency"],
            "indicator_distributions": {
                "latency": {
                    "min": 1, "max": 9, "count": 5, "mean": 5, "std": 2,
                    "percentiles": {"p01": 1, "p05": 1, "p10": 2, "p25": 3, "p50": 5,
                                     "p75": 7, "p90": 8, "p95": 9, "p99": 9}
                }
            }
        }]
    }"#;
    assert!(serde_json::from_str::<BatchResults>(raw).is_err());
}
