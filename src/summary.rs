//! Grouped distributional summaries and their tabular form.
//!
//! The batch experiments endpoint reports one summary per group; charts want
//! one row per (inputID, instanceID, versionID, indicator). Groups are keyed
//! by parallel `group_keys`/`group_values` sequences and only groups carrying
//! all three id keys flatten to rows; the rest are skipped without comment.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::logging::{json_log, obj, v_num};

pub const GROUP_ID_KEYS: [&str; 3] = ["inputID", "instanceID", "versionID"];

/// Statistic columns of a flattened row, in column order.
pub const STAT_COLUMNS: [&str; 16] = [
    "min",
    "max",
    "count",
    "mean",
    "std",
    "shifted_geometric_mean_value",
    "shifted_geometric_mean_shift",
    "p01",
    "p05",
    "p10",
    "p25",
    "p50",
    "p75",
    "p90",
    "p95",
    "p99",
];

#[derive(Debug, Clone, Deserialize)]
pub struct BatchResults {
    pub grouped_distributional_summaries: Vec<GroupedSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupedSummary {
    pub group_keys: Vec<String>,
    pub group_values: Vec<String>,
    pub indicator_keys: Vec<String>,
    pub indicator_distributions: HashMap<String, Distribution>,
}

/// Server-side distribution of one indicator within one group. Every field is
/// required; a summary missing any of them fails deserialization outright.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Distribution {
    pub min: f64,
    pub max: f64,
    pub count: f64,
    pub mean: f64,
    pub std: f64,
    pub shifted_geometric_mean: ShiftedGeometricMean,
    pub percentiles: Percentiles,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ShiftedGeometricMean {
    pub value: f64,
    pub shift: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Percentiles {
    pub p01: f64,
    pub p05: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

/// One chartable row per (inputID, instanceID, versionID, indicator).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FlatRow {
    #[serde(rename = "inputID")]
    pub input_id: String,
    #[serde(rename = "instanceID")]
    pub instance_id: String,
    #[serde(rename = "versionID")]
    pub version_id: String,
    pub indicator: String,
    pub min: f64,
    pub max: f64,
    pub count: f64,
    pub mean: f64,
    pub std: f64,
    pub shifted_geometric_mean_value: f64,
    pub shifted_geometric_mean_shift: f64,
    pub p01: f64,
    pub p05: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

impl FlatRow {
    /// Value of a statistic column by name.
    pub fn stat(&self, column: &str) -> Option<f64> {
        match column {
            "min" => Some(self.min),
            "max" => Some(self.max),
            "count" => Some(self.count),
            "mean" => Some(self.mean),
            "std" => Some(self.std),
            "shifted_geometric_mean_value" => Some(self.shifted_geometric_mean_value),
            "shifted_geometric_mean_shift" => Some(self.shifted_geometric_mean_shift),
            "p01" => Some(self.p01),
            "p05" => Some(self.p05),
            "p10" => Some(self.p10),
            "p25" => Some(self.p25),
            "p50" => Some(self.p50),
            "p75" => Some(self.p75),
            "p90" => Some(self.p90),
            "p95" => Some(self.p95),
            "p99" => Some(self.p99),
            _ => None,
        }
    }

    /// Error-bar bounds around the mean, 2.5 standard deviations wide.
    pub fn mean_bounds(&self) -> (f64, f64) {
        (self.mean - 2.5 * self.std, self.mean + 2.5 * self.std)
    }
}

/// Flatten grouped summaries into rows. Row order is the encounter order of
/// groups, then of `indicator_keys` within a group. An indicator listed in
/// `indicator_keys` but absent from `indicator_distributions` is fatal.
pub fn flatten(results: &BatchResults) -> Result<Vec<FlatRow>> {
    let mut rows = Vec::new();
    let mut skipped = 0u64;

    for summary in &results.grouped_distributional_summaries {
        let qualifies = GROUP_ID_KEYS
            .iter()
            .all(|key| summary.group_keys.iter().any(|k| k == key));
        if !qualifies {
            skipped += 1;
            continue;
        }

        let metadata: HashMap<&str, &str> = summary
            .group_keys
            .iter()
            .map(String::as_str)
            .zip(summary.group_values.iter().map(String::as_str))
            .collect();
        let id = |key: &str| metadata.get(key).copied().unwrap_or_default().to_string();

        for indicator in &summary.indicator_keys {
            let dist = summary.indicator_distributions.get(indicator).ok_or_else(|| {
                anyhow!("indicator {:?} missing from indicator_distributions", indicator)
            })?;
            rows.push(FlatRow {
                input_id: id("inputID"),
                instance_id: id("instanceID"),
                version_id: id("versionID"),
                indicator: indicator.clone(),
                min: dist.min,
                max: dist.max,
                count: dist.count,
                mean: dist.mean,
                std: dist.std,
                shifted_geometric_mean_value: dist.shifted_geometric_mean.value,
                shifted_geometric_mean_shift: dist.shifted_geometric_mean.shift,
                p01: dist.percentiles.p01,
                p05: dist.percentiles.p05,
                p10: dist.percentiles.p10,
                p25: dist.percentiles.p25,
                p50: dist.percentiles.p50,
                p75: dist.percentiles.p75,
                p90: dist.percentiles.p90,
                p95: dist.percentiles.p95,
                p99: dist.percentiles.p99,
            });
        }
    }

    json_log(
        "flatten",
        obj(&[
            ("rows", v_num(rows.len() as f64)),
            ("skipped_groups", v_num(skipped as f64)),
        ]),
    );
    Ok(rows)
}

/// Distinct indicators in row encounter order.
pub fn unique_indicators(rows: &[FlatRow]) -> Vec<String> {
    let mut seen = Vec::new();
    for row in rows {
        if !seen.iter().any(|s| s == &row.indicator) {
            seen.push(row.indicator.clone());
        }
    }
    seen
}

pub fn filter_by_indicator<'a>(rows: &'a [FlatRow], indicator: &str) -> Vec<&'a FlatRow> {
    rows.iter().filter(|r| r.indicator == indicator).collect()
}
