//! Per-approach forecast rows from the runs endpoint.
//!
//! A run result carries `output.solutions`, keyed by approach name, each a
//! table of per-period rows with at least `count` (observed) and `forecast`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct RunResult {
    pub output: RunOutput,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunOutput {
    // BTreeMap keeps approach order stable across identical payloads.
    pub solutions: BTreeMap<String, Vec<SolutionRow>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SolutionRow {
    pub count: f64,
    pub forecast: f64,
}

/// One scatter/histogram row: residual = forecast - count.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApproachRow {
    pub approach: String,
    pub index: usize,
    pub count: f64,
    pub forecast: f64,
    pub residual: f64,
    pub ensemble: bool,
}

/// The ensemble is the distinguished approach combining the others; the
/// payload carries no marker, so the name is matched case-insensitively.
pub fn is_ensemble(approach: &str) -> bool {
    approach.to_lowercase().contains("ensemble")
}

/// Flatten solutions into rows ordered by approach name, then row order.
pub fn flatten_solutions(run: &RunResult) -> Vec<ApproachRow> {
    let mut rows = Vec::new();
    for (approach, solution_rows) in &run.output.solutions {
        let ensemble = is_ensemble(approach);
        for (index, row) in solution_rows.iter().enumerate() {
            rows.push(ApproachRow {
                approach: approach.clone(),
                index,
                count: row.count,
                forecast: row.forecast,
                residual: row.forecast - row.count,
                ensemble,
            });
        }
    }
    rows
}
