//! Chart configuration as Vega-Lite documents.
//!
//! The pages only assemble specs; executing them belongs to the embedding
//! shell's plotting layer. Encodings, facet, sizing and font constants follow
//! the product's established look: 800x400 plots, axis fonts at 15, titles at
//! 25, blues scheme for heatmaps.

use serde::Serialize;
use serde_json::{json, Value};

use crate::logging::{json_log, obj, v_num, v_str};
use crate::solutions::ApproachRow;
use crate::summary::FlatRow;

pub const CHART_WIDTH: u32 = 800;
pub const CHART_HEIGHT: u32 = 400;
const AXIS_FONT_SIZE: u32 = 15;
const TITLE_FONT_SIZE: u32 = 25;
const ENSEMBLE_COLOR: &str = "#d62728";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub name: &'static str,
    pub spec: Value,
}

fn font_config() -> Value {
    json!({
        "axis": {"labelFontSize": AXIS_FONT_SIZE, "titleFontSize": AXIS_FONT_SIZE},
        "title": {"fontSize": TITLE_FONT_SIZE},
    })
}

fn table_values(rows: &[&FlatRow], with_bounds: bool) -> Vec<Value> {
    rows.iter()
        .map(|row| {
            let mut value = serde_json::to_value(row).unwrap_or(Value::Null);
            if with_bounds {
                if let Value::Object(map) = &mut value {
                    let (lo, hi) = row.mean_bounds();
                    map.insert("lower_bound".to_string(), json!(lo));
                    map.insert("upper_bound".to_string(), json!(hi));
                }
            }
            value
        })
        .collect()
}

/// Bar chart of one statistic, instances side by side, faceted by input.
/// The mean gets an error-bar rendering over its 2.5-sigma bounds instead.
pub fn bar_chart(rows: &[&FlatRow], statistic: &str) -> ChartSpec {
    let with_bounds = statistic == "mean";
    let values = table_values(rows, with_bounds);

    let (mark, y_encoding) = if with_bounds {
        (
            json!("errorbar"),
            json!({
                "y": {"field": "lower_bound", "type": "quantitative"},
                "y2": {"field": "upper_bound"},
            }),
        )
    } else {
        (
            json!("bar"),
            json!({
                "y": {"field": statistic, "type": "quantitative", "title": statistic},
            }),
        )
    };

    let mut encoding = json!({
        "x": {"field": "instanceID", "type": "nominal"},
        "color": {"field": "instanceID", "type": "nominal"},
        "column": {"field": "inputID", "type": "nominal"},
    });
    if let (Value::Object(enc), Value::Object(y)) = (&mut encoding, y_encoding) {
        for (k, v) in y {
            enc.insert(k, v);
        }
    }

    json_log(
        "chart",
        obj(&[
            ("kind", v_str("bar")),
            ("statistic", v_str(statistic)),
            ("rows", v_num(rows.len() as f64)),
        ]),
    );
    ChartSpec {
        name: "statistic_by_instance",
        spec: json!({
            "data": {"values": values},
            "mark": mark,
            "encoding": encoding,
            "width": CHART_WIDTH,
            "height": CHART_HEIGHT,
            "config": font_config(),
        }),
    }
}

/// Input x instance heatmap of one statistic, blues scheme, statistic in the
/// tooltip.
pub fn heatmap(rows: &[&FlatRow], statistic: &str) -> ChartSpec {
    let values = table_values(rows, false);
    ChartSpec {
        name: "statistic_heatmap",
        spec: json!({
            "data": {"values": values},
            "mark": "rect",
            "encoding": {
                "x": {"field": "inputID", "type": "nominal"},
                "y": {"field": "instanceID", "type": "nominal"},
                "color": {
                    "field": statistic,
                    "type": "quantitative",
                    "scale": {"scheme": "blues"},
                },
                "tooltip": [{"field": statistic, "type": "quantitative"}],
            },
            "width": CHART_WIDTH,
            "height": CHART_HEIGHT,
        }),
    }
}

/// Observed counts against forecasts, one color per approach.
pub fn forecast_scatter(rows: &[ApproachRow]) -> ChartSpec {
    let values: Vec<Value> = rows
        .iter()
        .map(|r| serde_json::to_value(r).unwrap_or(Value::Null))
        .collect();
    ChartSpec {
        name: "forecast_scatter",
        spec: json!({
            "data": {"values": values},
            "mark": "point",
            "encoding": {
                "x": {"field": "count", "type": "quantitative"},
                "y": {"field": "forecast", "type": "quantitative"},
                "color": {"field": "approach", "type": "nominal"},
            },
            "width": CHART_WIDTH,
            "height": CHART_HEIGHT,
            "config": font_config(),
        }),
    }
}

/// Residual distribution per approach; the ensemble is drawn in its own
/// accent color so it stands out against the underlying approaches.
pub fn residual_histogram(rows: &[ApproachRow]) -> ChartSpec {
    let values: Vec<Value> = rows
        .iter()
        .map(|r| serde_json::to_value(r).unwrap_or(Value::Null))
        .collect();
    ChartSpec {
        name: "residual_histogram",
        spec: json!({
            "data": {"values": values},
            "mark": "bar",
            "encoding": {
                "x": {"field": "residual", "type": "quantitative", "bin": true},
                "y": {"aggregate": "count", "type": "quantitative"},
                "color": {
                    "condition": {"test": "datum.ensemble", "value": ENSEMBLE_COLOR},
                    "field": "approach",
                    "type": "nominal",
                },
            },
            "width": CHART_WIDTH,
            "height": CHART_HEIGHT,
            "config": font_config(),
        }),
    }
}
