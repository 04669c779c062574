//! Page control flow: initialize auth, fetch once, flatten, build charts.
//!
//! Every outcome is terminal for the current render. There are no retries;
//! an auth expiry hands the problem to the embedding parent and stops.

use anyhow::Result;
use serde::Serialize;

use crate::api::{ApiOutcome, ResultsApi};
use crate::chart::{bar_chart, forecast_scatter, heatmap, residual_histogram, ChartSpec};
use crate::logging::{json_log, log, obj, v_num, v_str, Domain, Level};
use crate::notify::{ParentMessage, ParentNotifier};
use crate::query::PageQuery;
use crate::solutions::{flatten_solutions, ApproachRow, RunResult};
use crate::state::{AuthSession, Config};
use crate::summary::{filter_by_indicator, flatten, unique_indicators, BatchResults, FlatRow, STAT_COLUMNS};

#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome<P> {
    /// Flattened table plus chart specs, ready for the shell to draw.
    Rendered(P),
    /// 401/403 without a static key; the refresh message has been published.
    RefreshRequested,
    /// Terminal error; `message` is what the page shows.
    Halted { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchPagePayload {
    pub rows: Vec<FlatRow>,
    pub indicators: Vec<String>,
    pub indicator: String,
    pub statistic: String,
    pub charts: Vec<ChartSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunPagePayload {
    pub rows: Vec<ApproachRow>,
    pub charts: Vec<ChartSpec>,
}

fn halted<P>(message: String) -> PageOutcome<P> {
    log(
        Level::Error,
        Domain::Page,
        "halt",
        obj(&[("msg", v_str(&message))]),
    );
    PageOutcome::Halted { message }
}

/// Publish the one-way refresh request and record it on the session.
fn request_refresh<P>(
    session: &mut AuthSession,
    notifier: &mut dyn ParentNotifier,
    status: u16,
) -> PageOutcome<P> {
    session.record_refresh_request();
    if let Err(err) = notifier.notify(&ParentMessage::token_refresh()) {
        log(
            Level::Warn,
            Domain::Page,
            "refresh_notify_failed",
            obj(&[("err", v_str(&err))]),
        );
    }
    json_log(
        "page",
        obj(&[
            ("outcome", v_str("refresh_requested")),
            ("status", v_num(status as f64)),
            ("refresh_count", v_num(session.refresh_count as f64)),
        ]),
    );
    PageOutcome::RefreshRequested
}

/// Batch experiments page: grouped summaries → bar chart + heatmap of one
/// selected indicator/statistic.
pub async fn render_batch_page(
    api: &dyn ResultsApi,
    session: &mut AuthSession,
    query: &PageQuery,
    cfg: &Config,
    notifier: &mut dyn ParentNotifier,
) -> Result<PageOutcome<BatchPagePayload>> {
    let app_id = query
        .app_id
        .clone()
        .unwrap_or_else(|| cfg.default_app_id.clone());
    let batch_id = match &query.batch_id {
        Some(id) => id.clone(),
        None => return Ok(halted("batch_id missing in query params".to_string())),
    };

    match api.batch_results(&app_id, &batch_id).await? {
        ApiOutcome::AuthExpired { status } => Ok(request_refresh(session, notifier, status)),
        ApiOutcome::Failed { status: _, body } => Ok(halted(format!("Error: {}", body))),
        ApiOutcome::Success(value) => {
            let results: BatchResults = serde_json::from_value(value)?;
            let rows = flatten(&results)?;
            let indicators = unique_indicators(&rows);

            let statistic = query
                .statistic
                .clone()
                .unwrap_or_else(|| "mean".to_string());
            if !STAT_COLUMNS.contains(&statistic.as_str()) {
                return Ok(halted(format!("unknown statistic: {}", statistic)));
            }
            let indicator = match query.indicator.clone().or_else(|| indicators.first().cloned()) {
                Some(indicator) => indicator,
                None => {
                    // Nothing qualified; an empty table renders as an empty page.
                    return Ok(PageOutcome::Rendered(BatchPagePayload {
                        rows,
                        indicators,
                        indicator: String::new(),
                        statistic,
                        charts: Vec::new(),
                    }));
                }
            };

            let filtered = filter_by_indicator(&rows, &indicator);
            let charts = vec![
                bar_chart(&filtered, &statistic),
                heatmap(&filtered, &statistic),
            ];
            json_log(
                "page",
                obj(&[
                    ("outcome", v_str("rendered")),
                    ("rows", v_num(rows.len() as f64)),
                    ("charts", v_num(charts.len() as f64)),
                ]),
            );
            Ok(PageOutcome::Rendered(BatchPagePayload {
                rows,
                indicators,
                indicator,
                statistic,
                charts,
            }))
        }
    }
}

/// Run page: per-approach solutions → forecast scatter + residual histogram.
pub async fn render_run_page(
    api: &dyn ResultsApi,
    session: &mut AuthSession,
    query: &PageQuery,
    cfg: &Config,
    notifier: &mut dyn ParentNotifier,
) -> Result<PageOutcome<RunPagePayload>> {
    let app_id = query
        .app_id
        .clone()
        .unwrap_or_else(|| cfg.default_app_id.clone());
    let run_id = match &query.run_id {
        Some(id) => id.clone(),
        None => return Ok(halted("run_id missing in query params".to_string())),
    };

    match api.run_result(&app_id, &run_id).await? {
        ApiOutcome::AuthExpired { status } => Ok(request_refresh(session, notifier, status)),
        ApiOutcome::Failed { status: _, body } => Ok(halted(format!("Error: {}", body))),
        ApiOutcome::Success(value) => {
            let run: RunResult = serde_json::from_value(value)?;
            let rows = flatten_solutions(&run);
            let charts = vec![forecast_scatter(&rows), residual_histogram(&rows)];
            json_log(
                "page",
                obj(&[
                    ("outcome", v_str("rendered")),
                    ("rows", v_num(rows.len() as f64)),
                    ("charts", v_num(charts.len() as f64)),
                ]),
            );
            Ok(PageOutcome::Rendered(RunPagePayload { rows, charts }))
        }
    }
}
