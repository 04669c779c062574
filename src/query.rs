use url::form_urlencoded;

use crate::logging::{json_log, obj, v_str};

/// Parameters handed to a page by its embedding shell, percent-decoded.
///
/// `url` carries the API base address URL-encoded by the parent; decoding it
/// here means the rest of the crate only ever sees a plain base URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageQuery {
    pub app_id: Option<String>,
    pub batch_id: Option<String>,
    pub run_id: Option<String>,
    pub api_base_url: Option<String>,
    pub token: String,
    pub account: String,
    pub indicator: Option<String>,
    pub statistic: Option<String>,
}

impl PageQuery {
    /// Parse a raw query string (with or without the leading '?').
    /// Unknown parameters are ignored; repeated parameters keep the last value.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim().trim_start_matches('?');
        let mut q = PageQuery::default();
        for (key, value) in form_urlencoded::parse(trimmed.as_bytes()) {
            let value = value.into_owned();
            match key.as_ref() {
                "app_id" => q.app_id = non_empty(value),
                "batch_id" => q.batch_id = non_empty(value),
                "run_id" => q.run_id = non_empty(value),
                "url" => q.api_base_url = non_empty(value),
                "token" => q.token = value,
                "account" => q.account = value,
                "indicator" => q.indicator = non_empty(value),
                "statistic" => q.statistic = non_empty(value),
                _ => {}
            }
        }
        json_log(
            "query",
            obj(&[
                ("app_id", v_str(q.app_id.as_deref().unwrap_or(""))),
                ("batch_id", v_str(q.batch_id.as_deref().unwrap_or(""))),
                ("run_id", v_str(q.run_id.as_deref().unwrap_or(""))),
                ("base_url", v_str(q.api_base_url.as_deref().unwrap_or(""))),
            ]),
        );
        q
    }

    /// Query string for the current render: first CLI argument, falling back
    /// to the QUERY_STRING environment variable.
    pub fn from_invocation() -> Self {
        let raw = std::env::args()
            .nth(1)
            .or_else(|| std::env::var("QUERY_STRING").ok())
            .unwrap_or_default();
        Self::parse(&raw)
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
