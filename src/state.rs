use crate::logging::{json_log, log, obj, v_str, Domain, Level};
use crate::query::PageQuery;

pub const DEFAULT_API_BASE: &str = "https://api.cloud.nextmv.io";

#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_base: String,
    pub http_timeout_secs: u64,
    pub default_app_id: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("NEXTMV_API_KEY").ok().filter(|k| !k.is_empty()),
            api_base: std::env::var("API_BASE_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            default_app_id: std::env::var("DEFAULT_APP_ID")
                .unwrap_or_else(|_| "temp-demand-forecast".to_string()),
        }
    }
}

pub fn now_ts() -> u64 {
    chrono::Utc::now().timestamp() as u64
}

/// Per-session auth state. Created once per page session and mutated only by
/// `init`; headers always reflect the currently known credential, with a
/// configured API key taking precedence over token+account from the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthSession {
    pub token: String,
    pub account: String,
    pub api_key: Option<String>,
    pub headers: Vec<(String, String)>,
    pub token_expired: bool,
    pub refresh_count: u32,
    init_complete: bool,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: once a session is initialized, later calls do nothing.
    ///
    /// An empty token or account from the query is reported but still stored,
    /// and headers are built with the empty values; the embedding parent is
    /// expected to reload the page with usable credentials.
    pub fn init(&mut self, cfg: &Config, query: &PageQuery) {
        if self.init_complete {
            return;
        }

        if let Some(key) = &cfg.api_key {
            self.api_key = Some(key.clone());
            self.headers = vec![
                ("Authorization".to_string(), format!("Bearer {}", key)),
                ("Content-Type".to_string(), "application/json".to_string()),
            ];
            self.init_complete = true;
            json_log("auth", obj(&[("source", v_str("api_key"))]));
            return;
        }

        if query.token.is_empty() || query.account.is_empty() {
            log(
                Level::Error,
                Domain::Auth,
                "missing_credentials",
                obj(&[("msg", v_str("Token and account missing in query params."))]),
            );
        }
        self.token = query.token.clone();
        self.account = query.account.clone();
        self.token_expired = false;
        self.refresh_count = 0;
        self.headers = vec![
            ("Authorization".to_string(), format!("Bearer {}", self.token)),
            ("nextmv-account".to_string(), self.account.clone()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];
        self.init_complete = true;
        json_log("auth", obj(&[("source", v_str("query_params"))]));
    }

    pub fn has_static_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Bookkeeping for an emitted refresh request. The parent reloads the
    /// page with new query parameters, so the counter is diagnostics only.
    pub fn record_refresh_request(&mut self) {
        self.token_expired = true;
        self.refresh_count = self.refresh_count.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(api_key: Option<&str>) -> Config {
        Config {
            api_key: api_key.map(|k| k.to_string()),
            api_base: DEFAULT_API_BASE.to_string(),
            http_timeout_secs: 30,
            default_app_id: "temp-demand-forecast".to_string(),
        }
    }

    fn query(token: &str, account: &str) -> PageQuery {
        PageQuery {
            token: token.to_string(),
            account: account.to_string(),
            ..PageQuery::default()
        }
    }

    #[test]
    fn init_from_query_builds_bearer_and_account_headers() {
        let mut session = AuthSession::new();
        session.init(&test_config(None), &query("tok-1", "acct-9"));
        assert_eq!(
            session.headers,
            vec![
                ("Authorization".to_string(), "Bearer tok-1".to_string()),
                ("nextmv-account".to_string(), "acct-9".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ]
        );
        assert!(!session.has_static_key());
    }

    #[test]
    fn api_key_takes_precedence_over_query_credentials() {
        let mut session = AuthSession::new();
        session.init(&test_config(Some("sk-key")), &query("tok-1", "acct-9"));
        assert_eq!(session.headers[0].1, "Bearer sk-key");
        assert!(session.has_static_key());
        // No account header on the key path.
        assert!(session.headers.iter().all(|(name, _)| name != "nextmv-account"));
        assert_eq!(session.token, "");
    }

    #[test]
    fn init_is_idempotent() {
        let mut session = AuthSession::new();
        let cfg = test_config(None);
        session.init(&cfg, &query("tok-1", "acct-9"));
        let first = session.headers.clone();
        // A second call with different parameters must not change anything.
        session.init(&cfg, &query("tok-2", "acct-other"));
        assert_eq!(session.headers, first);
        assert_eq!(session.token, "tok-1");
    }

    #[test]
    fn empty_credentials_still_build_headers() {
        // Long-standing behavior: the error is reported but empty values are
        // stored and headers carry them.
        let mut session = AuthSession::new();
        session.init(&test_config(None), &query("", ""));
        assert_eq!(session.headers[0].1, "Bearer ");
        assert_eq!(session.headers[1].1, "");
    }

    #[test]
    fn refresh_request_bookkeeping() {
        let mut session = AuthSession::new();
        session.init(&test_config(None), &query("tok", "acct"));
        assert_eq!(session.refresh_count, 0);
        session.record_refresh_request();
        assert!(session.token_expired);
        assert_eq!(session.refresh_count, 1);
    }

    #[test]
    fn config_defaults() {
        let cfg = test_config(None);
        assert_eq!(cfg.api_base, "https://api.cloud.nextmv.io");
        assert_eq!(cfg.http_timeout_secs, 30);
    }
}
