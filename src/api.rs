//! One GET per page render against the experiments API.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use sha2::{Digest, Sha256};

use crate::logging::{json_log, obj, params_hash, v_num, v_str};
use crate::state::{AuthSession, Config};

/// Response classification. Auth expiry is only reported when no static API
/// key is configured; with a key present a 401/403 is an ordinary failure,
/// since refreshing a page token cannot fix a rejected key.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome {
    Success(serde_json::Value),
    AuthExpired { status: u16 },
    Failed { status: u16, body: String },
}

#[async_trait]
pub trait ResultsApi {
    async fn batch_results(&self, app_id: &str, batch_id: &str) -> Result<ApiOutcome>;
    async fn run_result(&self, app_id: &str, run_id: &str) -> Result<ApiOutcome>;
}

pub struct HttpApi {
    client: Client,
    base: String,
    headers: HeaderMap,
    has_static_key: bool,
}

impl HttpApi {
    pub fn new(cfg: &Config, session: &AuthSession, base: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &session.headers {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
            headers,
            has_static_key: session.has_static_key(),
        })
    }

    fn batch_url(&self, app_id: &str, batch_id: &str) -> String {
        format!(
            "{}/v1/applications/{}/experiments/batch/{}",
            self.base, app_id, batch_id
        )
    }

    fn run_url(&self, app_id: &str, run_id: &str) -> String {
        format!("{}/v1/applications/{}/runs/{}", self.base, app_id, run_id)
    }

    async fn get(&self, url: String) -> Result<ApiOutcome> {
        json_log(
            "api",
            obj(&[
                ("op", v_str("get")),
                ("url_hash", v_str(&params_hash(&url))),
            ]),
        );
        let resp = self
            .client
            .get(&url)
            .headers(self.headers.clone())
            .send()
            .await?;
        let status = resp.status().as_u16();

        if (200..300).contains(&status) {
            let body = resp.bytes().await?;
            // Payload digest so a render can be tied back to exactly what the
            // API returned.
            let digest = hex::encode(Sha256::digest(&body));
            json_log(
                "api",
                obj(&[
                    ("status", v_num(status as f64)),
                    ("bytes", v_num(body.len() as f64)),
                    ("payload_sha256", v_str(&digest)),
                ]),
            );
            let value: serde_json::Value = serde_json::from_slice(&body)?;
            return Ok(ApiOutcome::Success(value));
        }

        let body = resp.text().await.unwrap_or_default();
        let outcome = classify_failure(status, body, self.has_static_key);
        json_log(
            "api",
            obj(&[
                ("status", v_num(status as f64)),
                (
                    "outcome",
                    v_str(match outcome {
                        ApiOutcome::AuthExpired { .. } => "auth_expired",
                        _ => "failed",
                    }),
                ),
            ]),
        );
        Ok(outcome)
    }
}

fn classify_failure(status: u16, body: String, has_static_key: bool) -> ApiOutcome {
    if (status == 401 || status == 403) && !has_static_key {
        ApiOutcome::AuthExpired { status }
    } else {
        ApiOutcome::Failed { status, body }
    }
}

#[async_trait]
impl ResultsApi for HttpApi {
    async fn batch_results(&self, app_id: &str, batch_id: &str) -> Result<ApiOutcome> {
        self.get(self.batch_url(app_id, batch_id)).await
    }

    async fn run_result(&self, app_id: &str, run_id: &str) -> Result<ApiOutcome> {
        self.get(self.run_url(app_id, run_id)).await
    }
}
