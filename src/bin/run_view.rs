//! Run page: per-approach forecast solutions as count/forecast scatter and
//! residual histogram with the ensemble highlighted.

use anyhow::Result;

use resultview::api::HttpApi;
use resultview::notify::LineNotifier;
use resultview::page::{render_run_page, PageOutcome};
use resultview::query::PageQuery;
use resultview::state::{AuthSession, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let query = PageQuery::from_invocation();

    let mut session = AuthSession::new();
    session.init(&cfg, &query);

    let base = query
        .api_base_url
        .clone()
        .unwrap_or_else(|| cfg.api_base.clone());
    let api = HttpApi::new(&cfg, &session, &base)?;
    let mut notifier = LineNotifier::stdout();

    match render_run_page(&api, &mut session, &query, &cfg, &mut notifier).await? {
        PageOutcome::Rendered(payload) => {
            println!("{}", serde_json::to_string(&payload)?);
            Ok(())
        }
        PageOutcome::RefreshRequested => Ok(()),
        PageOutcome::Halted { message } => {
            println!("{}", serde_json::json!({ "error": message }));
            std::process::exit(1);
        }
    }
}
