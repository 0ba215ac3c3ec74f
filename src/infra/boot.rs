use std::sync::Arc;

use crate::clients::findsgjobs::FindSgJobsClient;
use crate::domain::JobSearch;
use crate::infra::config::Config;
use crate::infra::runtime::mcp_transport;
use crate::tools::jobs::JobsSvc;

/// Load config, build the client and serve MCP over stdio until the input
/// channel closes. Configuration failures abort before the server is Ready.
pub async fn run_stdio_server() -> anyhow::Result<()> {
    let cfg = Config::from_env()?;
    tracing::info!(
        base_url = %cfg.base_url,
        timeout_secs = cfg.timeout_secs,
        "BOOT sgjobs-mcp-gateway"
    );

    let client = FindSgJobsClient::from_config(&cfg);
    let factory = move || {
        let handler = JobsSvc::new(Arc::new(client) as Arc<dyn JobSearch>);
        let tools = JobsSvc::router();
        (handler, tools)
    };
    mcp_transport::serve_stdio(factory)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}
