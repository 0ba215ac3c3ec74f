//! MCP tool surface for the FindSGJobs gateway.
//!
//! Tool results use the plain `{"success": ...}` envelope; upstream failures
//! are folded into that envelope so a bad request never takes the server
//! down. Only schema violations surface as JSON-RPC errors.

use std::future::Future;
use std::sync::Arc;

use rmcp::{
    handler::server::tool::{Parameters, ToolRouter},
    model::JsonObject,
    ErrorData as McpError,
};
use serde_json::{json, Value as JsonValue};

use crate::domain::{stats, JobSearch, SearchOutcome};

pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = crate::clients::findsgjobs::MAX_PER_PAGE;

/// The MCP server handler. Holds whichever `JobSearch` implementation it is
/// given at boot.
#[derive(Clone)]
pub struct JobsSvc {
    search: Arc<dyn JobSearch>,
}

impl JobsSvc {
    pub fn new(search: Arc<dyn JobSearch>) -> Self {
        Self { search }
    }
}

// rmcp expects the impl even though we take all defaults.
impl rmcp::ServerHandler for JobsSvc {}

#[rmcp::tool_router]
impl JobsSvc {
    #[rmcp::tool(
        name = "search_jobs",
        description = "Search for jobs in Singapore by keywords. Arguments: keywords (required), page (default 1), per_page_count (default 10, max 20). Returns {\"success\":true,\"total_jobs\":N,\"jobs\":[...]} or {\"success\":false,\"error\":\"...\"}."
    )]
    pub async fn search_jobs(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<rmcp::Json<JsonValue>, McpError> {
        let args = params.0;
        let keywords = required_str(&args, "keywords")?;
        let page = positive_page(&args)?;
        let per_page = optional_u32(&args, "per_page_count", DEFAULT_PER_PAGE)?.min(MAX_PER_PAGE);

        tracing::debug!(keywords = %keywords, page = page, per_page = per_page, "search_jobs invoked");
        let outcome = SearchOutcome::from_result(self.search.search(&keywords, page, per_page).await);
        Ok(rmcp::Json(outcome.into_json()))
    }

    #[rmcp::tool(
        name = "get_job_statistics",
        description = "Aggregate job-market statistics for keywords: top categories, employment types, top locations, education and experience requirements. Arguments: keywords (required), sample_size (default 20, max 20)."
    )]
    pub async fn get_job_statistics(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<rmcp::Json<JsonValue>, McpError> {
        let args = params.0;
        let keywords = required_str(&args, "keywords")?;
        let sample_size = optional_u32(&args, "sample_size", stats::MAX_SAMPLE_SIZE)?
            .clamp(1, stats::MAX_SAMPLE_SIZE);

        tracing::debug!(keywords = %keywords, sample_size = sample_size, "get_job_statistics invoked");
        match self.search.search(&keywords, 1, sample_size).await {
            Ok(page) => {
                let report = stats::calculate(&keywords, page.total_jobs, &page.jobs);
                Ok(rmcp::Json(json!({
                    "success": true,
                    "keyword": report.keyword,
                    "total_jobs_in_market": report.total_jobs_in_market,
                    "jobs_analyzed": report.jobs_analyzed,
                    "statistics": report.statistics,
                })))
            }
            Err(e) => Ok(rmcp::Json(SearchOutcome::failure(e).into_json())),
        }
    }

    #[rmcp::tool(
        name = "get_job_details",
        description = "Look up one job from search results by its job_id. Returns {\"success\":true,\"job\":{...}} or {\"success\":false,\"error\":\"...\"} when the id is not found."
    )]
    pub async fn get_job_details(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<rmcp::Json<JsonValue>, McpError> {
        let args = params.0;
        let job_id = required_str(&args, "job_id")?;

        tracing::debug!(job_id = %job_id, "get_job_details invoked");
        // The upstream has no dedicated detail endpoint; search the id and
        // filter for an exact match.
        match self.search.search(&job_id, 1, MAX_PER_PAGE).await {
            Ok(page) => {
                match page
                    .jobs
                    .into_iter()
                    .find(|j| j.job_id.as_deref() == Some(job_id.as_str()))
                {
                    Some(job) => Ok(rmcp::Json(json!({ "success": true, "job": job }))),
                    None => Ok(rmcp::Json(json!({
                        "success": false,
                        "error": format!("no job found with id '{job_id}'"),
                    }))),
                }
            }
            Err(e) => Ok(rmcp::Json(SearchOutcome::failure(e).into_json())),
        }
    }
}

pub type JobsRouter = ToolRouter<JobsSvc>;

impl JobsSvc {
    /// Wrapper to expose the macro-generated tool router.
    pub fn router() -> JobsRouter {
        Self::tool_router()
    }
}

fn required_str(args: &JsonObject, key: &str) -> Result<String, McpError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| McpError::invalid_params(format!("missing required field: {key}"), None))
}

fn optional_u32(args: &JsonObject, key: &str, default: u32) -> Result<u32, McpError> {
    match args.get(key) {
        None | Some(JsonValue::Null) => Ok(default),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| {
                McpError::invalid_params(format!("'{key}' must be a non-negative integer"), None)
            }),
    }
}

fn positive_page(args: &JsonObject) -> Result<u32, McpError> {
    let page = optional_u32(args, "page", 1)?;
    if page == 0 {
        return Err(McpError::invalid_params("'page' must be >= 1", None));
    }
    Ok(page)
}
