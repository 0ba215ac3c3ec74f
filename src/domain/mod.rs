use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

pub mod stats;

/// One normalized job listing. Every field is best-effort: the upstream
/// payload routinely omits sub-objects, and a listing with nothing but a
/// title is still a listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobListing {
    pub job_id: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub employment_type: Vec<String>,
    #[serde(default)]
    pub location: Vec<String>,
    pub salary: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub url: Option<String>,
    pub posted_date: Option<String>,
}

/// One page of search results, pagination included.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchPage {
    pub total_jobs: u64,
    pub current_page: u32,
    pub total_pages: u32,
    pub results_on_page: usize,
    pub jobs: Vec<JobListing>,
}

/// Client-side failure taxonomy. Every variant ends up as
/// `SearchOutcome::Failure`; none of them cross the tool boundary as a fault.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("upstream status {0}")]
    UpstreamStatus(u16),
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Outcome of one search invocation. Exactly one of the two variants, always.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Success(SearchPage),
    Failure { error: String },
}

impl SearchOutcome {
    pub fn failure(err: impl std::fmt::Display) -> Self {
        Self::Failure {
            error: err.to_string(),
        }
    }

    pub fn from_result<E: std::fmt::Display>(res: Result<SearchPage, E>) -> Self {
        match res {
            Ok(page) => Self::Success(page),
            Err(e) => Self::failure(e),
        }
    }

    /// Wire shape consumed by MCP clients: `{"success": bool, ...}`.
    pub fn into_json(self) -> serde_json::Value {
        match self {
            Self::Success(page) => json!({
                "success": true,
                "total_jobs": page.total_jobs,
                "current_page": page.current_page,
                "total_pages": page.total_pages,
                "results_on_page": page.results_on_page,
                "jobs": page.jobs,
            }),
            Self::Failure { error } => json!({ "success": false, "error": error }),
        }
    }
}

/// Seam between the tool surface and whatever does the searching, so the
/// MCP handler can be exercised against a stub instead of the live API.
#[async_trait::async_trait]
pub trait JobSearch: Send + Sync {
    async fn search(
        &self,
        keywords: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage, SearchError>;
}
