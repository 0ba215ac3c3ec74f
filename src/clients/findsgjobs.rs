use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::domain::{JobListing, JobSearch, SearchError, SearchPage};
use crate::infra::config::Config;
use crate::infra::http::headers::add_standard_headers;
use crate::infra::logging;
use crate::infra::runtime::limits::{make_http_client, make_http_client_with};

/// Upstream hard cap on page size.
pub const MAX_PER_PAGE: u32 = 20;

#[derive(Clone)]
pub struct FindSgJobsClient {
    base: String,
    api_key: String,
    http: Client,
}

impl FindSgJobsClient {
    pub fn new(base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            api_key: api_key.into(),
            http: make_http_client(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self {
            base: cfg.base_url.clone(),
            api_key: cfg.api_key.clone(),
            http: make_http_client_with(Duration::from_secs(cfg.timeout_secs)),
        }
    }

    fn listing_url(&self, job_id: &str) -> String {
        format!("{}/job/{}", self.base.trim_end_matches('/'), job_id)
    }

    /// One GET against `/apis/job/search`, single attempt. Keywords are
    /// passed through unvalidated; the upstream answers an empty keyword
    /// search with an ordinary (usually empty) result page.
    pub async fn search(
        &self,
        keywords: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage, SearchError> {
        let url = format!("{}/apis/job/search", self.base.trim_end_matches('/'));
        tracing::debug!(endpoint = %url, keywords = keywords, page = page, "findsgjobs.search request");

        let start = Instant::now();
        let (builder, _rid) = add_standard_headers(self.http.get(&url), None);
        let resp = builder
            .header("x-api-key", self.api_key.as_str())
            .query(&[
                ("page", page.to_string()),
                ("per_page_count", per_page.min(MAX_PER_PAGE).to_string()),
                ("keywords", keywords.to_string()),
            ])
            .send()
            .await
            .map_err(map_transport_err)?;

        if !resp.status().is_success() {
            logging::log_metric("search_jobs", "upstream_error_total", 1.0);
            return Err(SearchError::UpstreamStatus(resp.status().as_u16()));
        }

        let wire: SearchWire = resp
            .json()
            .await
            .map_err(|e| SearchError::Malformed(e.to_string()))?;

        let elapsed_ms = start.elapsed().as_millis() as f64;
        logging::log_metric("search_jobs", "upstream_latency_ms", elapsed_ms);

        Ok(self.normalize(wire, page))
    }

    fn normalize(&self, wire: SearchWire, requested_page: u32) -> SearchPage {
        let data = wire.data.unwrap_or_default();
        let pager = data.pager.unwrap_or_default();
        let jobs: Vec<JobListing> = data
            .result
            .into_iter()
            .map(|item| self.listing_from(item))
            .collect();
        SearchPage {
            total_jobs: pager.record_count,
            current_page: pager.page.unwrap_or(requested_page),
            total_pages: pager.page_count,
            results_on_page: jobs.len(),
            jobs,
        }
    }

    fn listing_from(&self, item: ItemWire) -> JobListing {
        let job = item.job.unwrap_or_default();
        let company = item.company.unwrap_or_default();
        let salary = salary_text(&job);
        let job_id = job.id.as_ref().and_then(id_string);
        let url = job_id.as_deref().map(|id| self.listing_url(id));
        JobListing {
            job_id,
            title: job.title,
            company: company.name,
            categories: captions(job.categories),
            employment_type: captions(job.employment_type),
            location: captions(job.stations),
            salary,
            experience: job.experience.and_then(|c| c.caption),
            education: job.education.and_then(|c| c.caption),
            url,
            posted_date: job.posted_date,
        }
    }
}

#[async_trait::async_trait]
impl JobSearch for FindSgJobsClient {
    async fn search(
        &self,
        keywords: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage, SearchError> {
        FindSgJobsClient::search(self, keywords, page, per_page).await
    }
}

fn map_transport_err(e: reqwest::Error) -> SearchError {
    if e.is_timeout() {
        SearchError::Timeout
    } else {
        SearchError::Transport(e.to_string())
    }
}

/// Job ids arrive sometimes as numbers, sometimes as strings.
fn id_string(v: &JsonValue) -> Option<String> {
    match v {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn captions(items: Vec<CaptionWire>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|c| c.caption)
        .filter(|s| !s.is_empty())
        .collect()
}

fn salary_text(job: &JobWire) -> Option<String> {
    if is_truthy(job.hide_salary.as_ref()) {
        return None;
    }
    let range = job.salary_range.as_ref()?.caption.as_deref()?;
    let currency = job
        .currency
        .as_ref()
        .and_then(|c| c.caption.as_deref())
        .unwrap_or("SGD");
    let interval = job
        .interval
        .as_ref()
        .and_then(|c| c.caption.as_deref())
        .unwrap_or("Month");
    Some(format!("{currency} {range} per {interval}"))
}

fn is_truthy(v: Option<&JsonValue>) -> bool {
    match v {
        Some(JsonValue::Bool(b)) => *b,
        Some(JsonValue::Number(n)) => n.as_i64().unwrap_or(0) != 0,
        Some(JsonValue::String(s)) => !s.is_empty() && s != "0",
        _ => false,
    }
}

// Wire shapes seen upstream. Everything below is optional/defaulted: the
// provider's JSON is not contractually guaranteed and listings with missing
// sub-objects must still normalize.

#[derive(Deserialize, Default)]
struct SearchWire {
    data: Option<DataWire>,
}

#[derive(Deserialize, Default)]
struct DataWire {
    pager: Option<PagerWire>,
    #[serde(default)]
    result: Vec<ItemWire>,
}

#[derive(Deserialize, Default)]
struct PagerWire {
    #[serde(default)]
    record_count: u64,
    page: Option<u32>,
    #[serde(default)]
    page_count: u32,
}

#[derive(Deserialize)]
struct ItemWire {
    job: Option<JobWire>,
    company: Option<CompanyWire>,
}

#[derive(Deserialize, Default)]
struct JobWire {
    id: Option<JsonValue>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "JobCategory", default)]
    categories: Vec<CaptionWire>,
    #[serde(rename = "EmploymentType", default)]
    employment_type: Vec<CaptionWire>,
    #[serde(rename = "id_Job_NearestMRTStation", default)]
    stations: Vec<CaptionWire>,
    #[serde(rename = "id_Job_Donotdisplaysalary")]
    hide_salary: Option<JsonValue>,
    #[serde(rename = "Salaryrange")]
    salary_range: Option<CaptionWire>,
    #[serde(rename = "id_Job_Currency")]
    currency: Option<CaptionWire>,
    #[serde(rename = "id_Job_Interval")]
    interval: Option<CaptionWire>,
    #[serde(rename = "MinimumYearsofExperience")]
    experience: Option<CaptionWire>,
    #[serde(rename = "MinimumEducationLevel")]
    education: Option<CaptionWire>,
    #[serde(rename = "activation_date")]
    posted_date: Option<String>,
}

#[derive(Deserialize, Default)]
struct CaptionWire {
    caption: Option<String>,
}

#[derive(Deserialize, Default)]
struct CompanyWire {
    #[serde(rename = "CompanyName")]
    name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn full_payload() -> serde_json::Value {
        json!({
            "data": {
                "pager": { "record_count": 37, "page": 2, "page_count": 4 },
                "result": [{
                    "job": {
                        "id": 9182,
                        "Title": "Line Cook",
                        "JobCategory": [{ "caption": "F&B" }],
                        "EmploymentType": [{ "caption": "Full Time" }],
                        "id_Job_NearestMRTStation": [
                            { "caption": "Outram Park" },
                            { "caption": "Chinatown" }
                        ],
                        "id_Job_Donotdisplaysalary": 0,
                        "Salaryrange": { "caption": "2,200 - 2,800" },
                        "id_Job_Currency": { "caption": "SGD" },
                        "id_Job_Interval": { "caption": "Month" },
                        "MinimumYearsofExperience": { "caption": "2 years" },
                        "MinimumEducationLevel": { "caption": "Secondary" },
                        "activation_date": "2025-08-01"
                    },
                    "company": { "CompanyName": "Hawker Pte Ltd" }
                }]
            }
        })
    }

    #[tokio::test]
    async fn it_maps_a_full_listing() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/apis/job/search")
                .query_param("keywords", "cook")
                .query_param("page", "2")
                .query_param("per_page_count", "10");
            then.status(200).json_body(full_payload());
        });

        let cli = FindSgJobsClient::new(server.base_url(), "k");
        let out = cli.search("cook", 2, 10).await.unwrap();
        m.assert();

        assert_eq!(out.total_jobs, 37);
        assert_eq!(out.current_page, 2);
        assert_eq!(out.total_pages, 4);
        assert_eq!(out.results_on_page, 1);

        let job = &out.jobs[0];
        assert_eq!(job.job_id.as_deref(), Some("9182"));
        assert_eq!(job.title.as_deref(), Some("Line Cook"));
        assert_eq!(job.company.as_deref(), Some("Hawker Pte Ltd"));
        assert_eq!(job.location, vec!["Outram Park", "Chinatown"]);
        assert_eq!(job.salary.as_deref(), Some("SGD 2,200 - 2,800 per Month"));
        assert_eq!(job.posted_date.as_deref(), Some("2025-08-01"));
        assert_eq!(
            job.url.as_deref(),
            Some(format!("{}/job/9182", server.base_url()).as_str())
        );
    }

    #[tokio::test]
    async fn zero_results_is_success_not_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/apis/job/search");
            then.status(200).json_body(json!({
                "data": { "pager": { "record_count": 0, "page": 1, "page_count": 0 }, "result": [] }
            }));
        });

        let cli = FindSgJobsClient::new(server.base_url(), "k");
        let out = cli.search("unobtainium wrangler", 1, 10).await.unwrap();
        assert_eq!(out.total_jobs, 0);
        assert!(out.jobs.is_empty());
    }

    #[tokio::test]
    async fn sparse_listings_still_normalize() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/apis/job/search");
            then.status(200).json_body(json!({
                "data": {
                    "result": [
                        { "job": { "Title": "Dev A" } },
                        { "job": { "Title": "Dev B", "id": "abc-77" }, "company": {} }
                    ]
                }
            }));
        });

        let cli = FindSgJobsClient::new(server.base_url(), "k");
        let out = cli.search("software engineer", 1, 10).await.unwrap();

        // No pager block: totals default, requested page is echoed back.
        assert_eq!(out.total_jobs, 0);
        assert_eq!(out.current_page, 1);
        assert_eq!(out.results_on_page, 2);
        assert_eq!(out.jobs[0].title.as_deref(), Some("Dev A"));
        assert!(out.jobs[0].job_id.is_none());
        assert!(out.jobs[0].url.is_none());
        assert!(out.jobs[0].posted_date.is_none());
        assert_eq!(out.jobs[1].job_id.as_deref(), Some("abc-77"));
    }

    #[tokio::test]
    async fn hidden_salary_flag_suppresses_salary() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/apis/job/search");
            then.status(200).json_body(json!({
                "data": { "result": [{
                    "job": {
                        "Title": "Quiet Role",
                        "id_Job_Donotdisplaysalary": 1,
                        "Salaryrange": { "caption": "9,000 - 12,000" }
                    }
                }] }
            }));
        });

        let cli = FindSgJobsClient::new(server.base_url(), "k");
        let out = cli.search("x", 1, 10).await.unwrap();
        assert!(out.jobs[0].salary.is_none());
    }

    #[tokio::test]
    async fn non_success_status_maps_to_upstream_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/apis/job/search");
            then.status(503).body("upstream down");
        });

        let cli = FindSgJobsClient::new(server.base_url(), "k");
        let err = cli.search("cook", 1, 10).await.unwrap_err();
        assert!(matches!(err, SearchError::UpstreamStatus(503)));
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn slow_upstream_exhausts_the_wait_budget() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/apis/job/search");
            then.status(200)
                .json_body(json!({"data": {"result": []}}))
                .delay(Duration::from_millis(1500));
        });

        let cfg = Config {
            api_key: "k".into(),
            base_url: server.base_url(),
            timeout_secs: 1,
        };
        let cli = FindSgJobsClient::from_config(&cfg);
        let err = cli.search("cook", 1, 10).await.unwrap_err();
        assert!(matches!(err, SearchError::Timeout));
        assert_eq!(err.to_string(), "request timed out");
    }

    #[tokio::test]
    async fn undecodable_body_maps_to_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/apis/job/search");
            then.status(200).body("<html>not json</html>");
        });

        let cli = FindSgJobsClient::new(server.base_url(), "k");
        let err = cli.search("cook", 1, 10).await.unwrap_err();
        assert!(matches!(err, SearchError::Malformed(_)));
    }

    #[tokio::test]
    async fn it_sends_api_key_and_correlation_headers() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/apis/job/search")
                .header("x-api-key", "sekrit")
                .header_exists("x-request-id")
                .header_exists("user-agent");
            then.status(200).json_body(json!({"data": {"result": []}}));
        });

        let cli = FindSgJobsClient::new(server.base_url(), "sekrit");
        let _ = cli.search("cook", 1, 10).await.unwrap();
        m.assert();
    }

    #[tokio::test]
    async fn per_page_is_clamped_to_upstream_cap() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/apis/job/search")
                .query_param("per_page_count", "20");
            then.status(200).json_body(json!({"data": {"result": []}}));
        });

        let cli = FindSgJobsClient::new(server.base_url(), "k");
        let _ = cli.search("cook", 1, 500).await.unwrap();
        m.assert();
    }

    #[tokio::test]
    async fn empty_keywords_pass_through_without_crashing() {
        // Documented policy: the client does not validate keywords; the
        // tool layer rejects empty input before it gets here, but a direct
        // call must still yield a well-formed result.
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/apis/job/search")
                .query_param("keywords", "");
            then.status(200).json_body(json!({
                "data": { "pager": { "record_count": 0, "page_count": 0 }, "result": [] }
            }));
        });

        let cli = FindSgJobsClient::new(server.base_url(), "k");
        let out = cli.search("", 1, 10).await.unwrap();
        assert_eq!(out.total_jobs, 0);
    }
}
