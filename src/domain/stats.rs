//! Aggregation of a sample of listings into a job-market summary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::JobListing;

/// Upstream caps a page at 20 results, so that is also the statistics sample cap.
pub const MAX_SAMPLE_SIZE: u32 = 20;

const TOP_N: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountEntry {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsBreakdown {
    pub top_categories: Vec<CountEntry>,
    pub employment_types: Vec<CountEntry>,
    pub top_locations: Vec<CountEntry>,
    pub education_requirements: Vec<CountEntry>,
    pub experience_requirements: Vec<CountEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobStatistics {
    pub keyword: String,
    pub total_jobs_in_market: u64,
    pub jobs_analyzed: usize,
    pub statistics: StatsBreakdown,
}

/// Count categories, employment types, locations and requirements across a
/// sample of listings. Deterministic: entries are sorted by count descending,
/// then name ascending.
pub fn calculate(keyword: &str, total_jobs: u64, jobs: &[JobListing]) -> JobStatistics {
    let mut categories: HashMap<String, u64> = HashMap::new();
    let mut employment_types: HashMap<String, u64> = HashMap::new();
    let mut locations: HashMap<String, u64> = HashMap::new();
    let mut education: HashMap<String, u64> = HashMap::new();
    let mut experience: HashMap<String, u64> = HashMap::new();

    for job in jobs {
        for c in &job.categories {
            count_into(&mut categories, c);
        }
        for e in &job.employment_type {
            count_into(&mut employment_types, e);
        }
        for l in &job.location {
            count_into(&mut locations, l);
        }
        if let Some(edu) = &job.education {
            count_into(&mut education, edu);
        }
        if let Some(exp) = &job.experience {
            count_into(&mut experience, exp);
        }
    }

    JobStatistics {
        keyword: keyword.to_string(),
        total_jobs_in_market: total_jobs,
        jobs_analyzed: jobs.len(),
        statistics: StatsBreakdown {
            top_categories: ranked(categories, Some(TOP_N)),
            employment_types: ranked(employment_types, None),
            top_locations: ranked(locations, Some(TOP_N)),
            education_requirements: ranked(education, None),
            experience_requirements: ranked(experience, None),
        },
    }
}

fn count_into(map: &mut HashMap<String, u64>, value: &str) {
    if !value.is_empty() {
        *map.entry(value.to_string()).or_default() += 1;
    }
}

fn ranked(map: HashMap<String, u64>, limit: Option<usize>) -> Vec<CountEntry> {
    let mut entries: Vec<CountEntry> = map
        .into_iter()
        .map(|(name, count)| CountEntry { name, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    if let Some(n) = limit {
        entries.truncate(n);
    }
    entries
}
