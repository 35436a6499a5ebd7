use serde::Deserialize;

use crate::models::job::JobListing;

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct JobQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    /// Signed so out-of-range values are clamped rather than rejected.
    pub limit: Option<i64>,
}

impl JobQuery {
    pub fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    pub fn limit(&self) -> usize {
        clamp_limit(self.limit, DEFAULT_LIMIT, MAX_LIMIT)
    }
}

/// `raw` or `default`, clamped to `1..=max`.
pub fn clamp_limit(raw: Option<i64>, default: usize, max: usize) -> usize {
    match raw {
        Some(n) => n.clamp(1, max as i64) as usize,
        None => default,
    }
}

/// Keeps listings whose title, company or tags contain every search term
/// (case-insensitive). Returns the total match count alongside the truncated page.
pub fn filter_jobs(jobs: Vec<JobListing>, query: &JobQuery) -> (Vec<JobListing>, usize) {
    let terms: Vec<String> = query
        .search
        .as_deref()
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();

    let matched: Vec<JobListing> = jobs
        .into_iter()
        .filter(|job| terms.iter().all(|term| matches_term(job, term)))
        .collect();

    let total = matched.len();
    let page = matched.into_iter().take(query.limit()).collect();
    (page, total)
}

fn matches_term(job: &JobListing, term: &str) -> bool {
    job.title.to_lowercase().contains(term)
        || job.company.to_lowercase().contains(term)
        || job.tags.iter().any(|t| t.to_lowercase().contains(term))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str, title: &str, company: &str, tags: &[&str]) -> JobListing {
        JobListing {
            id: id.to_string(),
            title: title.to_string(),
            company: company.to_string(),
            location: None,
            job_type: None,
            category: None,
            salary: None,
            url: None,
            published_at: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            description: String::new(),
        }
    }

    fn fixtures() -> Vec<JobListing> {
        vec![
            job("1", "Senior Rust Engineer", "Ferrous", &["systems"]),
            job("2", "Frontend Developer", "Pixel", &["react", "typescript"]),
            job("3", "Platform Engineer", "RustCorp", &["kubernetes"]),
        ]
    }

    #[test]
    fn test_search_matches_title_company_and_tags() {
        let query = JobQuery {
            search: Some("RUST".to_string()),
            ..Default::default()
        };
        let (page, total) = filter_jobs(fixtures(), &query);
        assert_eq!(total, 2);
        assert_eq!(page[0].id, "1");
        assert_eq!(page[1].id, "3");

        let query = JobQuery {
            search: Some("react".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_jobs(fixtures(), &query).1, 1);
    }

    #[test]
    fn test_all_terms_must_match() {
        let query = JobQuery {
            search: Some("engineer kubernetes".to_string()),
            ..Default::default()
        };
        let (page, _) = filter_jobs(fixtures(), &query);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "3");
    }

    #[test]
    fn test_limit_truncates_but_total_counts_all() {
        let query = JobQuery {
            limit: Some(1),
            ..Default::default()
        };
        let (page, total) = filter_jobs(fixtures(), &query);
        assert_eq!(page.len(), 1);
        assert_eq!(total, 3);
    }

    #[test]
    fn test_limit_is_clamped() {
        let zero = JobQuery {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(zero.limit(), 1);
        let huge = JobQuery {
            limit: Some(10_000),
            ..Default::default()
        };
        assert_eq!(huge.limit(), MAX_LIMIT);
        assert_eq!(JobQuery::default().limit(), DEFAULT_LIMIT);
        let negative = JobQuery {
            limit: Some(-5),
            ..Default::default()
        };
        assert_eq!(negative.limit(), 1);
    }

    #[test]
    fn test_clamp_limit_bounds() {
        assert_eq!(clamp_limit(None, 10, 50), 10);
        assert_eq!(clamp_limit(Some(-5), 10, 50), 1);
        assert_eq!(clamp_limit(Some(i64::MAX), 10, 50), 50);
        assert_eq!(clamp_limit(Some(7), 10, 50), 7);
    }

    #[test]
    fn test_blank_category_is_none() {
        let query = JobQuery {
            category: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(query.category().is_none());
    }
}
