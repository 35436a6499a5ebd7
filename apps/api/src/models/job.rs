use serde::{Deserialize, Serialize};

/// A job posting as served to clients, independent of the upstream feed's schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobListing {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub category: Option<String>,
    pub salary: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<String>,
    pub tags: Vec<String>,
    pub description: String,
}
