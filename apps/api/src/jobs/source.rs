//! Job sources: pluggable, trait-based access to upstream job listings.
//!
//! `AppState` holds an `Arc<dyn JobSource>`: the Remotive feed wrapped in a Redis cache.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::job::JobListing;
use crate::normalize::{get_field, map_remote_job};

const FEED_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed returned status {0}")]
    Status(u16),

    #[error("malformed feed: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch(&self, category: Option<&str>) -> Result<Vec<JobListing>, FeedError>;
}

/// The Remotive public jobs API.
pub struct RemotiveSource {
    client: Client,
    url: String,
}

impl RemotiveSource {
    pub fn new(url: String) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(FEED_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl JobSource for RemotiveSource {
    async fn fetch(&self, category: Option<&str>) -> Result<Vec<JobListing>, FeedError> {
        let mut request = self.client.get(&self.url);
        if let Some(category) = category {
            request = request.query(&[("category", category)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FeedError::Malformed(e.to_string()))?;
        parse_feed(&body)
    }
}

/// Accepts `{"jobs": [...]}` (Remotive), `{"data": [...]}`, or a bare array.
pub fn parse_feed(body: &Value) -> Result<Vec<JobListing>, FeedError> {
    let items = match body {
        Value::Array(items) => items,
        _ => get_field(body, &["jobs", "data", "results"])
            .and_then(Value::as_array)
            .ok_or_else(|| FeedError::Malformed("no job array in response".to_string()))?,
    };

    let jobs: Vec<JobListing> = items.iter().filter_map(map_remote_job).collect();
    if jobs.len() < items.len() {
        debug!("Dropped {} feed items without id/title", items.len() - jobs.len());
    }
    Ok(jobs)
}

/// Caches a source's listings in Redis per category. Redis trouble never fails
/// a request; it only costs a trip upstream.
pub struct CachedJobSource {
    inner: Arc<dyn JobSource>,
    redis: redis::Client,
    ttl_secs: u64,
}

impl CachedJobSource {
    pub fn new(inner: Arc<dyn JobSource>, redis: redis::Client, ttl_secs: u64) -> Self {
        Self {
            inner,
            redis,
            ttl_secs,
        }
    }

    async fn read_cache(&self, key: &str) -> redis::RedisResult<Option<Vec<JobListing>>> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let cached: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(cached.and_then(|payload| match serde_json::from_str(&payload) {
            Ok(jobs) => Some(jobs),
            Err(e) => {
                warn!("Discarding unreadable cache entry {key}: {e}");
                None
            }
        }))
    }

    async fn write_cache(&self, key: &str, jobs: &[JobListing]) -> redis::RedisResult<()> {
        let payload = match serde_json::to_string(jobs) {
            Ok(p) => p,
            Err(e) => {
                warn!("Could not serialize jobs for cache: {e}");
                return Ok(());
            }
        };
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(payload)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl JobSource for CachedJobSource {
    async fn fetch(&self, category: Option<&str>) -> Result<Vec<JobListing>, FeedError> {
        // one spelling per cache entry, and upstream sees that same spelling
        let category = normalize_category(category);
        let category = category.as_deref();
        let key = cache_key(category);

        match self.read_cache(&key).await {
            Ok(Some(jobs)) => {
                debug!("Jobs cache hit for {key}");
                return Ok(jobs);
            }
            Ok(None) => debug!("Jobs cache miss for {key}"),
            Err(e) => warn!("Jobs cache unavailable, going upstream: {e}"),
        }

        let jobs = self.inner.fetch(category).await?;

        if let Err(e) = self.write_cache(&key, &jobs).await {
            warn!("Failed to cache jobs under {key}: {e}");
        }
        Ok(jobs)
    }
}

/// Trimmed, lowercased category slug. Blank means no category.
pub fn normalize_category(category: Option<&str>) -> Option<String> {
    category
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
}

pub fn cache_key(category: Option<&str>) -> String {
    let category = normalize_category(category).unwrap_or_else(|| "all".to_string());
    format!("jobs:feed:{category}")
}
