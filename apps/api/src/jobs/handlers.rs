//! Axum route handlers for the Jobs and News API.

use axum::{
    extract::State,
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extract::QueryParams;
use crate::jobs::card::render_cards;
use crate::jobs::filter::{clamp_limit, filter_jobs, JobQuery};
use crate::jobs::news::NewsItem;
use crate::models::job::JobListing;
use crate::state::AppState;

const DEFAULT_NEWS_LIMIT: usize = 10;
const MAX_NEWS_LIMIT: usize = 50;

#[derive(Debug, Serialize)]
pub struct JobsResponse {
    pub jobs: Vec<JobListing>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct NewsResponse {
    pub items: Vec<NewsItem>,
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<JobQuery>,
) -> Result<Json<JobsResponse>, AppError> {
    let (jobs, total) = load_jobs(&state, &query).await?;
    Ok(Json(JobsResponse { jobs, total }))
}

/// GET /api/v1/jobs/cards
///
/// Same query as `/api/v1/jobs`, rendered as an HTML fragment for direct insertion.
pub async fn handle_job_cards(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<JobQuery>,
) -> Result<Html<String>, AppError> {
    let (jobs, _) = load_jobs(&state, &query).await?;
    Ok(Html(render_cards(&jobs)))
}

/// GET /api/v1/news
pub async fn handle_news(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<NewsQuery>,
) -> Result<Json<NewsResponse>, AppError> {
    let limit = clamp_limit(query.limit, DEFAULT_NEWS_LIMIT, MAX_NEWS_LIMIT);

    let mut items = state
        .news
        .fetch_headlines()
        .await
        .map_err(|e| AppError::Upstream(format!("News feed: {e}")))?;
    items.truncate(limit);

    Ok(Json(NewsResponse { items }))
}

async fn load_jobs(
    state: &AppState,
    query: &JobQuery,
) -> Result<(Vec<JobListing>, usize), AppError> {
    let jobs = state
        .jobs
        .fetch(query.category())
        .await
        .map_err(|e| AppError::Upstream(format!("Jobs feed: {e}")))?;
    Ok(filter_jobs(jobs, query))
}
