use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use axum::extract::FromRef;
use sqlx::PgPool;

use crate::auth::token::TokenKeys;
use crate::config::Config;
use crate::jobs::news::NewsClient;
use crate::jobs::source::JobSource;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub llm: LlmClient,
    pub config: Config,
    pub tokens: TokenKeys,
    /// Job listings source. Default: Remotive behind a Redis cache.
    pub jobs: Arc<dyn JobSource>,
    pub news: NewsClient,
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}
