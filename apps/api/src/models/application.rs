use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub user_id: i64,
    pub job_id: Option<String>,
    pub company: String,
    pub title: String,
    pub url: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub stage: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StageEventRow {
    pub id: i64,
    pub application_id: Uuid,
    pub from_stage: Option<String>,
    pub to_stage: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub user_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub kind: String,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub outcome: String,
    pub created_at: DateTime<Utc>,
}
