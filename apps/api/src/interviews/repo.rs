use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::interviews::{InterviewKind, Outcome};
use crate::models::application::InterviewRow;

pub struct NewInterview<'a> {
    pub id: Uuid,
    pub application_id: Uuid,
    pub user_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub kind: InterviewKind,
    pub location: Option<&'a str>,
    pub notes: Option<&'a str>,
}

#[derive(Debug, Default)]
pub struct InterviewPatch {
    pub scheduled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub outcome: Option<Outcome>,
}

pub async fn insert_interview(
    conn: &mut PgConnection,
    interview: NewInterview<'_>,
) -> Result<InterviewRow, sqlx::Error> {
    sqlx::query_as::<_, InterviewRow>(
        r#"
        INSERT INTO interviews
            (id, application_id, user_id, scheduled_at, kind, location, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(interview.id)
    .bind(interview.application_id)
    .bind(interview.user_id)
    .bind(interview.scheduled_at)
    .bind(interview.kind.as_str())
    .bind(interview.location)
    .bind(interview.notes)
    .fetch_one(conn)
    .await
}

/// With `after` set, only interviews scheduled later than it.
pub async fn list_interviews(
    pool: &PgPool,
    user_id: i64,
    after: Option<DateTime<Utc>>,
) -> Result<Vec<InterviewRow>, sqlx::Error> {
    sqlx::query_as::<_, InterviewRow>(
        r#"
        SELECT * FROM interviews
        WHERE user_id = $1 AND ($2::TIMESTAMPTZ IS NULL OR scheduled_at > $2)
        ORDER BY scheduled_at
        "#,
    )
    .bind(user_id)
    .bind(after)
    .fetch_all(pool)
    .await
}

pub async fn list_for_application(
    pool: &PgPool,
    application_id: Uuid,
) -> Result<Vec<InterviewRow>, sqlx::Error> {
    sqlx::query_as::<_, InterviewRow>(
        "SELECT * FROM interviews WHERE application_id = $1 ORDER BY scheduled_at",
    )
    .bind(application_id)
    .fetch_all(pool)
    .await
}

pub async fn update_interview(
    pool: &PgPool,
    user_id: i64,
    id: Uuid,
    patch: &InterviewPatch,
) -> Result<Option<InterviewRow>, sqlx::Error> {
    sqlx::query_as::<_, InterviewRow>(
        r#"
        UPDATE interviews SET
            scheduled_at = COALESCE($3, scheduled_at),
            notes        = COALESCE($4, notes),
            outcome      = COALESCE($5, outcome)
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(patch.scheduled_at)
    .bind(patch.notes.as_deref())
    .bind(patch.outcome.map(|o| o.as_str()))
    .fetch_optional(pool)
    .await
}

pub async fn delete_interview(pool: &PgPool, user_id: i64, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM interviews WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
