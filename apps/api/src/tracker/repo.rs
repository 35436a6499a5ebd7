use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::application::{ApplicationRow, StageEventRow};
use crate::tracker::machine::Stage;

pub struct NewApplication<'a> {
    pub id: Uuid,
    pub user_id: i64,
    pub job_id: Option<&'a str>,
    pub company: &'a str,
    pub title: &'a str,
    pub url: Option<&'a str>,
    pub location: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub stage: Stage,
}

/// Editable fields. `None` leaves the column as it is.
#[derive(Debug, Default)]
pub struct ApplicationPatch {
    pub company: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

pub async fn insert_application(
    conn: &mut PgConnection,
    app: NewApplication<'_>,
) -> Result<ApplicationRow, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>(
        r#"
        INSERT INTO applications
            (id, user_id, job_id, company, title, url, location, notes, stage)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(app.id)
    .bind(app.user_id)
    .bind(app.job_id)
    .bind(app.company)
    .bind(app.title)
    .bind(app.url)
    .bind(app.location)
    .bind(app.notes)
    .bind(app.stage.as_str())
    .fetch_one(conn)
    .await
}

pub async fn list_applications(
    pool: &PgPool,
    user_id: i64,
    stage: Option<Stage>,
) -> Result<Vec<ApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>(
        r#"
        SELECT * FROM applications
        WHERE user_id = $1 AND ($2::TEXT IS NULL OR stage = $2)
        ORDER BY updated_at DESC
        "#,
    )
    .bind(user_id)
    .bind(stage.map(|s| s.as_str()))
    .fetch_all(pool)
    .await
}

pub async fn find_application(
    pool: &PgPool,
    user_id: i64,
    id: Uuid,
) -> Result<Option<ApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Row-locks the application until the surrounding transaction ends.
pub async fn lock_application(
    conn: &mut PgConnection,
    user_id: i64,
    id: Uuid,
) -> Result<Option<ApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>(
        "SELECT * FROM applications WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(conn)
    .await
}

pub async fn update_application(
    pool: &PgPool,
    user_id: i64,
    id: Uuid,
    patch: &ApplicationPatch,
) -> Result<Option<ApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>(
        r#"
        UPDATE applications SET
            company    = COALESCE($3, company),
            title      = COALESCE($4, title),
            url        = COALESCE($5, url),
            location   = COALESCE($6, location),
            notes      = COALESCE($7, notes),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(patch.company.as_deref())
    .bind(patch.title.as_deref())
    .bind(patch.url.as_deref())
    .bind(patch.location.as_deref())
    .bind(patch.notes.as_deref())
    .fetch_optional(pool)
    .await
}

pub async fn set_stage(
    conn: &mut PgConnection,
    id: Uuid,
    stage: Stage,
) -> Result<ApplicationRow, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>(
        "UPDATE applications SET stage = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(stage.as_str())
    .fetch_one(conn)
    .await
}

pub async fn insert_event(
    conn: &mut PgConnection,
    application_id: Uuid,
    from: Option<Stage>,
    to: Stage,
    note: Option<&str>,
) -> Result<StageEventRow, sqlx::Error> {
    sqlx::query_as::<_, StageEventRow>(
        r#"
        INSERT INTO application_events (application_id, from_stage, to_stage, note)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(application_id)
    .bind(from.map(|s| s.as_str()))
    .bind(to.as_str())
    .bind(note)
    .fetch_one(conn)
    .await
}

/// Oldest first.
pub async fn list_events(
    pool: &PgPool,
    application_id: Uuid,
) -> Result<Vec<StageEventRow>, sqlx::Error> {
    sqlx::query_as::<_, StageEventRow>(
        "SELECT * FROM application_events WHERE application_id = $1 ORDER BY created_at, id",
    )
    .bind(application_id)
    .fetch_all(pool)
    .await
}

pub async fn stage_counts(pool: &PgPool, user_id: i64) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (String, i64)>(
        "SELECT stage, COUNT(*) FROM applications WHERE user_id = $1 GROUP BY stage",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn delete_application(pool: &PgPool, user_id: i64, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM applications WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
