use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::resume::{ResumeRow, ResumeSummary};

const SUMMARY_COLUMNS: &str = "id, file_name, content_type, size_bytes, \
     analysis IS NOT NULL AS analyzed, formatted_text IS NOT NULL AS reformatted, created_at";

/// Parameters for recording a freshly uploaded resume.
pub struct NewResume<'a> {
    pub id: Uuid,
    pub user_id: i64,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub size_bytes: i64,
    pub s3_key: &'a str,
    pub extracted_text: &'a str,
}

pub async fn insert_resume(pool: &PgPool, resume: NewResume<'_>) -> Result<ResumeSummary, sqlx::Error> {
    sqlx::query_as::<_, ResumeSummary>(&format!(
        r#"
        INSERT INTO resumes
            (id, user_id, file_name, content_type, size_bytes, s3_key, extracted_text)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {SUMMARY_COLUMNS}
        "#
    ))
    .bind(resume.id)
    .bind(resume.user_id)
    .bind(resume.file_name)
    .bind(resume.content_type)
    .bind(resume.size_bytes)
    .bind(resume.s3_key)
    .bind(resume.extracted_text)
    .fetch_one(pool)
    .await
}

pub async fn list_resumes(pool: &PgPool, user_id: i64) -> Result<Vec<ResumeSummary>, sqlx::Error> {
    sqlx::query_as::<_, ResumeSummary>(&format!(
        "SELECT {SUMMARY_COLUMNS} FROM resumes WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Scoped to the owner: another user's resume reads as absent.
pub async fn find_resume(
    pool: &PgPool,
    user_id: i64,
    id: Uuid,
) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn delete_resume(pool: &PgPool, user_id: i64, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn store_analysis(pool: &PgPool, id: Uuid, analysis: &Value) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE resumes SET analysis = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(analysis)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn store_formatted_text(pool: &PgPool, id: Uuid, text: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE resumes SET formatted_text = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(text)
        .execute(pool)
        .await?;
    Ok(())
}
