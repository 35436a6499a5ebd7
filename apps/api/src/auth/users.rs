use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::user::UserRow;
use crate::normalize::ProfilePatch;

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Inserts a new user. A duplicate email surfaces as a unique violation.
pub async fn insert_user(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    full_name: Option<&str>,
) -> Result<UserRow, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (email, password_hash, full_name)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(email)
    .bind(password_hash)
    .bind(full_name)
    .fetch_one(pool)
    .await
}

/// Parameters for inserting a user carried over from a legacy store.
pub struct LegacyInsert<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub full_name: Option<&'a str>,
    pub headline: Option<&'a str>,
    pub location: Option<&'a str>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Returns `None` when the email is already registered.
pub async fn insert_legacy_user(
    pool: &PgPool,
    user: LegacyInsert<'_>,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO users (email, password_hash, full_name, headline, location, created_at)
        VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()))
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.full_name)
    .bind(user.headline)
    .bind(user.location)
    .bind(user.created_at)
    .fetch_optional(pool)
    .await
}

/// Applies the present fields of `patch`; absent fields keep their stored value.
pub async fn update_profile(
    pool: &PgPool,
    id: i64,
    patch: &ProfilePatch,
) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users
        SET full_name = COALESCE($2, full_name),
            headline  = COALESCE($3, headline),
            location  = COALESCE($4, location)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(patch.full_name.as_deref())
    .bind(patch.headline.as_deref())
    .bind(patch.location.as_deref())
    .fetch_optional(pool)
    .await
}
