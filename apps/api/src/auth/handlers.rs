//! Axum route handlers for registration, login, profile and legacy import.

use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::auth::password::{hash_password, is_argon2_hash, validate_password, verify_password};
use crate::auth::users::{self, LegacyInsert};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::JsonBody;
use crate::models::user::{UserProfile, UserRow};
use crate::normalize::{map_legacy_user, map_profile_patch, normalize_email, LegacyUser};
use crate::state::AppState;

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default, alias = "fullName", alias = "name")]
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub skipped: Vec<SkippedRecord>,
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let email = normalize_email(&req.email)
        .ok_or_else(|| AppError::Validation("A valid email address is required".to_string()))?;
    validate_password(&req.password).map_err(AppError::Validation)?;

    if users::find_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::Conflict(format!("{email} is already registered")));
    }

    let password_hash = hash_password(&req.password).map_err(|e| AppError::Internal(e.into()))?;
    let full_name = req
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let user = users::insert_user(&state.db, &email, &password_hash, full_name).await?;
    info!("Registered user {} ({})", user.id, user.email);

    let response = auth_response(&state, user)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn handle_login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = normalize_email(&req.email).ok_or(AppError::Unauthorized)?;
    let user = users::find_by_email(&state.db, &email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
        warn!("Stored hash for user {} is unusable: {e}", user.id);
        AppError::Unauthorized
    })?;
    if !valid {
        return Err(AppError::Unauthorized);
    }

    Ok(Json(auth_response(&state, user)?))
}

/// GET /api/v1/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    let row = users::find_by_id(&state.db, user.id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(row.into()))
}

/// PATCH /api/v1/auth/me
///
/// Accepts any of the key spellings the old front-ends sent (`fullName`, `name`, `jobTitle`, …).
pub async fn handle_update_me(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<UserProfile>, AppError> {
    if !body.is_object() {
        return Err(AppError::Validation(
            "Profile update must be a JSON object".to_string(),
        ));
    }

    let patch = map_profile_patch(&body);
    let row = if patch.is_empty() {
        users::find_by_id(&state.db, user.id).await?
    } else {
        users::update_profile(&state.db, user.id, &patch).await?
    };

    row.map(|r| Json(r.into())).ok_or(AppError::Unauthorized)
}

/// POST /api/v1/users/import
///
/// Imports user records exported from the legacy stores. Only records carrying an
/// Argon2 PHC hash can be imported; anything else would be unusable at login.
pub async fn handle_import_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(records): JsonBody<Vec<Value>>,
) -> Result<Json<ImportResponse>, AppError> {
    let expected = state.config.admin_token.as_deref().ok_or(AppError::Forbidden)?;
    let provided = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Forbidden)?;
    if provided != expected {
        return Err(AppError::Forbidden);
    }

    let (candidates, mut skipped) = classify_import(&records);
    let mut imported = 0;

    for (index, legacy) in candidates {
        let inserted = users::insert_legacy_user(
            &state.db,
            LegacyInsert {
                email: &legacy.email,
                password_hash: &legacy.password_hash,
                full_name: legacy.full_name.as_deref(),
                headline: legacy.headline.as_deref(),
                location: legacy.location.as_deref(),
                created_at: legacy.created_at,
            },
        )
        .await?;

        match inserted {
            Some(_) => imported += 1,
            None => skipped.push(SkippedRecord {
                index,
                reason: "email already registered".to_string(),
            }),
        }
    }

    info!(
        "Legacy import: {imported} imported, {} skipped",
        skipped.len()
    );
    Ok(Json(ImportResponse { imported, skipped }))
}

/// Splits an import batch into importable users and records skipped before
/// touching the database. Indices refer to positions in `records`.
pub fn classify_import(records: &[Value]) -> (Vec<(usize, LegacyUser)>, Vec<SkippedRecord>) {
    let mut candidates = Vec::new();
    let mut skipped = Vec::new();

    for (index, record) in records.iter().enumerate() {
        match map_legacy_user(record) {
            Ok(legacy) if is_argon2_hash(&legacy.password_hash) => candidates.push((index, legacy)),
            Ok(_) => skipped.push(SkippedRecord {
                index,
                reason: "unsupported password hash".to_string(),
            }),
            Err(e) => skipped.push(SkippedRecord {
                index,
                reason: e.to_string(),
            }),
        }
    }
    (candidates, skipped)
}

fn auth_response(state: &AppState, user: UserRow) -> Result<AuthResponse, AppError> {
    let token = state
        .tokens
        .issue(user.id, &user.email)
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(AuthResponse {
        user: user.into(),
        token,
    })
}
