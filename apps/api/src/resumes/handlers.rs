//! Axum route handlers for the Resume API.

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::PathParam;
use crate::llm_client::strip_code_fences;
use crate::models::resume::{ResumeRow, ResumeSummary};
use crate::resumes::analysis::{normalize_analysis, ResumeAnalysis};
use crate::resumes::extract::{extract_text, sanitize_file_name, ResumeFormat};
use crate::resumes::prompts::{
    build_analyze_prompt, build_reformat_prompt, ReformatStyle, ANALYZE_SYSTEM, REFORMAT_SYSTEM,
};
use crate::resumes::repo::{self, NewResume};
use crate::resumes::storage;
use crate::state::AppState;

/// Multipart field carrying the resume file.
const UPLOAD_FIELD: &str = "resume";

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default, alias = "targetRole")]
    pub target_role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReformatRequest {
    #[serde(default)]
    pub style: ReformatStyle,
    #[serde(default, alias = "targetRole")]
    pub target_role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReformatResponse {
    pub resume_id: Uuid,
    pub style: ReformatStyle,
    pub formatted_text: String,
}

struct Upload {
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

/// POST /api/v1/resumes
///
/// Accepts a multipart upload, extracts its text, stores the original in S3.
pub async fn handle_upload(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ResumeSummary>), AppError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        upload = Some(Upload {
            file_name: field.file_name().unwrap_or("resume").to_string(),
            content_type: field.content_type().map(str::to_string),
            data: field.bytes().await?,
        });
        break;
    }

    let Upload {
        file_name,
        content_type,
        data,
    } = upload.ok_or_else(|| {
        AppError::Validation(format!("Multipart field '{UPLOAD_FIELD}' is required"))
    })?;

    if data.len() > state.config.max_upload_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Resume exceeds the {} byte limit",
            state.config.max_upload_bytes
        )));
    }
    if data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    let format = ResumeFormat::detect(&file_name, content_type.as_deref(), &data).ok_or_else(
        || AppError::Validation("Only PDF, plain text and Markdown resumes are supported".to_string()),
    )?;

    let extracted_text = {
        let data = data.clone();
        tokio::task::spawn_blocking(move || extract_text(format, &data))
            .await
            .map_err(|e| {
                warn!("Text extraction task failed: {e}");
                AppError::UnprocessableEntity("Could not read the uploaded document".to_string())
            })?
            .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?
    };

    let resume_id = Uuid::new_v4();
    let safe_name = sanitize_file_name(&file_name);
    let s3_key = storage::object_key(user.id, resume_id, &safe_name);
    let size_bytes = data.len() as i64;

    storage::put_object(
        &state.s3,
        &state.config.s3_bucket,
        &s3_key,
        data,
        format.content_type(),
    )
    .await?;

    let inserted = repo::insert_resume(
        &state.db,
        NewResume {
            id: resume_id,
            user_id: user.id,
            file_name: &safe_name,
            content_type: format.content_type(),
            size_bytes,
            s3_key: &s3_key,
            extracted_text: &extracted_text,
        },
    )
    .await;

    let summary = match inserted {
        Ok(summary) => summary,
        Err(e) => {
            // keep S3 in step with the table
            if let Err(cleanup) =
                storage::delete_object(&state.s3, &state.config.s3_bucket, &s3_key).await
            {
                warn!("Orphaned resume object {s3_key}: {cleanup}");
            }
            return Err(e.into());
        }
    };

    info!(
        "User {} uploaded resume {} ({:?}, {} bytes)",
        user.id, resume_id, format, size_bytes
    );
    Ok((StatusCode::CREATED, Json(summary)))
}

/// GET /api/v1/resumes
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ResumeSummary>>, AppError> {
    Ok(Json(repo::list_resumes(&state.db, user.id).await?))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(resume_id): PathParam<Uuid>,
) -> Result<Json<ResumeRow>, AppError> {
    Ok(Json(load_owned(&state, user.id, resume_id).await?))
}

/// GET /api/v1/resumes/:id/file
pub async fn handle_download(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(resume_id): PathParam<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let resume = load_owned(&state, user.id, resume_id).await?;
    let body = storage::get_object(&state.s3, &state.config.s3_bucket, &resume.s3_key).await?;

    Ok((
        [
            (header::CONTENT_TYPE, resume.content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", resume.file_name),
            ),
        ],
        body,
    ))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(resume_id): PathParam<Uuid>,
) -> Result<StatusCode, AppError> {
    let resume = load_owned(&state, user.id, resume_id).await?;
    repo::delete_resume(&state.db, user.id, resume_id).await?;

    if let Err(e) = storage::delete_object(&state.s3, &state.config.s3_bucket, &resume.s3_key).await
    {
        warn!("Resume {resume_id} deleted but its object was not: {e}");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resumes/:id/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(resume_id): PathParam<Uuid>,
    body: Option<Json<AnalyzeRequest>>,
) -> Result<Json<ResumeAnalysis>, AppError> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let resume = load_owned(&state, user.id, resume_id).await?;

    let prompt = build_analyze_prompt(&resume.extracted_text, request.target_role.as_deref());
    let raw: serde_json::Value = state
        .llm
        .call_json(&prompt, ANALYZE_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Resume analysis failed: {e}")))?;

    let analysis = normalize_analysis(&raw)
        .ok_or_else(|| AppError::Llm("Resume analysis reply had no score or summary".to_string()))?;

    let stored = serde_json::to_value(&analysis).map_err(|e| AppError::Internal(e.into()))?;
    repo::store_analysis(&state.db, resume_id, &stored).await?;

    info!("Analyzed resume {resume_id}: score {}", analysis.score);
    Ok(Json(analysis))
}

/// POST /api/v1/resumes/:id/reformat
pub async fn handle_reformat(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(resume_id): PathParam<Uuid>,
    body: Option<Json<ReformatRequest>>,
) -> Result<Json<ReformatResponse>, AppError> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let resume = load_owned(&state, user.id, resume_id).await?;

    let prompt = build_reformat_prompt(
        &resume.extracted_text,
        request.style,
        request.target_role.as_deref(),
    );
    let reply = state
        .llm
        .call_text(&prompt, REFORMAT_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Resume reformat failed: {e}")))?;

    let formatted_text = strip_code_fences(&reply).to_string();
    if formatted_text.is_empty() {
        return Err(AppError::Llm("Resume reformat returned no text".to_string()));
    }

    repo::store_formatted_text(&state.db, resume_id, &formatted_text).await?;

    Ok(Json(ReformatResponse {
        resume_id,
        style: request.style,
        formatted_text,
    }))
}

async fn load_owned(state: &AppState, user_id: i64, resume_id: Uuid) -> Result<ResumeRow, AppError> {
    repo::find_resume(&state.db, user_id, resume_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))
}
