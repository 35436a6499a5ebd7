//! Axum route handlers for the application tracker.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::interviews;
use crate::models::application::{ApplicationRow, InterviewRow, StageEventRow};
use crate::state::AppState;
use crate::tracker::machine::{Stage, StageCounts};
use crate::tracker::repo::{self, ApplicationPatch, NewApplication};

#[derive(Debug, Deserialize)]
pub struct CreateApplicationRequest {
    pub company: String,
    pub title: String,
    #[serde(default, alias = "jobId")]
    pub job_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub stage: Option<Stage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateApplicationRequest {
    pub company: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeStageRequest {
    pub stage: Stage,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationListQuery {
    pub stage: Option<Stage>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationDetail {
    pub application: ApplicationRow,
    pub history: Vec<StageEventRow>,
    pub interviews: Vec<InterviewRow>,
}

#[derive(Debug, Serialize)]
pub struct StageChange {
    pub application: ApplicationRow,
    pub event: StageEventRow,
}

/// POST /api/v1/applications
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(req): JsonBody<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationDetail>), AppError> {
    let company = required(&req.company, "company")?;
    let title = required(&req.title, "title")?;
    let stage = req.stage.unwrap_or(Stage::Saved).check_initial()?;

    let mut tx = state.db.begin().await?;
    let application = repo::insert_application(
        &mut *tx,
        NewApplication {
            id: Uuid::new_v4(),
            user_id: user.id,
            job_id: non_blank(req.job_id.as_deref()),
            company,
            title,
            url: non_blank(req.url.as_deref()),
            location: non_blank(req.location.as_deref()),
            notes: non_blank(req.notes.as_deref()),
            stage,
        },
    )
    .await?;
    let created = repo::insert_event(&mut *tx, application.id, None, stage, None).await?;
    tx.commit().await?;

    info!(
        "User {} is tracking application {} at {} ({})",
        user.id, application.id, application.company, stage
    );
    Ok((
        StatusCode::CREATED,
        Json(ApplicationDetail {
            application,
            history: vec![created],
            interviews: Vec::new(),
        }),
    ))
}

/// GET /api/v1/applications
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
    QueryParams(query): QueryParams<ApplicationListQuery>,
) -> Result<Json<Vec<ApplicationRow>>, AppError> {
    Ok(Json(
        repo::list_applications(&state.db, user.id, query.stage).await?,
    ))
}

/// GET /api/v1/applications/summary
pub async fn handle_summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<StageCounts>, AppError> {
    let rows = repo::stage_counts(&state.db, user.id).await?;
    Ok(Json(StageCounts::from_rows(
        rows.iter().map(|(stage, n)| (stage.as_str(), *n)),
    )))
}

/// GET /api/v1/applications/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(application_id): PathParam<Uuid>,
) -> Result<Json<ApplicationDetail>, AppError> {
    let application = repo::find_application(&state.db, user.id, application_id)
        .await?
        .ok_or_else(|| not_found(application_id))?;

    let history = repo::list_events(&state.db, application_id).await?;
    let interviews = interviews::repo::list_for_application(&state.db, application_id).await?;

    Ok(Json(ApplicationDetail {
        application,
        history,
        interviews,
    }))
}

/// PATCH /api/v1/applications/:id
///
/// Stage is not editable here; it only changes through `/stage`.
pub async fn handle_update(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(application_id): PathParam<Uuid>,
    JsonBody(req): JsonBody<UpdateApplicationRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    let patch = ApplicationPatch {
        company: req
            .company
            .as_deref()
            .map(|c| required(c, "company").map(str::to_string))
            .transpose()?,
        title: req
            .title
            .as_deref()
            .map(|t| required(t, "title").map(str::to_string))
            .transpose()?,
        url: req.url.map(|u| u.trim().to_string()),
        location: req.location.map(|l| l.trim().to_string()),
        notes: req.notes,
    };

    repo::update_application(&state.db, user.id, application_id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(application_id))
}

/// POST /api/v1/applications/:id/stage
pub async fn handle_change_stage(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(application_id): PathParam<Uuid>,
    JsonBody(req): JsonBody<ChangeStageRequest>,
) -> Result<Json<StageChange>, AppError> {
    let mut tx = state.db.begin().await?;
    let app = repo::lock_application(&mut *tx, user.id, application_id)
        .await?
        .ok_or_else(|| not_found(application_id))?;

    let note = non_blank(req.note.as_deref());
    let (application, event) = super::advance(&mut *tx, &app, req.stage, note).await?;
    tx.commit().await?;

    info!(
        "Application {} moved {} -> {}",
        application_id, app.stage, application.stage
    );
    Ok(Json(StageChange { application, event }))
}

/// DELETE /api/v1/applications/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(application_id): PathParam<Uuid>,
) -> Result<StatusCode, AppError> {
    if !repo::delete_application(&state.db, user.id, application_id).await? {
        return Err(not_found(application_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} must not be blank")));
    }
    Ok(trimmed)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Application {id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("  Acme ", "company").unwrap(), "Acme");
        assert!(matches!(
            required("   ", "title"),
            Err(AppError::Validation(msg)) if msg == "title must not be blank"
        ));
    }

    #[test]
    fn test_create_request_accepts_camel_case_job_id() {
        let req: CreateApplicationRequest = serde_json::from_str(
            r#"{"company":"Acme","title":"Engineer","jobId":"123","stage":"applied"}"#,
        )
        .unwrap();
        assert_eq!(req.job_id.as_deref(), Some("123"));
        assert_eq!(req.stage, Some(Stage::Applied));
    }

    #[test]
    fn test_change_stage_rejects_unknown_stage() {
        let parsed = serde_json::from_str::<ChangeStageRequest>(r#"{"stage":"ghosted"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" x ")), Some("x"));
        assert_eq!(non_blank(None), None);
    }
}
