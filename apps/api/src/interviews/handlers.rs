//! Axum route handlers for interviews.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::interviews::repo::{self, InterviewPatch, NewInterview};
use crate::interviews::{InterviewKind, Outcome};
use crate::models::application::{ApplicationRow, InterviewRow};
use crate::state::AppState;
use crate::tracker::machine::Stage;
use crate::tracker::{self, current_stage};

const SCHEDULED_NOTE: &str = "interview scheduled";

#[derive(Debug, Deserialize)]
pub struct CreateInterviewRequest {
    #[serde(alias = "scheduledAt")]
    pub scheduled_at: String,
    pub kind: InterviewKind,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateInterviewRequest {
    #[serde(default, alias = "scheduledAt")]
    pub scheduled_at: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InterviewListQuery {
    #[serde(default)]
    pub upcoming: bool,
}

#[derive(Debug, Serialize)]
pub struct ScheduledInterview {
    pub interview: InterviewRow,
    pub application: ApplicationRow,
}

/// POST /api/v1/applications/:id/interviews
///
/// Scheduling the first interview on an `applied` application moves it to
/// `interview` in the same transaction.
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(application_id): PathParam<Uuid>,
    JsonBody(req): JsonBody<CreateInterviewRequest>,
) -> Result<(StatusCode, Json<ScheduledInterview>), AppError> {
    let scheduled_at = parse_scheduled_at(&req.scheduled_at)?;

    let mut tx = state.db.begin().await?;
    let app = tracker::repo::lock_application(&mut *tx, user.id, application_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))?;

    let application = match stage_after_scheduling(current_stage(&app)?)? {
        Some(next) => tracker::advance(&mut *tx, &app, next, Some(SCHEDULED_NOTE)).await?.0,
        None => app,
    };

    let interview = repo::insert_interview(
        &mut *tx,
        NewInterview {
            id: Uuid::new_v4(),
            application_id,
            user_id: user.id,
            scheduled_at,
            kind: req.kind,
            location: non_blank(req.location.as_deref()),
            notes: non_blank(req.notes.as_deref()),
        },
    )
    .await?;
    tx.commit().await?;

    info!(
        "User {} scheduled {} interview {} for application {}",
        user.id,
        req.kind.as_str(),
        interview.id,
        application_id
    );
    Ok((
        StatusCode::CREATED,
        Json(ScheduledInterview {
            interview,
            application,
        }),
    ))
}

/// GET /api/v1/interviews
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
    QueryParams(query): QueryParams<InterviewListQuery>,
) -> Result<Json<Vec<InterviewRow>>, AppError> {
    let after = query.upcoming.then(Utc::now);
    Ok(Json(repo::list_interviews(&state.db, user.id, after).await?))
}

/// PATCH /api/v1/interviews/:id
pub async fn handle_update(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(interview_id): PathParam<Uuid>,
    JsonBody(req): JsonBody<UpdateInterviewRequest>,
) -> Result<Json<InterviewRow>, AppError> {
    let patch = InterviewPatch {
        scheduled_at: req
            .scheduled_at
            .as_deref()
            .map(parse_scheduled_at)
            .transpose()?,
        notes: req.notes,
        outcome: req.outcome,
    };

    repo::update_interview(&state.db, user.id, interview_id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Interview {interview_id} not found")))
}

/// DELETE /api/v1/interviews/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(interview_id): PathParam<Uuid>,
) -> Result<StatusCode, AppError> {
    if !repo::delete_interview(&state.db, user.id, interview_id).await? {
        return Err(AppError::NotFound(format!(
            "Interview {interview_id} not found"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Stage the application should move to when an interview is booked, if any.
fn stage_after_scheduling(stage: Stage) -> Result<Option<Stage>, AppError> {
    match stage {
        Stage::Applied => Ok(Some(Stage::Interview)),
        Stage::Interview => Ok(None),
        Stage::Saved => Err(AppError::UnprocessableEntity(
            "Mark the application as applied before scheduling interviews".to_string(),
        )),
        terminal => Err(AppError::UnprocessableEntity(format!(
            "Application is already {terminal}"
        ))),
    }
}

fn parse_scheduled_at(raw: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            AppError::Validation(format!("scheduled_at must be an RFC 3339 timestamp, got '{raw}'"))
        })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applied_advances_to_interview() {
        assert_eq!(
            stage_after_scheduling(Stage::Applied).unwrap(),
            Some(Stage::Interview)
        );
    }

    #[test]
    fn test_further_rounds_keep_stage() {
        assert_eq!(stage_after_scheduling(Stage::Interview).unwrap(), None);
    }

    #[test]
    fn test_saved_and_terminal_rejected() {
        for stage in [Stage::Saved, Stage::Offer, Stage::Rejected] {
            assert!(matches!(
                stage_after_scheduling(stage),
                Err(AppError::UnprocessableEntity(_))
            ));
        }
    }

    #[test]
    fn test_parse_scheduled_at_normalizes_offset() {
        let at = parse_scheduled_at("2026-03-02T09:30:00+02:00").unwrap();
        assert_eq!(at.to_rfc3339(), "2026-03-02T07:30:00+00:00");
    }

    #[test]
    fn test_parse_scheduled_at_rejects_garbage() {
        assert!(matches!(
            parse_scheduled_at("next tuesday"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_upcoming_defaults_off() {
        let query: InterviewListQuery = serde_json::from_str("{}").unwrap();
        assert!(!query.upcoming);
    }
}
