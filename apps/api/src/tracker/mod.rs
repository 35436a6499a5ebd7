//! Job application tracker: a per-user pipeline of applications, each moving
//! through [`machine::Stage`] with every move recorded as an event.

pub mod handlers;
pub mod machine;
pub mod repo;

use sqlx::PgConnection;

use crate::errors::AppError;
use crate::models::application::{ApplicationRow, StageEventRow};
use machine::Stage;

/// Current stage of a stored application.
pub fn current_stage(app: &ApplicationRow) -> Result<Stage, AppError> {
    app.stage
        .parse::<Stage>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("application {}: {e}", app.id)))
}

/// Moves a locked application to `to` and records the event.
/// Must run inside the transaction that locked the row.
pub async fn advance(
    conn: &mut PgConnection,
    app: &ApplicationRow,
    to: Stage,
    note: Option<&str>,
) -> Result<(ApplicationRow, StageEventRow), AppError> {
    let from = current_stage(app)?;
    let to = from.transition_to(to)?;

    let updated = repo::set_stage(&mut *conn, app.id, to).await?;
    let event = repo::insert_event(&mut *conn, app.id, Some(from), to, note).await?;
    Ok((updated, event))
}
