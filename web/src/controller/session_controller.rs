use crate::controller::ApiResponse;
use crate::{AppState, Error};
use ::sse::connection::SessionId;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use notification::Error as NotificationError;
use serde::Serialize;
use utoipa::ToSchema;

use log::*;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct SessionCreated {
    pub(crate) session_id: String,
}

/// POST create a new notification session
#[utoipa::path(
    post,
    path = "/sessions",
    responses(
        (status = 201, description = "Successfully created a new notification session", body = SessionCreated),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn create(State(app_state): State<AppState>) -> impl IntoResponse {
    let session_id = app_state.sse_manager.create_session();
    debug!("New notification session: {session_id}");

    (
        StatusCode::CREATED,
        Json(ApiResponse::new(
            StatusCode::CREATED.into(),
            SessionCreated {
                session_id: session_id.to_string(),
            },
        )),
    )
}

/// DELETE a notification session, force-removing all its notifications
#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    params(
        ("id" = String, Path, description = "Id of the session to end"),
    ),
    responses(
        (status = 204, description = "Successfully ended the session"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn delete(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE notification session {id}");

    if !app_state.sse_manager.end_session(&SessionId::from(id)) {
        return Err(NotificationError::not_found().into());
    }
    Ok(StatusCode::NO_CONTENT)
}
