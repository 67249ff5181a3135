use crate::controller::{session_handle, ApiResponse};
use crate::params::notification::PushParams;
use crate::{AppState, Error};
use ::sse::connection::SessionId;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use notification::{Key, Notification};
use serde::Serialize;
use utoipa::ToSchema;

use log::*;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct Pushed {
    pub(crate) key: String,
}

/// POST push a notification onto a session's stack
#[utoipa::path(
    post,
    path = "/sessions/{id}/notifications",
    params(
        ("id" = String, Path, description = "Id of the session to push to"),
    ),
    request_body = PushParams,
    responses(
        (status = 201, description = "Successfully pushed the notification", body = Pushed),
        (status = 404, description = "Session not found"),
        (status = 410, description = "Session closed"),
        (status = 422, description = "No renderer for the notification's render capability")
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(params): Json<PushParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST push notification to session {id}: {params:?}");

    let session = session_handle(&app_state, &SessionId::from(id))?;
    let key = session.push(Notification::from(params)).await?;

    debug!("Pushed notification {key}");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            StatusCode::CREATED.into(),
            Pushed {
                key: key.to_string(),
            },
        )),
    ))
}

/// GET the keys on a session's stack, in display order
#[utoipa::path(
    get,
    path = "/sessions/{id}/notifications",
    params(
        ("id" = String, Path, description = "Id of the session"),
    ),
    responses(
        (status = 200, description = "Successfully retrieved the stack", body = [String]),
        (status = 404, description = "Session not found")
    )
)]
pub async fn index(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let session = session_handle(&app_state, &SessionId::from(id))?;
    let keys = session.keys().await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), keys)))
}

/// POST an explicit user close of a notification
#[utoipa::path(
    post,
    path = "/sessions/{id}/notifications/{key}/close",
    params(
        ("id" = String, Path, description = "Id of the session"),
        ("key" = String, Path, description = "Key of the notification to close"),
    ),
    responses(
        (status = 204, description = "Close accepted; closing an absent or non-closable notification is a no-op"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn close(
    State(app_state): State<AppState>,
    Path((id, key)): Path<(String, String)>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST close notification {key} in session {id}");

    session_handle(&app_state, &SessionId::from(id))?.close(Key::from(key))?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST the client's acknowledgement that the exit presentation finished
#[utoipa::path(
    post,
    path = "/sessions/{id}/notifications/{key}/remove",
    params(
        ("id" = String, Path, description = "Id of the session"),
        ("key" = String, Path, description = "Key of the notification whose exit finished"),
    ),
    responses(
        (status = 204, description = "Acknowledgement accepted; a dismissed notification leaves the stack, any other key is ignored"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn remove(
    State(app_state): State<AppState>,
    Path((id, key)): Path<(String, String)>,
) -> Result<impl IntoResponse, Error> {
    trace!("POST exit complete for notification {key} in session {id}");

    session_handle(&app_state, &SessionId::from(id))?.exit_complete(Key::from(key))?;
    Ok(StatusCode::NO_CONTENT)
}
