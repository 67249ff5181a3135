use crate::{AppState, Error};
use ::sse::connection::SessionId;
use notification::{Error as NotificationError, SessionHandle};
use serde::Serialize;

pub(crate) mod health_check_controller;
pub(crate) mod notification_controller;
pub(crate) mod session_controller;

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status_code: u16, data: T) -> Self {
        Self {
            status_code,
            data: Some(data),
        }
    }

    pub fn no_content(status_code: u16) -> ApiResponse<()> {
        ApiResponse {
            status_code,
            data: None,
        }
    }
}

/// Looks up a running session, or fails with `NotFound`.
fn session_handle(app_state: &AppState, session_id: &SessionId) -> Result<SessionHandle, Error> {
    app_state
        .sse_manager
        .session(session_id)
        .ok_or_else(|| NotificationError::not_found().into())
}
