use crate::{AppState, Error};
use ::sse::connection::{ConnectionId, SessionId};
use ::sse::Manager;
use async_stream::stream;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use log::*;
use notification::Error as NotificationError;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Unregisters its connection when the response stream is dropped, which also
/// covers clients that go away without the server noticing first.
struct ConnectionGuard {
    manager: Arc<Manager>,
    connection_id: ConnectionId,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.manager.unregister_connection(&self.connection_id);
    }
}

/// SSE handler that subscribes to one notification session.
///
/// The current stack is re-rendered to the new subscriber right away, so a
/// reconnecting client resynchronises without replaying missed events.
pub(crate) async fn sse_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, Error> {
    let session_id = SessionId::from(id);
    debug!("Establishing SSE connection for session {session_id}");

    let (tx, mut rx) = mpsc::unbounded_channel();

    let connection_id = app_state
        .sse_manager
        .register_connection(&session_id, tx)
        .ok_or_else(NotificationError::not_found)?;

    let guard = ConnectionGuard {
        manager: app_state.sse_manager.clone(),
        connection_id,
    };

    // Events arrive from the registry through the channel
    let stream = stream! {
        let _guard = guard;
        while let Some(event) = rx.recv().await {
            yield event;
        }
        debug!("SSE connection closed for session {session_id}");
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(app_state.config.keep_alive())))
}
