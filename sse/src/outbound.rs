use crate::connection::{ConnectionRegistry, SessionId};
use crate::message::{Event, EventType};
use log::*;
use notification::{Outbound, Signal};
use std::sync::Arc;

/// Routes the signals of one session to that session's SSE subscribers.
pub struct SseOutbound {
    session_id: SessionId,
    registry: Arc<ConnectionRegistry>,
}

impl SseOutbound {
    pub fn new(session_id: SessionId, registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            session_id,
            registry,
        }
    }
}

impl Outbound for SseOutbound {
    fn send(&self, signal: Signal) {
        let event = Event::from(signal);
        match event.to_sse() {
            Ok(sse_event) => {
                trace!(
                    "Sending {} event to session {}",
                    event.event_type(),
                    self.session_id
                );
                self.registry.send_to_session(&self.session_id, sse_event);
            }
            Err(e) => error!("Failed to serialize SSE event: {e}"),
        }
    }
}
