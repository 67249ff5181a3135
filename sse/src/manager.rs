use crate::connection::{ConnectionId, ConnectionRegistry, EventSender, SessionId};
use crate::outbound::SseOutbound;
use log::*;
use notification::{Container, SessionConfig, SessionHandle};
use std::sync::Arc;
use std::time::Duration;

pub struct Manager {
    registry: Arc<ConnectionRegistry>,
    container: Arc<Container>,
    session_config: SessionConfig,
    linger: Duration,
}

impl Manager {
    pub fn new(container: Arc<Container>, session_config: SessionConfig, linger: Duration) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
            container,
            session_config,
            linger,
        }
    }

    /// Starts a new notification session. It ends by itself if nobody
    /// subscribes within the linger period.
    pub fn create_session(&self) -> SessionId {
        let session_id = SessionId::new();
        let outbound = SseOutbound::new(session_id.clone(), self.registry.clone());
        let handle = SessionHandle::spawn(
            self.container.clone(),
            Arc::new(outbound),
            self.session_config.clone(),
        );
        self.registry.insert_session(session_id.clone(), handle);
        info!("Created notification session {session_id}");

        self.schedule_linger(session_id.clone(), 0);
        session_id
    }

    pub fn session(&self, session_id: &SessionId) -> Option<SessionHandle> {
        self.registry.session(session_id)
    }

    /// Ends a session and closes all its SSE connections.
    pub fn end_session(&self, session_id: &SessionId) -> bool {
        match self.registry.remove_session(session_id) {
            Some(handle) => {
                handle.shutdown();
                info!("Ended notification session {session_id}");
                true
            }
            None => false,
        }
    }

    /// Register a new connection and re-render the session to it.
    ///
    /// Returns `None` when the session is unknown.
    pub fn register_connection(
        &self,
        session_id: &SessionId,
        sender: EventSender,
    ) -> Option<ConnectionId> {
        let connection_id = self.registry.register(session_id, sender)?;
        info!(
            "Registered SSE connection {} for session {session_id}",
            connection_id.as_str()
        );

        if let Some(handle) = self.registry.session(session_id) {
            if let Err(e) = handle.resync() {
                warn!("Failed to resync session {session_id}: {e}");
            }
        }
        Some(connection_id)
    }

    /// Unregister a connection by ID; starts the linger timer when it was the
    /// last subscriber of its session.
    pub fn unregister_connection(&self, connection_id: &ConnectionId) {
        info!("Unregistering SSE connection {}", connection_id.as_str());
        if let Some(detached) = self.registry.unregister(connection_id) {
            if detached.remaining == 0 {
                self.schedule_linger(detached.session_id, detached.epoch);
            }
        }
    }

    pub fn session_count(&self) -> usize {
        self.registry.session_count()
    }

    pub fn connection_count(&self) -> usize {
        self.registry.connection_count()
    }

    fn schedule_linger(&self, session_id: SessionId, epoch: u64) {
        let registry = self.registry.clone();
        let linger = self.linger;
        debug!("Session {session_id} has no subscriber, ending it in {linger:?} unless one attaches");

        tokio::spawn(async move {
            tokio::time::sleep(linger).await;
            if let Some(handle) = registry.end_if_idle(&session_id, epoch) {
                handle.shutdown();
                info!("Ended idle notification session {session_id}");
            }
        });
    }
}
