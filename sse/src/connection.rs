use axum::response::sse::Event;
use dashmap::DashMap;
use log::*;
use notification::SessionHandle;
use std::collections::HashSet;
use std::convert::Infallible;
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

/// Unique identifier of a notification session (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

pub type EventSender = UnboundedSender<Result<Event, Infallible>>;

#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub session_id: SessionId,
    pub sender: EventSender,
}

struct SessionEntry {
    handle: SessionHandle,
    connections: HashSet<ConnectionId>,
    /// Bumped on every attach so a stale linger timer can tell that the session
    /// was in use since it was scheduled.
    epoch: u64,
}

/// Result of detaching a connection from its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detached {
    pub session_id: SessionId,
    pub remaining: usize,
    pub epoch: u64,
}

/// Connection registry with dual indices for O(1) lookups.
///
/// Lock order is `sessions` before `connections`; no method holds a
/// `connections` guard while acquiring a `sessions` guard.
pub struct ConnectionRegistry {
    /// Lookup by connection_id for registration/cleanup
    connections: DashMap<ConnectionId, ConnectionInfo>,

    /// Sessions and the set of their subscriber connections, used for routing
    sessions: DashMap<SessionId, SessionEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            sessions: DashMap::new(),
        }
    }

    pub fn insert_session(&self, session_id: SessionId, handle: SessionHandle) {
        self.sessions.insert(
            session_id,
            SessionEntry {
                handle,
                connections: HashSet::new(),
                epoch: 0,
            },
        );
    }

    pub fn session(&self, session_id: &SessionId) -> Option<SessionHandle> {
        self.sessions
            .get(session_id)
            .map(|entry| entry.handle.clone())
    }

    /// Removes a session and drops the senders of all its connections, which
    /// ends their streams.
    pub fn remove_session(&self, session_id: &SessionId) -> Option<SessionHandle> {
        let (_, entry) = self.sessions.remove(session_id)?;
        for connection_id in &entry.connections {
            self.connections.remove(connection_id);
        }
        Some(entry.handle)
    }

    /// Removes a session only if it has had no subscriber since `epoch`.
    pub fn end_if_idle(&self, session_id: &SessionId, epoch: u64) -> Option<SessionHandle> {
        self.sessions
            .remove_if(session_id, |_, entry| {
                entry.connections.is_empty() && entry.epoch == epoch
            })
            .map(|(_, entry)| entry.handle)
    }

    /// Attaches a new connection to an existing session.
    ///
    /// Returns `None` when the session is unknown.
    pub fn register(&self, session_id: &SessionId, sender: EventSender) -> Option<ConnectionId> {
        let mut entry = self.sessions.get_mut(session_id)?;
        let connection_id = ConnectionId::new();

        entry.connections.insert(connection_id.clone());
        entry.epoch += 1;
        self.connections.insert(
            connection_id.clone(),
            ConnectionInfo {
                session_id: session_id.clone(),
                sender,
            },
        );

        Some(connection_id)
    }

    /// Detaches a connection.
    ///
    /// Returns `None` when the connection is unknown or its session is gone.
    pub fn unregister(&self, connection_id: &ConnectionId) -> Option<Detached> {
        let (_, info) = self.connections.remove(connection_id)?;
        let mut entry = self.sessions.get_mut(&info.session_id)?;
        entry.connections.remove(connection_id);

        Some(Detached {
            session_id: info.session_id,
            remaining: entry.connections.len(),
            epoch: entry.epoch,
        })
    }

    /// Send an event to every subscriber of a session.
    /// O(1) lookup + O(k) send where k = session's connections.
    pub fn send_to_session(&self, session_id: &SessionId, event: Event) {
        let Some(entry) = self.sessions.get(session_id) else {
            trace!("Dropping event for ended session {session_id}");
            return;
        };
        if entry.connections.is_empty() {
            trace!("No subscriber for session {session_id}, event dropped");
        }
        for conn_id in entry.connections.iter() {
            if let Some(info) = self.connections.get(conn_id) {
                if let Err(e) = info.sender.send(Ok(event.clone())) {
                    warn!(
                        "Failed to send event to connection {}: {}. Connection will be cleaned up.",
                        conn_id.as_str(),
                        e
                    );
                }
            }
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notification::{renderers, Container, Dispatcher, Outbound, SessionConfig, Signal};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    struct Discard;

    impl Outbound for Discard {
        fn send(&self, _signal: Signal) {}
    }

    fn handle() -> SessionHandle {
        let mut dispatcher = Dispatcher::new();
        renderers::register_defaults(&mut dispatcher);
        let container = Container::new(dispatcher, renderers::DISCONNECTED).unwrap();
        SessionHandle::spawn(
            Arc::new(container),
            Arc::new(Discard),
            SessionConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_register_requires_known_session() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        assert!(registry.register(&SessionId::new(), tx).is_none());
        assert_eq!(registry.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_send_to_session_reaches_only_its_subscribers() {
        let registry = ConnectionRegistry::new();
        let (a, b) = (SessionId::new(), SessionId::new());
        registry.insert_session(a.clone(), handle());
        registry.insert_session(b.clone(), handle());

        let (tx_a1, mut rx_a1) = mpsc::unbounded_channel();
        let (tx_a2, mut rx_a2) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        registry.register(&a, tx_a1).unwrap();
        registry.register(&a, tx_a2).unwrap();
        registry.register(&b, tx_b).unwrap();

        registry.send_to_session(&a, Event::default().event("hide").data("{}"));

        assert!(rx_a1.try_recv().is_ok());
        assert!(rx_a2.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unregister_reports_remaining_subscribers() {
        let registry = ConnectionRegistry::new();
        let session_id = SessionId::new();
        registry.insert_session(session_id.clone(), handle());

        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let first = registry.register(&session_id, tx1).unwrap();
        let second = registry.register(&session_id, tx2).unwrap();

        let detached = registry.unregister(&first).unwrap();
        assert_eq!(detached.remaining, 1);
        assert_eq!(detached.epoch, 2);

        let detached = registry.unregister(&second).unwrap();
        assert_eq!(detached.session_id, session_id);
        assert_eq!(detached.remaining, 0);
        assert_eq!(registry.connection_count(), 0);

        assert!(registry.unregister(&second).is_none());
    }

    #[tokio::test]
    async fn test_end_if_idle_respects_epoch_and_subscribers() {
        let registry = ConnectionRegistry::new();
        let session_id = SessionId::new();
        registry.insert_session(session_id.clone(), handle());

        let (tx, _rx) = mpsc::unbounded_channel();
        let connection = registry.register(&session_id, tx).unwrap();
        assert!(registry.end_if_idle(&session_id, 1).is_none(), "still subscribed");

        let detached = registry.unregister(&connection).unwrap();
        assert!(registry.end_if_idle(&session_id, 0).is_none(), "stale epoch");
        assert!(registry.end_if_idle(&session_id, detached.epoch).is_some());
        assert_eq!(registry.session_count(), 0);
    }

    #[tokio::test]
    async fn test_remove_session_cleans_up_connections() {
        let registry = ConnectionRegistry::new();
        let session_id = SessionId::new();
        registry.insert_session(session_id.clone(), handle());
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register(&session_id, tx).unwrap();

        assert!(registry.remove_session(&session_id).is_some());
        assert_eq!(registry.connection_count(), 0);
        assert!(registry.session(&session_id).is_none());
        assert!(rx.recv().await.is_none(), "stream ends once its sender is dropped");
    }
}
