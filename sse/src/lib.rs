//! Server-Sent Events transport for notification sessions.
//!
//! Every notification session is reachable under a server-generated
//! [`SessionId`](connection::SessionId). Clients subscribe to a session with a
//! long-lived SSE connection and receive its signals as [`message::Event`]s.
//!
//! # Architecture
//!
//! - **Dual-index registry**: sessions by `SessionId` and subscriber
//!   connections by `ConnectionId`, both in DashMaps, so routing a signal and
//!   cleaning up a dropped connection are both O(1) lookups.
//! - **Resync on attach**: a connection that (re)attaches to a session receives
//!   the current render right away. Signals sent while nobody is subscribed are
//!   lost; the next attach recovers the stack, and the exit grace of the
//!   session removes entries whose hide was never acknowledged.
//! - **Linger**: a session without subscribers is ended after the configured
//!   linger period unless a connection attaches in the meantime.
//!
//! # Message Flow
//!
//! 1. `POST /sessions` creates a session through [`Manager::create_session`]
//! 2. The client opens `GET /sessions/{id}/stream`; the connection is registered
//!    and the session re-renders
//! 3. Session signals pass through [`outbound::SseOutbound`], are encoded as
//!    `render`/`hide` events and sent to every subscriber of that session
//! 4. When the last subscriber leaves, the linger timer starts
//!
//! # Modules
//!
//! - `connection`: ConnectionRegistry with dual-index architecture
//! - `manager`: session lifecycle on top of the registry
//! - `message`: wire events
//! - `outbound`: the session-facing signal sink

pub mod connection;
pub mod manager;
pub mod message;
pub mod outbound;

pub use manager::Manager;
