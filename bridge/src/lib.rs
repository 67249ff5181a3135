//! Client side of a notification session.
//!
//! [`client_bridge::ClientBridge`] reconciles what the server renders with the
//! presentations the client plays: entrance on mount, exit before removal,
//! explicit close requests and the local disconnected indicator. The other
//! modules wire it to a live session over SSE and HTTP, with the terminal
//! standing in for the DOM.

pub mod api_client;
pub mod client_bridge;
pub mod presenter;
pub mod runner;
pub mod sse_client;
