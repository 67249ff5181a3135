//! SSE HTTP handler for the web layer.
//!
//! This module contains only the Axum handler for the session stream.
//! The transport itself (Manager, ConnectionRegistry, wire events) lives in
//! the `sse` crate.

pub mod handler;
