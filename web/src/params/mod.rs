//! Typed parameters for endpoint inputs.
//!
//! Request bodies are deserialized into these structs before they reach the
//! notification layer, so malformed input is rejected by type at the edge.

pub(crate) mod notification;
