//! Stacked, extensible flash notifications for server-rendered UIs.
//!
//! This crate holds the notification lifecycle and dispatch core. It knows
//! nothing about HTTP or SSE: the transport plugs in through the
//! [`session::Outbound`] trait and receives rendered markup and hide signals.
//!
//! # Architecture
//!
//! - **Notification**: immutable value with a unique [`Key`], a free-form JSON
//!   payload, optional [`Options`] and a [`RenderCapability`].
//! - **Dispatcher**: explicit registry from `(target, function)` pairs to
//!   [`Renderer`]s. New notification types are added by registering a renderer,
//!   never by touching this crate.
//! - **Store**: insertion-ordered keyed collection, one per session.
//! - **Controller**: per-notification `Visible -> Dismissed` state machine with
//!   a cancellable dismiss timer and a progress value in `[0, 1]`.
//! - **Container**: renders the store in order plus the disconnected slot.
//! - **Session**: single-writer task that owns one store and its controllers
//!   and applies every mutation in arrival order.
//!
//! # Message Flow
//!
//! 1. Application code builds a [`Notification`] and calls [`SessionHandle::push`]
//! 2. The session resolves its renderer (contract violations are returned here)
//! 3. The notification is appended to the store and a controller is mounted
//! 4. The container re-renders and the markup goes out through the `Outbound`
//! 5. On timer expiry or explicit close a `Hide` signal goes out
//! 6. The client plays its exit presentation and acknowledges, and only then is
//!    the key removed from the store
//!
//! # Example
//!
//! ```rust,ignore
//! use notification::{Notification, Options};
//! use std::time::Duration;
//!
//! let key = session
//!     .push(Notification::info("Saved").with_options(
//!         Options::default().with_dismiss_time(Duration::from_secs(2)),
//!     ))
//!     .await?;
//! ```

pub mod container;
pub mod error;
pub mod lifecycle;
pub mod markup;
pub mod notification;
pub mod options;
pub mod render;
pub mod renderers;
pub mod session;
pub mod store;

pub use container::{Container, Rendered};
pub use error::{Error, ErrorKind, Result};
pub use lifecycle::{Controller, Countdown, State, Timer};
pub use notification::{FlashKind, Key, Notification, Variant, DISCONNECTED_KEY};
pub use options::Options;
pub use render::{Dispatcher, RenderCapability, RenderContext, Renderer};
pub use session::{Outbound, SessionConfig, SessionHandle, Signal};
pub use store::Store;
