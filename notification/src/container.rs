//! Top-level render pass over one session's store.

use crate::error::{Error, Result};
use crate::lifecycle::Countdown;
use crate::markup::{Root, CONTAINER_ID};
use crate::notification::Key;
use crate::render::{Dispatcher, RenderCapability, RenderContext};
use crate::store::Store;
use serde::Serialize;
use std::fmt::Write as _;

/// Output of one render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rendered {
    pub html: String,
    /// Keys in stack order, for client-side reconciliation.
    pub keys: Vec<Key>,
}

/// Renders the stack in insertion order followed by the disconnected slot.
#[derive(Debug)]
pub struct Container {
    dispatcher: Dispatcher,
    disconnected: RenderCapability,
}

impl Container {
    /// Fails with a configuration error when no renderer is registered for the
    /// disconnected indicator.
    pub fn new(dispatcher: Dispatcher, disconnected: RenderCapability) -> Result<Self> {
        if !dispatcher.contains(&disconnected) {
            return Err(Error::config(format!(
                "disconnected renderer {disconnected} is not registered"
            )));
        }
        Ok(Self {
            dispatcher,
            disconnected,
        })
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn disconnected(&self) -> &RenderCapability {
        &self.disconnected
    }

    /// Dispatches every stored notification once, first pushed first.
    ///
    /// `countdown` supplies the running countdown of timed entries. A stored
    /// notification without a resolvable renderer fails the whole pass.
    pub fn render<F>(&self, store: &Store, countdown: F) -> Result<Rendered>
    where
        F: Fn(&Key) -> Option<Countdown>,
    {
        let notifications = store.list();
        let mut html = format!(r#"<div id="{CONTAINER_ID}">"#);
        let mut keys = Vec::with_capacity(notifications.len());

        for notification in notifications {
            let key = notification.key();
            let running = countdown(key);
            let inner = self.dispatcher.dispatch(notification, running)?;
            Root {
                key,
                closable: notification.is_closable(),
                countdown: running,
            }
            .write(&mut html, &inner);
            keys.push(key.clone());
        }

        let disconnected_key = Key::disconnected();
        let inner = self
            .dispatcher
            .resolve_capability(&self.disconnected)?
            .render(&RenderContext {
                key: &disconnected_key,
                notification: None,
                countdown: None,
            });
        Root::write_disconnected_slot(&mut html, &inner);
        let _ = write!(html, "</div>");

        Ok(Rendered { html, keys })
    }
}
