//! Per-connection sequential event-processing context.
//!
//! A session is a tokio task that owns one [`Store`], the [`Controller`]s of its
//! timed entries and the exit-grace timers of entries that are leaving. Every
//! event (push, close, timer expiry, exit acknowledgement, resync, shutdown) is
//! a [`Command`] on a single unbounded queue, so no two mutations of the store
//! ever run concurrently and no locking is needed.
//!
//! The session holds only a weak sender to its own queue, so it ends by itself
//! once every [`SessionHandle`] and pending timer is gone.

use crate::container::{Container, Rendered};
use crate::error::{Error, Result};
use crate::lifecycle::{Controller, Timer};
use crate::notification::{Key, Notification};
use crate::store::Store;
use log::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Signals a session sends towards its client.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Fresh markup of the whole container.
    Render(Rendered),
    /// Play the exit presentation of `key`, then acknowledge.
    Hide(Key),
}

/// Sink for session signals, implemented by the transport.
pub trait Outbound: Send + Sync {
    fn send(&self, signal: Signal);
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a dismissed entry waits for the client's exit acknowledgement
    /// before it is removed anyway. Zero removes it as soon as it is dismissed.
    pub exit_grace: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            exit_grace: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug)]
enum Command {
    Push(Notification, oneshot::Sender<Result<Key>>),
    Close(Key),
    Expire(Key),
    ExitComplete(Key),
    GraceElapsed(Key),
    Resync,
    Keys(oneshot::Sender<Vec<Key>>),
    Shutdown,
}

/// Cloneable handle to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: UnboundedSender<Command>,
}

impl SessionHandle {
    /// Spawns the session task. Must be called from within a tokio runtime.
    pub fn spawn(
        container: Arc<Container>,
        outbound: Arc<dyn Outbound>,
        config: SessionConfig,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session {
            store: Store::new(),
            controllers: HashMap::new(),
            leaving: HashMap::new(),
            container,
            outbound,
            config,
            tx: tx.downgrade(),
        };
        tokio::spawn(session.run(rx));
        Self { tx }
    }

    /// Pushes `notification` onto the stack and returns its key.
    ///
    /// Fails with a contract violation, and stores nothing, when the
    /// notification cannot be rendered.
    pub async fn push(&self, notification: Notification) -> Result<Key> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Push(notification, reply))?;
        response.await?
    }

    /// Explicit user close.
    pub fn close(&self, key: Key) -> Result<()> {
        self.send(Command::Close(key))
    }

    /// The client finished the exit presentation of `key`.
    pub fn exit_complete(&self, key: Key) -> Result<()> {
        self.send(Command::ExitComplete(key))
    }

    /// Re-sends the current render, e.g. to a subscriber that just (re)attached.
    pub fn resync(&self) -> Result<()> {
        self.send(Command::Resync)
    }

    /// Keys currently on the stack, in order.
    pub async fn keys(&self) -> Result<Vec<Key>> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Keys(reply))?;
        Ok(response.await?)
    }

    /// Ends the session: every entry is removed and every timer released.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&self, command: Command) -> Result<()> {
        self.tx.send(command).map_err(|_| Error::session_closed())
    }
}

struct Session {
    store: Store,
    controllers: HashMap<Key, Controller>,
    leaving: HashMap<Key, Timer>,
    container: Arc<Container>,
    outbound: Arc<dyn Outbound>,
    config: SessionConfig,
    tx: WeakUnboundedSender<Command>,
}

impl Session {
    async fn run(mut self, mut rx: UnboundedReceiver<Command>) {
        debug!("Notification session started");
        while let Some(command) = rx.recv().await {
            trace!("Applying session command {command:?}");
            match command {
                Command::Push(notification, reply) => {
                    let _ = reply.send(self.push(notification));
                }
                Command::Close(key) => self.close(key),
                Command::Expire(key) => self.expire(key),
                Command::ExitComplete(key) => self.exit_complete(&key),
                Command::GraceElapsed(key) => self.grace_elapsed(&key),
                Command::Resync => self.render(),
                Command::Keys(reply) => {
                    let _ = reply.send(self.store.keys());
                }
                Command::Shutdown => break,
            }
        }
        self.teardown();
    }

    fn push(&mut self, notification: Notification) -> Result<Key> {
        self.container.dispatcher().resolve(&notification)?;

        let tx = self.tx.upgrade().ok_or_else(Error::session_closed)?;

        let key = notification.key().clone();
        let options = notification.options().copied();
        if !self.store.push(notification) {
            return Ok(key);
        }
        if let Some(options) = options {
            let controller = Controller::mount(key.clone(), options, &tx, Command::Expire);
            self.controllers.insert(key.clone(), controller);
        }
        debug!("Pushed notification {key} ({} on stack)", self.store.len());

        self.render();
        Ok(key)
    }

    fn close(&mut self, key: Key) {
        if self.leaving.contains_key(&key) {
            trace!("Close of {key} while already leaving");
            return;
        }
        match self.controllers.get_mut(&key) {
            Some(controller) => {
                if controller.close() {
                    self.dismiss(key);
                }
            }
            None if self.store.get(&key).is_some_and(Notification::is_closable) => {
                self.dismiss(key)
            }
            None => trace!("Close of unknown notification {key}"),
        }
    }

    fn expire(&mut self, key: Key) {
        match self.controllers.get_mut(&key) {
            Some(controller) => {
                if controller.expire() {
                    debug!("Notification {key} expired");
                    self.dismiss(key);
                }
            }
            // Stale firing of a timer whose entry already left by another path.
            None => trace!("Ignoring expiry of {key}"),
        }
    }

    /// `Visible -> Dismissed`: release the timer, tell the client to play the
    /// exit presentation and wait (bounded) for its acknowledgement.
    fn dismiss(&mut self, key: Key) {
        self.controllers.remove(&key);
        self.outbound.send(Signal::Hide(key.clone()));

        match self.tx.upgrade() {
            Some(tx) if !self.config.exit_grace.is_zero() => {
                let timer =
                    Timer::schedule(self.config.exit_grace, tx, Command::GraceElapsed(key.clone()));
                self.leaving.insert(key, timer);
            }
            _ => self.remove(&key),
        }
    }

    /// Only entries this session dismissed can be acknowledged; a visible
    /// entry leaves through its timer or an allowed close.
    fn exit_complete(&mut self, key: &Key) {
        if self.leaving.remove(key).is_some() {
            self.remove(key);
        } else {
            trace!("Ignoring exit acknowledgement of {key}, not leaving");
        }
    }

    fn grace_elapsed(&mut self, key: &Key) {
        if self.leaving.remove(key).is_some() {
            warn!("No exit acknowledgement for {key} within {:?}, removing", self.config.exit_grace);
            self.remove(key);
        }
    }

    fn remove(&mut self, key: &Key) {
        self.controllers.remove(key);
        if let Some(notification) = self.store.remove(key) {
            debug!(
                "Removed notification {key} after {:?} ({} on stack)",
                notification.age(),
                self.store.len()
            );
            self.render();
        }
    }

    fn render(&self) {
        let now = Instant::now();
        let controllers = &self.controllers;
        match self
            .container
            .render(&self.store, |key| controllers.get(key)?.countdown(now))
        {
            Ok(rendered) => self.outbound.send(Signal::Render(rendered)),
            Err(e) => error!("Failed to render notification stack: {e}"),
        }
    }

    fn teardown(&mut self) {
        let removed = self.store.len();
        self.leaving.clear();
        self.controllers.clear();
        self.store.clear();
        debug!("Notification session ended, {removed} notification(s) force-removed");
    }
}
