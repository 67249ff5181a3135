//! Auto-dismiss lifecycle of timed notifications.
//!
//! Each timed notification gets a [`Controller`] when it is mounted. The
//! controller is a two-state machine (`Visible -> Dismissed`) holding at most one
//! [`Timer`]. `Dismissed` is terminal: the timer is released on the transition
//! and a dismissed controller never fires again.

use crate::notification::Key;
use crate::options::Options;
use log::*;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Visible,
    Dismissed,
}

/// Snapshot of a running dismiss countdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countdown {
    pub remaining: Duration,
    /// Advances monotonically from 0 to 1 over the dismiss time.
    pub progress: f64,
}

/// A scheduled, cancellable unit of deferred work.
///
/// After `delay` the timer posts `command` into the owning session's queue, so
/// the firing is applied in order with every other event of that session.
/// Dropping the timer aborts it.
#[derive(Debug)]
pub struct Timer {
    handle: JoinHandle<()>,
}

impl Timer {
    pub fn schedule<C>(delay: Duration, tx: UnboundedSender<C>, command: C) -> Self
    where
        C: Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The session may already be gone; nothing to deliver to then.
            let _ = tx.send(command);
        });
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Dismiss state machine of one timed notification.
#[derive(Debug)]
pub struct Controller {
    key: Key,
    options: Options,
    mounted_at: Instant,
    state: State,
    timer: Option<Timer>,
}

impl Controller {
    /// Mounts a controller in the `Visible` state with progress 0.
    ///
    /// When the notification is dismissible a timer is scheduled that posts
    /// `expire(key)` to `tx` after the dismiss time.
    pub fn mount<C, F>(key: Key, options: Options, tx: &UnboundedSender<C>, expire: F) -> Self
    where
        C: Send + 'static,
        F: FnOnce(Key) -> C,
    {
        let timer = options
            .countdown()
            .map(|delay| Timer::schedule(delay, tx.clone(), expire(key.clone())));

        if options.is_dead_end() {
            warn!("Notification {key} is neither closable nor dismissible and stays until its session ends");
        }

        Self {
            key,
            options,
            mounted_at: Instant::now(),
            state: State::Visible,
            timer,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn has_pending_timer(&self) -> bool {
        self.timer.as_ref().is_some_and(|timer| !timer.is_finished())
    }

    /// Progress in `[0, 1]` at `now`. Stays 0 for notifications without a
    /// countdown and is 1 once dismissed.
    pub fn progress(&self, now: Instant) -> f64 {
        match self.state {
            State::Dismissed => 1.0,
            State::Visible => self.countdown(now).map_or(0.0, |c| c.progress),
        }
    }

    /// The running countdown at `now`, if any.
    ///
    /// Re-renders after a reconnect carry the true remaining time instead of
    /// restarting the full dismiss time.
    pub fn countdown(&self, now: Instant) -> Option<Countdown> {
        if self.state != State::Visible {
            return None;
        }
        let total = self.options.countdown()?;
        let elapsed = now.saturating_duration_since(self.mounted_at);
        let progress = if total.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / total.as_secs_f64()).min(1.0)
        };
        Some(Countdown {
            remaining: total.saturating_sub(elapsed),
            progress,
        })
    }

    /// Explicit close. Cancels the countdown.
    ///
    /// Returns `true` only on the `Visible -> Dismissed` transition; closing a
    /// non-closable or already dismissed notification does nothing.
    pub fn close(&mut self) -> bool {
        if !self.options.closable() {
            debug!("Ignoring close of non-closable notification {}", self.key);
            return false;
        }
        self.dismiss()
    }

    /// Timer expiry. Returns `true` only on the `Visible -> Dismissed` transition.
    pub fn expire(&mut self) -> bool {
        if !self.options.dismissible() {
            return false;
        }
        self.dismiss()
    }

    fn dismiss(&mut self) -> bool {
        if self.state == State::Dismissed {
            return false;
        }
        self.state = State::Dismissed;
        self.timer = None;
        true
    }
}
