//! Client-side reconciliation of presentations, removals and connectivity.
//!
//! [`ClientBridge`] is a pure state machine: it consumes [`Input`]s from the
//! transport and the presentation layer and returns the [`Effect`]s to carry
//! out. It never performs I/O and never touches a clock, so the exit
//! presentation, the server round-trips and the disconnected indicator are all
//! driven from the outside.

use log::*;
use notification::Key;
use std::collections::HashSet;

/// Visibility of the client-local disconnected indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPhase {
    Hidden,
    Shown,
    /// Exit presentation running after the connection came back.
    Exiting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A render arrived carrying these keys, in stack order.
    Rendered(Vec<Key>),
    /// The server dismissed `key`.
    Hide(Key),
    /// The exit presentation of `key` completed.
    ExitFinished(Key),
    /// The user pressed the close control of `key`.
    UserClose(Key),
    TransportLost,
    TransportRestored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    PlayEnter(Key),
    PlayExit(Key),
    /// Drop the element without any presentation.
    RemoveElement(Key),
    /// Ask the server to close `key`; it answers with a hide.
    RequestClose(Key),
    /// Acknowledge a finished exit so the server drops `key` from its store.
    RequestRemove(Key),
}

#[derive(Debug)]
pub struct ClientBridge {
    /// Elements currently on screen, in stack order.
    mounted: Vec<Key>,
    exiting: HashSet<Key>,
    disconnected: SlotPhase,
    disconnected_key: Key,
}

impl Default for ClientBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBridge {
    pub fn new() -> Self {
        Self {
            mounted: Vec::new(),
            exiting: HashSet::new(),
            disconnected: SlotPhase::Hidden,
            disconnected_key: Key::disconnected(),
        }
    }

    pub fn mounted(&self) -> &[Key] {
        &self.mounted
    }

    pub fn is_exiting(&self, key: &Key) -> bool {
        self.exiting.contains(key)
    }

    pub fn disconnected_phase(&self) -> SlotPhase {
        self.disconnected
    }

    pub fn handle(&mut self, input: Input) -> Vec<Effect> {
        trace!("Client bridge input {input:?}");
        match input {
            Input::Rendered(keys) => self.rendered(keys),
            Input::Hide(key) => self.hide(key),
            Input::ExitFinished(key) => self.exit_finished(key),
            Input::UserClose(key) => self.user_close(key),
            Input::TransportLost => self.transport_lost(),
            Input::TransportRestored => self.transport_restored(),
        }
    }

    fn rendered(&mut self, keys: Vec<Key>) -> Vec<Effect> {
        let mut effects = Vec::new();
        let incoming: HashSet<&Key> = keys.iter().collect();

        // Gone from the server without an exit of ours: forced removal.
        for key in &self.mounted {
            if !incoming.contains(key) && !self.exiting.contains(key) {
                effects.push(Effect::RemoveElement(key.clone()));
            }
        }

        // Exiting elements finish their presentation even when the server
        // already dropped them.
        let mut mounted: Vec<Key> = Vec::with_capacity(keys.len());
        for key in keys {
            if !self.mounted.contains(&key) {
                effects.push(Effect::PlayEnter(key.clone()));
            }
            mounted.push(key);
        }
        for key in &self.mounted {
            if self.exiting.contains(key) && !mounted.contains(key) {
                mounted.push(key.clone());
            }
        }
        self.mounted = mounted;

        effects
    }

    fn hide(&mut self, key: Key) -> Vec<Effect> {
        if self.exiting.contains(&key) {
            return Vec::new();
        }
        if !self.mounted.contains(&key) {
            // Nothing on screen to animate; acknowledge right away.
            return vec![Effect::RequestRemove(key)];
        }
        self.exiting.insert(key.clone());
        vec![Effect::PlayExit(key)]
    }

    fn exit_finished(&mut self, key: Key) -> Vec<Effect> {
        if key == self.disconnected_key {
            if self.disconnected == SlotPhase::Exiting {
                self.disconnected = SlotPhase::Hidden;
            }
            return Vec::new();
        }
        if !self.exiting.remove(&key) {
            return Vec::new();
        }
        self.mounted.retain(|mounted| mounted != &key);
        vec![Effect::RemoveElement(key.clone()), Effect::RequestRemove(key)]
    }

    fn user_close(&mut self, key: Key) -> Vec<Effect> {
        if self.mounted.contains(&key) && !self.exiting.contains(&key) {
            vec![Effect::RequestClose(key)]
        } else {
            Vec::new()
        }
    }

    fn transport_lost(&mut self) -> Vec<Effect> {
        match self.disconnected {
            SlotPhase::Shown => Vec::new(),
            SlotPhase::Hidden | SlotPhase::Exiting => {
                self.disconnected = SlotPhase::Shown;
                vec![Effect::PlayEnter(self.disconnected_key.clone())]
            }
        }
    }

    fn transport_restored(&mut self) -> Vec<Effect> {
        if self.disconnected != SlotPhase::Shown {
            return Vec::new();
        }
        self.disconnected = SlotPhase::Exiting;
        vec![Effect::PlayExit(self.disconnected_key.clone())]
    }
}
