//! Core notification data structures.

use crate::error::Result;
use crate::options::Options;
use crate::render::RenderCapability;
use crate::renderers;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Well-known key of the client-local disconnected indicator.
/// Never issued by [`Key::new`] and never present in a store.
pub const DISCONNECTED_KEY: &str = "flash-disconnected";

/// Unique identifier of a notification, stable for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    /// Creates a new unique key.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The reserved key of the disconnected indicator.
    pub fn disconnected() -> Self {
        Self(DISCONNECTED_KEY.to_string())
    }

    pub fn is_disconnected(&self) -> bool {
        self.0 == DISCONNECTED_KEY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Key {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A notification type with a statically declared render capability.
///
/// This is the extension point for notification types defined outside this
/// crate: implement it, register a renderer for `(TARGET, FUNCTION)` at
/// startup and build values with [`Notification::from_variant`].
pub trait Variant: Serialize {
    const TARGET: &'static str;
    const FUNCTION: &'static str;

    /// Options for timed variants. Untimed variants keep the default `None`.
    fn options(&self) -> Option<Options> {
        None
    }
}

/// Flavour of the built-in flash notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    #[default]
    Info,
    Error,
}

/// One message instance. Never mutated once pushed into a store.
#[derive(Debug, Clone)]
pub struct Notification {
    key: Key,
    payload: Value,
    options: Option<Options>,
    capability: Option<RenderCapability>,
    created_at: Instant,
}

impl Notification {
    /// Creates a notification rendered by the renderer registered for `capability`.
    pub fn with_capability(
        capability: RenderCapability,
        payload: Value,
        options: Option<Options>,
    ) -> Self {
        Self {
            key: Key::new(),
            payload,
            options,
            capability: Some(capability),
            created_at: Instant::now(),
        }
    }

    /// Creates a notification that declares no render capability.
    ///
    /// Pushing it fails with a contract violation. This exists for values that
    /// arrive untyped (e.g. deserialized requests) so the failure is reported
    /// where it happens instead of being impossible to express.
    pub fn untyped(payload: Value, options: Option<Options>) -> Self {
        Self {
            key: Key::new(),
            payload,
            options,
            capability: None,
            created_at: Instant::now(),
        }
    }

    /// Creates a notification from a typed extension variant.
    pub fn from_variant<V: Variant>(variant: &V) -> Result<Self> {
        Ok(Self::with_capability(
            RenderCapability::from_static(V::TARGET, V::FUNCTION),
            serde_json::to_value(variant)?,
            variant.options(),
        ))
    }

    /// Creates a built-in timed flash notification with default options.
    pub fn flash(kind: FlashKind, message: impl Into<String>) -> Self {
        Self::with_capability(
            renderers::FLASH,
            json!({ "kind": kind, "message": message.into() }),
            Some(Options::default()),
        )
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::flash(FlashKind::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::flash(FlashKind::Error, message)
    }

    /// Replaces the options. Builder-style, meant to be used before the push.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Present only for timed notifications.
    pub fn options(&self) -> Option<&Options> {
        self.options.as_ref()
    }

    pub fn capability(&self) -> Option<&RenderCapability> {
        self.capability.as_ref()
    }

    /// Time since the notification was created.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Untimed notifications can always be closed explicitly.
    pub fn is_closable(&self) -> bool {
        self.options.map_or(true, |options| options.closable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Serialize)]
    struct Question {
        question: String,
    }

    impl Variant for Question {
        const TARGET: &'static str = "survey";
        const FUNCTION: &'static str = "question";
    }

    #[test]
    fn test_keys_are_unique_within_the_same_instant() {
        let keys: HashSet<Key> = (0..1000).map(|_| Notification::info("hi").key().clone()).collect();
        assert_eq!(keys.len(), 1000);
    }

    #[test]
    fn test_new_keys_never_collide_with_disconnected_key() {
        assert!(!Key::new().is_disconnected());
        assert!(Key::disconnected().is_disconnected());
    }

    #[test]
    fn test_flash_constructors_set_kind_and_capability() {
        let notification = Notification::error("boom");
        assert_eq!(notification.payload()["kind"], "error");
        assert_eq!(notification.payload()["message"], "boom");
        assert_eq!(notification.capability(), Some(&renderers::FLASH));
        assert_eq!(notification.options(), Some(&Options::default()));
    }

    #[test]
    fn test_from_variant_uses_declared_capability() {
        let notification = Notification::from_variant(&Question {
            question: "Continue?".to_string(),
        })
        .unwrap();

        let capability = notification.capability().unwrap();
        assert_eq!(capability.target(), "survey");
        assert_eq!(capability.function(), "question");
        assert_eq!(notification.payload()["question"], "Continue?");
        assert!(notification.options().is_none());
    }

    #[test]
    fn test_untyped_has_no_capability() {
        let notification = Notification::untyped(json!({ "message": "?" }), None);
        assert!(notification.capability().is_none());
        assert!(notification.is_closable());
    }

    #[test]
    fn test_with_options_overrides_closable() {
        let notification =
            Notification::info("sticky").with_options(Options::default().with_closable(false));
        assert!(!notification.is_closable());
    }
}
