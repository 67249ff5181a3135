//! Options attached to timed notifications.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Elapsed time before a dismissible notification hides itself.
pub const DEFAULT_DISMISS_TIME: Duration = Duration::from_millis(5000);

/// Immutable configuration of a timed notification.
///
/// On the wire every field is optional; `dismiss_time` is expressed in
/// milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    closable: bool,
    dismissible: bool,
    #[serde(with = "millis")]
    dismiss_time: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            closable: true,
            dismissible: true,
            dismiss_time: DEFAULT_DISMISS_TIME,
        }
    }
}

impl Options {
    #[must_use]
    pub fn with_closable(mut self, closable: bool) -> Self {
        self.closable = closable;
        self
    }

    #[must_use]
    pub fn with_dismissible(mut self, dismissible: bool) -> Self {
        self.dismissible = dismissible;
        self
    }

    #[must_use]
    pub fn with_dismiss_time(mut self, dismiss_time: Duration) -> Self {
        self.dismiss_time = dismiss_time;
        self
    }

    /// Whether an explicit close control is offered.
    pub fn closable(&self) -> bool {
        self.closable
    }

    /// Whether the notification hides itself after [`Self::dismiss_time`].
    pub fn dismissible(&self) -> bool {
        self.dismissible
    }

    pub fn dismiss_time(&self) -> Duration {
        self.dismiss_time
    }

    /// The countdown to schedule at mount, if any.
    pub fn countdown(&self) -> Option<Duration> {
        self.dismissible.then_some(self.dismiss_time)
    }

    /// Neither closable nor dismissible: once shown, the notification can only
    /// leave when its session ends.
    pub fn is_dead_end(&self) -> bool {
        !self.closable && !self.dismissible
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
