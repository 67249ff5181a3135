//! Client attribute protocol carried by rendered notification markup.
//!
//! Every notification root element carries its key, a mount marker that the
//! client fires its entrance presentation from, and two signal attributes that
//! name the client events for "play entrance" and "play exit, then remove".
//! The client only asks the server to drop a key after the exit presentation
//! has finished.

use crate::lifecycle::Countdown;
use crate::notification::Key;
use std::fmt::Write as _;

pub const CONTAINER_ID: &str = "flash-stack";
pub const ELEMENT_ID_PREFIX: &str = "flash-";

pub const ATTR_KEY: &str = "data-flash-key";
pub const ATTR_MOUNT: &str = "data-flash-mount";
pub const ATTR_ON_SHOW: &str = "data-flash-on-show";
pub const ATTR_ON_HIDE: &str = "data-flash-on-hide";
pub const ATTR_CLOSABLE: &str = "data-flash-closable";
pub const ATTR_REMAINING_MS: &str = "data-flash-remaining-ms";
pub const ATTR_PROGRESS: &str = "data-flash-progress";
pub const ATTR_DISCONNECTED: &str = "data-flash-disconnected";

/// Value of [`ATTR_MOUNT`]: fire the entrance presentation when mounted.
pub const MOUNT_SHOW: &str = "show";
/// Client event that plays the entrance presentation.
pub const EVENT_SHOW: &str = "flash:show";
/// Client event that plays the exit presentation and then removes the element.
pub const EVENT_HIDE: &str = "flash:hide";

/// DOM id of the element rendered for `key`.
pub fn element_id(key: &Key) -> String {
    if key.is_disconnected() {
        key.to_string()
    } else {
        format!("{ELEMENT_ID_PREFIX}{key}")
    }
}

/// Escapes text for use in element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Attributes of one notification root element.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Root<'a> {
    pub key: &'a Key,
    pub closable: bool,
    pub countdown: Option<Countdown>,
}

impl Root<'_> {
    /// Writes `<div ...>inner</div>` to `out`.
    pub(crate) fn write(&self, out: &mut String, inner: &str) {
        let key = escape(self.key.as_str());
        let _ = write!(
            out,
            r#"<div id="{id}" {ATTR_KEY}="{key}" {ATTR_MOUNT}="{MOUNT_SHOW}" {ATTR_ON_SHOW}="{EVENT_SHOW}" {ATTR_ON_HIDE}="{EVENT_HIDE}" {ATTR_CLOSABLE}="{closable}""#,
            id = escape(&element_id(self.key)),
            closable = self.closable,
        );
        if let Some(countdown) = self.countdown {
            let _ = write!(
                out,
                r#" {ATTR_REMAINING_MS}="{}" {ATTR_PROGRESS}="{:.3}""#,
                countdown.remaining.as_millis(),
                countdown.progress
            );
        }
        let _ = write!(out, ">{inner}</div>");
    }

    /// Writes the always-present, initially hidden disconnected slot.
    pub(crate) fn write_disconnected_slot(out: &mut String, inner: &str) {
        let key = Key::disconnected();
        let _ = write!(
            out,
            r#"<div id="{id}" {ATTR_KEY}="{key}" {ATTR_DISCONNECTED} {ATTR_ON_SHOW}="{EVENT_SHOW}" {ATTR_ON_HIDE}="{EVENT_HIDE}" hidden>{inner}</div>"#,
            id = element_id(&key),
        );
    }
}
