use notification::{Notification, Options, RenderCapability};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use utoipa::ToSchema;

/// The `(target, function)` pair a notification is rendered by.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct RenderParams {
    pub(crate) target: String,
    pub(crate) function: String,
}

/// Options of a timed notification. Omitted fields take their defaults.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub(crate) struct OptionsParams {
    pub(crate) closable: Option<bool>,
    pub(crate) dismissible: Option<bool>,
    /// Milliseconds
    pub(crate) dismiss_time: Option<u64>,
}

impl From<OptionsParams> for Options {
    fn from(params: OptionsParams) -> Self {
        let mut options = Options::default();
        if let Some(closable) = params.closable {
            options = options.with_closable(closable);
        }
        if let Some(dismissible) = params.dismissible {
            options = options.with_dismissible(dismissible);
        }
        if let Some(ms) = params.dismiss_time {
            options = options.with_dismiss_time(Duration::from_millis(ms));
        }
        options
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct PushParams {
    /// Omitting the render capability is a contract violation and is rejected.
    pub(crate) render: Option<RenderParams>,
    #[schema(value_type = Object)]
    pub(crate) payload: Value,
    /// Absent for notifications without a countdown.
    pub(crate) options: Option<OptionsParams>,
}

impl From<PushParams> for Notification {
    fn from(params: PushParams) -> Self {
        let options = params.options.map(Options::from);
        match params.render {
            Some(render) => Notification::with_capability(
                RenderCapability::new(render.target, render.function),
                params.payload,
                options,
            ),
            None => Notification::untyped(params.payload, options),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_options_keep_defaults() {
        let params: PushParams = serde_json::from_value(json!({
            "render": { "target": "flash", "function": "flash" },
            "payload": { "kind": "info", "message": "saved" },
            "options": { "dismiss_time": 2000 }
        }))
        .unwrap();

        let notification = Notification::from(params);
        let options = notification.options().unwrap();
        assert!(options.closable());
        assert!(options.dismissible());
        assert_eq!(options.dismiss_time(), Duration::from_millis(2000));
        assert_eq!(notification.capability().unwrap().target(), "flash");
    }

    #[test]
    fn test_missing_render_builds_untyped_notification() {
        let params: PushParams =
            serde_json::from_value(json!({ "payload": { "message": "?" } })).unwrap();

        let notification = Notification::from(params);
        assert!(notification.capability().is_none());
        assert!(notification.options().is_none());
    }
}
