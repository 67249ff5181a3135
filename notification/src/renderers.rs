//! Built-in renderers.
//!
//! Deliberately plain markup: visual design belongs to the embedding
//! application, which registers its own renderers next to (or instead of) these.

use crate::markup::escape;
use crate::render::{Dispatcher, RenderCapability, RenderContext};

/// Capability of the built-in flash notification.
pub const FLASH: RenderCapability = RenderCapability::from_static("flash", "flash");
/// Capability of the built-in disconnected indicator.
pub const DISCONNECTED: RenderCapability = RenderCapability::from_static("flash", "disconnected");

/// Registers the built-in renderers.
pub fn register_defaults(dispatcher: &mut Dispatcher) {
    dispatcher
        .register(FLASH, flash)
        .register(DISCONNECTED, disconnected);
}

fn flash(ctx: &RenderContext<'_>) -> String {
    let Some(notification) = ctx.notification else {
        return String::new();
    };
    let payload = notification.payload();
    let kind = payload["kind"].as_str().unwrap_or("info");
    let message = payload["message"].as_str().unwrap_or_default();

    let mut markup = format!(
        r#"<p data-flash-kind="{}">{}</p>"#,
        escape(kind),
        escape(message)
    );
    if notification.is_closable() {
        markup.push_str(r#"<button type="button" data-flash-close>&times;</button>"#);
    }
    if let Some(countdown) = ctx.countdown {
        markup.push_str(&format!(
            r#"<div data-flash-progress-bar style="--flash-remaining-ms: {}"></div>"#,
            countdown.remaining.as_millis()
        ));
    }
    markup
}

fn disconnected(_ctx: &RenderContext<'_>) -> String {
    "<p>Connection lost. Reconnecting&hellip;</p>".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Countdown;
    use crate::notification::{Key, Notification};
    use crate::options::Options;
    use std::time::Duration;

    fn dispatcher() -> Dispatcher {
        let mut dispatcher = Dispatcher::new();
        register_defaults(&mut dispatcher);
        dispatcher
    }

    #[test]
    fn test_flash_escapes_message() {
        let markup = dispatcher()
            .dispatch(&Notification::error("<script>"), None)
            .unwrap();
        assert!(markup.starts_with(r#"<p data-flash-kind="error">&lt;script&gt;</p>"#));
    }

    #[test]
    fn test_flash_close_control_follows_closable() {
        let dispatcher = dispatcher();
        let closable = dispatcher.dispatch(&Notification::info("a"), None).unwrap();
        let sticky = dispatcher
            .dispatch(
                &Notification::info("a").with_options(Options::default().with_closable(false)),
                None,
            )
            .unwrap();

        assert!(closable.contains("data-flash-close"));
        assert!(!sticky.contains("data-flash-close"));
    }

    #[test]
    fn test_flash_renders_progress_bar_while_counting_down() {
        let markup = dispatcher()
            .dispatch(
                &Notification::info("a"),
                Some(Countdown {
                    remaining: Duration::from_millis(1200),
                    progress: 0.4,
                }),
            )
            .unwrap();
        assert!(markup.contains("--flash-remaining-ms: 1200"));
    }

    #[test]
    fn test_disconnected_renders_without_notification() {
        let dispatcher = dispatcher();
        let renderer = dispatcher.resolve_capability(&DISCONNECTED).unwrap();
        let key = Key::disconnected();
        let markup = renderer.render(&RenderContext {
            key: &key,
            notification: None,
            countdown: None,
        });
        assert!(markup.contains("Connection lost"));
    }
}
