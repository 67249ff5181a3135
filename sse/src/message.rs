use axum::response::sse::Event as SseEvent;
use notification::Signal;
use serde::{Deserialize, Serialize};

/// Trait for getting the SSE event type name
pub trait EventType {
    fn event_type(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// Full container markup plus the keys on the stack, in order.
    #[serde(rename = "render")]
    Render { html: String, keys: Vec<String> },

    /// Play the exit presentation of `key`, then post the exit acknowledgement.
    #[serde(rename = "hide")]
    Hide { key: String },
}

impl EventType for Event {
    fn event_type(&self) -> &'static str {
        match self {
            Event::Render { .. } => "render",
            Event::Hide { .. } => "hide",
        }
    }
}

impl From<Signal> for Event {
    fn from(signal: Signal) -> Self {
        match signal {
            Signal::Render(rendered) => Event::Render {
                html: rendered.html,
                keys: rendered.keys.iter().map(|key| key.to_string()).collect(),
            },
            Signal::Hide(key) => Event::Hide {
                key: key.to_string(),
            },
        }
    }
}

impl Event {
    /// Encodes the event as an SSE frame named after its type.
    pub fn to_sse(&self) -> Result<SseEvent, serde_json::Error> {
        let data = serde_json::to_string(self)?;
        Ok(SseEvent::default().event(self.event_type()).data(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notification::{Key, Rendered};
    use serde_json::json;

    #[test]
    fn test_hide_serializes_with_type_and_data() {
        let event = Event::from(Signal::Hide(Key::from("k1".to_string())));
        assert_eq!(event.event_type(), "hide");
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({ "type": "hide", "data": { "key": "k1" } })
        );
    }

    #[test]
    fn test_render_carries_keys_in_order() {
        let event = Event::from(Signal::Render(Rendered {
            html: "<div></div>".to_string(),
            keys: vec![Key::from("a".to_string()), Key::from("b".to_string())],
        }));

        assert_eq!(event.event_type(), "render");
        assert_eq!(
            event,
            Event::Render {
                html: "<div></div>".to_string(),
                keys: vec!["a".to_string(), "b".to_string()],
            }
        );
        assert!(event.to_sse().is_ok());
    }
}
