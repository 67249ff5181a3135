use anyhow::Result;
use eventsource_client::{self as es, Client};
use futures_util::stream::StreamExt;
use log::*;
use sse::message::Event;
use std::time::Duration;
use tokio::sync::mpsc;

/// What the subscription reports to the runner.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Event(Event),
    /// The stream failed; the client keeps reconnecting in the background.
    Lost,
    /// The first frame after a loss arrived.
    Restored,
}

pub struct Connection {
    event_rx: mpsc::UnboundedReceiver<StreamEvent>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Connection {
    /// Subscribes to the stream of `session_id`, reconnecting with exponential
    /// backoff up to `max_delay`.
    pub fn establish(base_url: &str, session_id: &str, max_delay: Duration) -> Result<Self> {
        let url = format!("{base_url}/sessions/{session_id}/stream");
        let (tx, rx) = mpsc::unbounded_channel();

        let client = es::ClientBuilder::for_url(&url)?
            .reconnect(
                es::ReconnectOptions::reconnect(true)
                    .retry_initial(true)
                    .delay(Duration::from_millis(500))
                    .backoff_factor(2)
                    .delay_max(max_delay)
                    .build(),
            )
            .build();

        let handle = tokio::spawn(async move {
            let mut stream = client.stream();
            let mut lost = false;

            loop {
                let item = match stream.next().await {
                    Some(Ok(sse)) => {
                        if lost {
                            lost = false;
                            info!("SSE stream restored");
                            if tx.send(StreamEvent::Restored).is_err() {
                                break;
                            }
                        }
                        match sse {
                            es::SSE::Event(event) => match serde_json::from_str(&event.data) {
                                Ok(parsed) => Some(StreamEvent::Event(parsed)),
                                Err(e) => {
                                    warn!("Ignoring malformed {} event: {e}", event.event_type);
                                    None
                                }
                            },
                            // Keep-alive
                            es::SSE::Comment(_) => None,
                        }
                    }
                    Some(Err(e)) => {
                        warn!("SSE error: {e}");
                        if lost {
                            None
                        } else {
                            lost = true;
                            Some(StreamEvent::Lost)
                        }
                    }
                    None => {
                        debug!("SSE stream ended");
                        break;
                    }
                };

                if let Some(item) = item {
                    if tx.send(item).is_err() {
                        debug!("SSE receiver dropped");
                        break;
                    }
                }
            }
        });

        Ok(Self {
            event_rx: rx,
            _handle: handle,
        })
    }

    /// Next stream event; `None` once the stream has ended for good.
    pub async fn next(&mut self) -> Option<StreamEvent> {
        self.event_rx.recv().await
    }
}
