//! Drives a [`ClientBridge`] from a live session.

use crate::api_client::ApiClient;
use crate::client_bridge::{ClientBridge, Effect, Input};
use crate::presenter::Presenter;
use crate::sse_client::{Connection, StreamEvent};
use anyhow::Result;
use log::*;
use notification::Key;
use sse::message::Event;
use std::collections::HashMap;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Commands typed on stdin while watching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Close the n-th notification (1-based, stack order).
    Close(usize),
    List,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        match (words.next()?, words.next()) {
            ("close" | "c", Some(n)) => n.parse().ok().filter(|n| *n > 0).map(Command::Close),
            ("list" | "ls", None) => Some(Command::List),
            _ => None,
        }
    }
}

/// Simulated exit presentations, at most one running per key.
///
/// Restarting or cancelling the exit of a key discards any finish the earlier
/// run already queued, so only the latest presentation of a key completes.
struct ExitTimers {
    duration: Duration,
    generation: u64,
    running: HashMap<Key, (u64, JoinHandle<()>)>,
    tx: mpsc::UnboundedSender<(Key, u64)>,
    rx: mpsc::UnboundedReceiver<(Key, u64)>,
}

impl ExitTimers {
    fn new(duration: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            duration,
            generation: 0,
            running: HashMap::new(),
            tx,
            rx,
        }
    }

    fn start(&mut self, key: Key) {
        self.generation += 1;
        let generation = self.generation;
        let tx = self.tx.clone();
        let delay = self.duration;
        let finished = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send((finished, generation));
        });
        if let Some((_, previous)) = self.running.insert(key, (generation, handle)) {
            previous.abort();
        }
    }

    fn cancel(&mut self, key: &Key) {
        if let Some((_, handle)) = self.running.remove(key) {
            handle.abort();
        }
    }

    /// Waits for the next exit presentation that ran to its end.
    async fn finished(&mut self) -> Key {
        while let Some((key, generation)) = self.rx.recv().await {
            if self
                .running
                .get(&key)
                .is_some_and(|(current, _)| *current == generation)
            {
                self.running.remove(&key);
                return key;
            }
            trace!("Dropping superseded exit of {key}");
        }
        // `self.tx` keeps the channel open.
        std::future::pending().await
    }
}

pub struct Runner {
    api: ApiClient,
    session_id: String,
    bridge: ClientBridge,
    presenter: Presenter,
    exit_timers: ExitTimers,
}

impl Runner {
    pub fn new(api: ApiClient, session_id: String, exit_duration: Duration) -> Self {
        Self {
            api,
            session_id,
            bridge: ClientBridge::new(),
            presenter: Presenter::default(),
            exit_timers: ExitTimers::new(exit_duration),
        }
    }

    /// Runs until the stream ends or Ctrl-C is pressed.
    pub async fn run(mut self, mut connection: Connection) -> Result<()> {
        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        loop {
            let input = tokio::select! {
                event = connection.next() => match event {
                    Some(event) => self.translate(event),
                    None => {
                        info!("Session stream ended");
                        return Ok(());
                    }
                },
                key = self.exit_timers.finished() => Input::ExitFinished(key),
                line = stdin.next_line(), if stdin_open => match line? {
                    Some(line) => match self.command(&line) {
                        Some(input) => input,
                        None => continue,
                    },
                    None => {
                        stdin_open = false;
                        continue;
                    }
                },
                _ = tokio::signal::ctrl_c() => return Ok(()),
            };

            self.feed(input);
        }
    }

    fn feed(&mut self, input: Input) {
        for effect in self.bridge.handle(input) {
            self.apply(effect);
        }
    }

    fn translate(&mut self, event: StreamEvent) -> Input {
        match event {
            StreamEvent::Event(Event::Render { html, keys }) => {
                self.presenter.update(html);
                Input::Rendered(keys.into_iter().map(Key::from).collect())
            }
            StreamEvent::Event(Event::Hide { key }) => Input::Hide(Key::from(key)),
            StreamEvent::Lost => Input::TransportLost,
            StreamEvent::Restored => Input::TransportRestored,
        }
    }

    fn command(&self, line: &str) -> Option<Input> {
        match Command::parse(line) {
            Some(Command::Close(n)) => match self.bridge.mounted().get(n - 1) {
                Some(key) => Some(Input::UserClose(key.clone())),
                None => {
                    println!("No notification #{n}");
                    None
                }
            },
            Some(Command::List) => {
                self.presenter.stack(self.bridge.mounted());
                None
            }
            None => {
                println!("Commands: close <n>, list");
                None
            }
        }
    }

    /// Carries out `effect`. Server requests run on their own tasks so the
    /// stream and the exit timers are never held up by a slow backend.
    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::PlayEnter(key) => {
                self.exit_timers.cancel(&key);
                self.presenter.enter(&key);
            }
            Effect::PlayExit(key) => {
                self.presenter.exit(&key);
                self.exit_timers.start(key);
            }
            Effect::RemoveElement(key) => {
                self.exit_timers.cancel(&key);
                self.presenter.removed(&key);
            }
            Effect::RequestClose(key) => {
                let (api, session_id) = (self.api.clone(), self.session_id.clone());
                tokio::spawn(async move {
                    if let Err(e) = api.close(&session_id, &key).await {
                        warn!("{e:#}");
                    }
                });
            }
            Effect::RequestRemove(key) => {
                let (api, session_id) = (self.api.clone(), self.session_id.clone());
                tokio::spawn(async move {
                    if let Err(e) = api.remove(&session_id, &key).await {
                        warn!("{e:#}");
                    }
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client_bridge::SlotPhase;
    use tokio::time::{sleep, timeout, Instant};

    fn runner(exit_ms: u64) -> Runner {
        // Requests fail at URL parsing without touching the network.
        let api = ApiClient::new(reqwest::Client::new(), "not a url".to_string());
        Runner::new(api, "session".to_string(), Duration::from_millis(exit_ms))
    }

    #[tokio::test(start_paused = true)]
    async fn test_restarted_exit_finishes_once_after_full_duration() {
        let mut timers = ExitTimers::new(Duration::from_millis(300));
        let key = Key::new();
        let start = Instant::now();

        timers.start(key.clone());
        sleep(Duration::from_millis(200)).await;
        timers.start(key.clone());

        assert!(timeout(Duration::from_millis(250), timers.finished()).await.is_err());
        assert_eq!(timers.finished().await, key);
        assert_eq!(start.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_queued_before_cancel_is_dropped() {
        let mut timers = ExitTimers::new(Duration::from_millis(300));
        let key = Key::new();

        timers.start(key.clone());
        sleep(Duration::from_millis(301)).await;
        tokio::task::yield_now().await;
        timers.cancel(&key);

        assert!(timeout(Duration::from_secs(5), timers.finished()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_quick_reconnects_keep_indicator_until_last_exit_finishes() {
        let mut runner = runner(300);
        let start = Instant::now();

        runner.feed(Input::TransportLost);
        runner.feed(Input::TransportRestored);
        sleep(Duration::from_millis(200)).await;
        runner.feed(Input::TransportLost);
        runner.feed(Input::TransportRestored);

        let finished = runner.exit_timers.finished().await;
        assert_eq!(finished, Key::disconnected());
        assert_eq!(start.elapsed(), Duration::from_millis(500));
        assert_eq!(runner.bridge.disconnected_phase(), SlotPhase::Exiting);

        runner.feed(Input::ExitFinished(finished));
        assert_eq!(runner.bridge.disconnected_phase(), SlotPhase::Hidden);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_requests_do_not_hold_up_exit_presentations() {
        let mut runner = runner(300);
        let key = Key::new();
        runner.feed(Input::Rendered(vec![key.clone()]));
        let start = Instant::now();

        runner.feed(Input::UserClose(key.clone()));
        runner.feed(Input::Hide(key.clone()));

        assert_eq!(runner.exit_timers.finished().await, key);
        assert_eq!(start.elapsed(), Duration::from_millis(300));
        assert_eq!(runner.bridge.mounted(), &[key.clone()]);

        runner.feed(Input::ExitFinished(key));
        assert!(runner.bridge.mounted().is_empty());
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("close 2"), Some(Command::Close(2)));
        assert_eq!(Command::parse("  c 1 "), Some(Command::Close(1)));
        assert_eq!(Command::parse("list"), Some(Command::List));
        assert_eq!(Command::parse("close 0"), None);
        assert_eq!(Command::parse("close"), None);
        assert_eq!(Command::parse("close x"), None);
        assert_eq!(Command::parse(""), None);
    }
}
