use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use notification::{Error, RenderCapability, SessionConfig};
use std::time::Duration;

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Render capability of the disconnected indicator, as `target.function`.
    /// Required: the server refuses to start without a registered renderer for it.
    #[arg(long, env)]
    disconnected_renderer: Option<String>,

    /// Milliseconds a dismissed notification waits for the client's exit
    /// acknowledgement before it is removed anyway (0 removes it immediately)
    #[arg(long, env, default_value_t = 1000)]
    pub exit_grace_ms: u64,

    /// Seconds a session without any SSE subscriber is kept before it ends
    #[arg(long, env, default_value_t = 30)]
    pub session_linger_secs: u64,

    /// Interval in seconds of SSE keep-alive comments
    #[arg(long, env, default_value_t = 15)]
    pub keep_alive_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn set_disconnected_renderer(mut self, capability: impl Into<String>) -> Self {
        self.disconnected_renderer = Some(capability.into());
        self
    }

    /// The configured disconnected renderer. Missing or malformed values are
    /// configuration errors.
    pub fn disconnected_renderer(&self) -> Result<RenderCapability, Error> {
        self.disconnected_renderer
            .as_deref()
            .ok_or_else(|| Error::config("no disconnected renderer configured (DISCONNECTED_RENDERER)"))?
            .parse()
    }

    pub fn exit_grace(&self) -> Duration {
        Duration::from_millis(self.exit_grace_ms)
    }

    pub fn session_linger(&self) -> Duration {
        Duration::from_secs(self.session_linger_secs)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            exit_grace: self.exit_grace(),
        }
    }
}
