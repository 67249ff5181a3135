use anyhow::Result;
use bridge::api_client::ApiClient;
use bridge::runner::Runner;
use bridge::sse_client::Connection;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use serde_json::json;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "flash-bridge")]
#[command(about = "Terminal client for flash notification sessions")]
struct Cli {
    /// Base URL of the backend (e.g., http://localhost:4000)
    #[arg(long, env = "FLASH_BASE_URL", default_value = "http://localhost:4000")]
    base_url: String,

    /// Timeout of each HTTP request to the backend, in seconds
    #[arg(long, default_value_t = 10)]
    request_timeout_secs: u64,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Subscribe to a session and play its notifications in the terminal
    Watch {
        /// Session to watch; a new one is created when omitted
        #[arg(long)]
        session: Option<String>,

        /// Duration of the simulated exit presentation in milliseconds
        #[arg(long, default_value_t = 300)]
        exit_ms: u64,

        /// Upper bound of the reconnect backoff in seconds
        #[arg(long, default_value_t = 10)]
        max_reconnect_delay_secs: u64,
    },
    /// Push a flash notification onto a session
    Push {
        #[arg(long)]
        session: String,

        #[arg(long)]
        message: String,

        #[arg(long, value_enum, default_value_t = Kind::Info)]
        kind: Kind,

        /// Milliseconds before the notification dismisses itself
        #[arg(long)]
        dismiss_ms: Option<u64>,

        /// Never dismiss automatically
        #[arg(long, conflicts_with = "dismiss_ms")]
        sticky: bool,

        /// Hide the close control
        #[arg(long)]
        no_close: bool,
    },
}

#[derive(ValueEnum, Clone, Copy)]
enum Kind {
    Info,
    Error,
}

impl Kind {
    fn as_str(self) -> &'static str {
        match self {
            Kind::Info => "info",
            Kind::Error => "error",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cli.request_timeout_secs))
        .build()?;
    let api = ApiClient::new(client, cli.base_url.clone());

    match cli.command {
        Commands::Watch {
            session,
            exit_ms,
            max_reconnect_delay_secs,
        } => {
            let session_id = match session {
                Some(session_id) => session_id,
                None => {
                    let session_id = api.create_session().await?;
                    println!("{} Created session {}", "✓".green(), session_id.bold());
                    session_id
                }
            };

            println!("{} Watching session {}", "→".blue(), session_id);
            println!("{}", "Commands: close <n>, list".dimmed());

            let connection = Connection::establish(
                &cli.base_url,
                &session_id,
                Duration::from_secs(max_reconnect_delay_secs),
            )?;
            Runner::new(api, session_id, Duration::from_millis(exit_ms))
                .run(connection)
                .await
        }
        Commands::Push {
            session,
            message,
            kind,
            dismiss_ms,
            sticky,
            no_close,
        } => {
            let mut options = json!({ "closable": !no_close, "dismissible": !sticky });
            if let Some(ms) = dismiss_ms {
                options["dismiss_time"] = json!(ms);
            }
            let body = json!({
                "render": { "target": "flash", "function": "flash" },
                "payload": { "kind": kind.as_str(), "message": message },
                "options": options,
            });

            let key = api.push(&session, &body).await?;
            println!("{} Pushed {}", "✓".green(), key);
            Ok(())
        }
    }
}
