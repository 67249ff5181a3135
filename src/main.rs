use log::*;
use notification::{renderers, Dispatcher};
use service::{config::Config, init_container, logging::Logger, AppState};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::new();

    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
        return ExitCode::FAILURE;
    }

    info!("Starting up...");

    let mut dispatcher = Dispatcher::new();
    renderers::register_defaults(&mut dispatcher);

    let container = match init_container(&config, dispatcher) {
        Ok(container) => container,
        Err(e) => {
            error!("Refusing to start: {e}");
            return ExitCode::FAILURE;
        }
    };

    let app_state = AppState::new(config, container);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
