use config::Config;
use log::info;
use notification::{Container, Dispatcher, Error};
use sse::Manager;
use std::sync::Arc;

pub mod config;
pub mod logging;

/// Builds the notification container from the registered renderers.
///
/// Fails when the configured disconnected renderer is missing, malformed or
/// not registered in `dispatcher`; the server must not start in that case.
pub fn init_container(config: &Config, dispatcher: Dispatcher) -> Result<Container, Error> {
    let disconnected = config.disconnected_renderer()?;
    let container = Container::new(dispatcher, disconnected)?;
    info!(
        "Notification container ready: disconnected renderer {}, exit grace {:?}",
        container.disconnected(),
        config.exit_grace()
    );
    Ok(container)
}

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sse_manager: Arc<Manager>,
}

impl AppState {
    pub fn new(app_config: Config, container: Container) -> Self {
        let sse_manager = Manager::new(
            Arc::new(container),
            app_config.session_config(),
            app_config.session_linger(),
        );
        Self {
            config: app_config,
            sse_manager: Arc::new(sse_manager),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use notification::{renderers, ErrorKind};

    fn config(args: &[&str]) -> Config {
        Config::parse_from(std::iter::once("flash_stack").chain(args.iter().copied()))
    }

    #[test]
    fn test_init_container_with_registered_renderer() {
        let mut dispatcher = Dispatcher::new();
        renderers::register_defaults(&mut dispatcher);

        let container = init_container(
            &config(&["--disconnected-renderer", "flash.disconnected"]),
            dispatcher,
        )
        .unwrap();
        assert_eq!(container.disconnected(), &renderers::DISCONNECTED);
    }

    #[test]
    fn test_init_container_rejects_unregistered_renderer() {
        let mut dispatcher = Dispatcher::new();
        renderers::register_defaults(&mut dispatcher);

        let err = init_container(
            &config(&["--disconnected-renderer", "app.offline"]),
            dispatcher,
        )
        .err()
        .unwrap();
        assert!(matches!(err.error_kind, ErrorKind::Config(_)));
    }
}
