//! Error types for the `notification` layer.
use std::error::Error as StdError;
use std::fmt;

pub type Result<T> = core::result::Result<T, Error>;

/// Top-level notification error type.
/// Modeled the same way as the other layers of the workspace: a `source` holding
/// the original error, if any, and an `error_kind` that callers match on to decide
/// how to surface the failure. Idempotent no-ops (double close, removal of an
/// absent key) are never errors and never appear here.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// The kinds of errors that can occur in the notification layer.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// A notification declares no render capability, or one that no renderer is
    /// registered for. This is a programming defect in the calling application.
    ContractViolation(String),
    /// Startup configuration is missing or invalid.
    Config(String),
    /// The session's event loop has shut down.
    SessionClosed,
    /// A session or notification lookup found nothing.
    NotFound,
}

impl Error {
    pub fn contract_violation(message: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: ErrorKind::ContractViolation(message.into()),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: ErrorKind::Config(message.into()),
        }
    }

    pub fn session_closed() -> Self {
        Error {
            source: None,
            error_kind: ErrorKind::SessionClosed,
        }
    }

    pub fn not_found() -> Self {
        Error {
            source: None,
            error_kind: ErrorKind::NotFound,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::ContractViolation(message) => {
                write!(f, "Notification contract violation: {message}")
            }
            ErrorKind::Config(message) => write!(f, "Notification configuration error: {message}"),
            ErrorKind::SessionClosed => write!(f, "Notification session is closed"),
            ErrorKind::NotFound => write!(f, "Not found"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for Error {
    fn from(err: tokio::sync::oneshot::error::RecvError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::SessionClosed,
        }
    }
}

// Typed variants are serialized into the notification payload; a variant that
// cannot be represented as JSON can never be rendered.
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            error_kind: ErrorKind::ContractViolation(format!(
                "variant payload is not serializable: {err}"
            )),
            source: Some(Box::new(err)),
        }
    }
}
