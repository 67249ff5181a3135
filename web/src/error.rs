use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use log::*;
use notification::{Error as NotificationError, ErrorKind};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(NotificationError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.0)
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.0.error_kind {
            ErrorKind::ContractViolation(message) => {
                warn!("Rejected notification: {message}");
                (StatusCode::UNPROCESSABLE_ENTITY, message).into_response()
            }
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT FOUND").into_response(),
            ErrorKind::SessionClosed => (StatusCode::GONE, "SESSION CLOSED").into_response(),
            ErrorKind::Config(message) => {
                error!("Configuration error while serving a request: {message}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
            }
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<NotificationError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_map_to_status_codes() {
        let cases = [
            (NotificationError::contract_violation("x"), StatusCode::UNPROCESSABLE_ENTITY),
            (NotificationError::not_found(), StatusCode::NOT_FOUND),
            (NotificationError::session_closed(), StatusCode::GONE),
            (NotificationError::config("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(Error::from(err).into_response().status(), status);
        }
    }
}
