use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("credential store encoding error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("keyring error: {0}")]
    Keyring(String),
}

/// Outcome of [`crate::Gateway::send`] when no usable response is produced.
///
/// An authorization failure that a renewal resolves never reaches the
/// caller; `Authorization` only surfaces when the single replay is also
/// rejected.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("request rejected ({status}): {message}")]
    Validation { status: StatusCode, message: String },
    #[error("unauthorized: {message}")]
    Authorization { message: String },
    #[error("session expired, please log in again")]
    SessionExpired,
    #[error("server error ({status}): {message}")]
    Server { status: StatusCode, message: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("error decoding response body (status {status}): {source}")]
    Decode {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}

/// Login and registration failures. `Rejected` carries the server message
/// when one was sent, otherwise a generic fallback.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Why a renewal attempt failed. Shared verbatim with every waiter of the
/// same ticket, hence `Clone`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenewalFailure {
    #[error("no refresh token stored")]
    MissingRefreshToken,
    #[error("refresh rejected with status {status}")]
    Rejected { status: u16 },
    #[error("refresh transport error: {0}")]
    Transport(String),
    #[error("refresh timed out after {0:?}")]
    TimedOut(Duration),
    #[error("invalid refresh response: {0}")]
    InvalidResponse(String),
    #[error("failed to persist renewed credentials: {0}")]
    Store(String),
}
