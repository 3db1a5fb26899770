//! Error types shared across the crate.

use crate::config::error::ConfigError;
use crate::mocks::server::ServerError;
use thiserror::Error;

/// A collection, request, or mock document failed a shape check.
///
/// Raised before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unsupported HTTP method '{method}' (expected one of GET, POST, PUT, DELETE, PATCH)")]
    UnsupportedMethod { method: String },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid body in request '{request}': expected an object or a string")]
    InvalidBody { request: String },

    #[error("invalid path template '{path}': {reason}")]
    InvalidPathTemplate { path: String, reason: String },

    #[error("invalid status code {code} (expected 100-599)")]
    InvalidStatusCode { code: u16 },
}

/// Network failure while executing a single request.
///
/// Never retried. No history entry is recorded for a failed call.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("failed to initialize HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} timed out")]
    Timeout {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not connect to {url}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} could not be built")]
    InvalidRequest {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read response body from {url}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ExecutionError {
    /// Classify a `reqwest` error raised while sending a request.
    pub fn from_send(url: &str, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if source.is_timeout() {
            ExecutionError::Timeout { url, source }
        } else if source.is_connect() {
            ExecutionError::Connect { url, source }
        } else if source.is_builder() {
            ExecutionError::InvalidRequest { url, source }
        } else {
            ExecutionError::Transport { url, source }
        }
    }

    /// Classify a `reqwest` error raised while reading a response body.
    pub fn from_body(url: &str, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if source.is_timeout() {
            ExecutionError::Timeout { url, source }
        } else {
            ExecutionError::Body { url, source }
        }
    }
}

/// Broad error category, used by callers to pick exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A collection, environment, or mock file is missing
    ConfigNotFound,
    /// A document could not be read or parsed
    ConfigParse,
    /// A document parsed but failed validation
    Validation,
    /// A request failed on the network
    Execution,
    /// The mock server could not bind or accept connections
    Server,
}

/// Any error surfaced by the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(err) => err.kind(),
            Error::Validation(_) => ErrorKind::Validation,
            Error::Execution(_) => ErrorKind::Execution,
            Error::Server(_) => ErrorKind::Server,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
