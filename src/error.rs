//! Error types for loghive-client
//!
//! Every failure the crate can produce is a variant of one [`Error`] enum, so callers
//! can match broadly (`Err(e) => …`) or narrowly (`Err(Error::QueryJobExpired(_)) => …`).
//! Transport-library failures are classified here so calling code never has to depend
//! on `reqwest`'s error types directly.

use thiserror::Error;

/// Result type alias for loghive-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for loghive-client
///
/// The first six variants form the domain taxonomy for remote calls; the remaining
/// ones cover local failures (URL parsing, payload serialization, file reads).
#[derive(Debug, Error)]
pub enum Error {
    /// Could not reach the server at all (refused, reset, DNS failure, TLS setup)
    #[error("connection error: {0}")]
    Connection(#[source] reqwest::Error),

    /// The request was sent but no response arrived within the configured timeout
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code of the response
        status: u16,
        /// Response body text, as returned by the server
        body: String,
    },

    /// A streaming response died mid-flight
    ///
    /// The socket stayed open but chunks stopped arriving intact, which is how
    /// long-idle live-query streams fail. Distinct from a clean end-of-stream so
    /// callers can tell "query ended" from "connection died" and reconnect.
    #[error("streaming connection dropped: {0}")]
    ConnectionDropped(String),

    /// The polled query job no longer exists on the server (404 on the job endpoint)
    ///
    /// The job must be recreated by the caller; the crate never recreates it
    /// automatically because a restarted job may replay results that were already
    /// delivered.
    #[error("query job expired: {0}")]
    QueryJobExpired(String),

    /// A static query job was polled after its last segment was delivered
    ///
    /// This is a contract violation on the caller's side, not a server condition.
    #[error("query job is exhausted, no more segments can be polled")]
    QueryJobExhausted,

    /// The base URL handed to a client constructor could not be parsed
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    /// A request payload or response body failed to (de)serialize
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local I/O failure (reading a file for upload)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server returned well-formed JSON that is missing a documented field
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// Classify a transport-level `reqwest` failure into the domain taxonomy.
    ///
    /// Timeouts get their own variant; everything else that happens before a status
    /// line is read (connect, DNS, reset, TLS) is a connection failure.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err)
        } else {
            Error::Connection(err)
        }
    }

    /// Returns the HTTP status code if this error carries one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the failure is transient and the operation may be retried as-is
    ///
    /// Connection failures, timeouts, dropped streams, and 429/5xx responses are
    /// transient. [`Error::QueryJobExpired`] is deliberately *not* transient: the
    /// job is gone and re-issuing the same poll can never succeed; the caller has
    /// to create a new job instead.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Connection(_) | Error::Timeout(_) | Error::ConnectionDropped(_) => true,
            Error::Http { status, .. } => *status == 429 || *status >= 500,
            Error::QueryJobExpired(_)
            | Error::QueryJobExhausted
            | Error::InvalidUrl(_)
            | Error::Json(_)
            | Error::Io(_)
            | Error::Protocol(_) => false,
        }
    }
}
