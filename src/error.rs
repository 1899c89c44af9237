//! Error handling for the Graph client.
//!
//! Failures fall into two camps: errors the remote service reported
//! (4xx/5xx, carried as [`ApiError`] and routed through the configurable
//! [`ErrorHandler`]) and errors the library itself raises (invalid verb
//! strings, transport failures, unparseable bodies, out-of-protocol status
//! codes).

use crate::response::ParsedResponse;
use thiserror::Error;

/// A classified 4xx/5xx failure returned by the Graph API.
///
/// Carries the originating status code and the parsed error body when the
/// service returned valid JSON. This is not a control-flow value: it exists
/// to be forwarded to the [`ErrorHandler`] configured on the client.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code of the failed response.
    pub status: u16,
    /// Human-readable summary, includes the status code.
    pub message: String,
    /// Parsed error body, if the service returned valid JSON.
    pub response: Option<ParsedResponse>,
}

impl ApiError {
    pub(crate) fn from_status(status: u16, response: Option<ParsedResponse>) -> Self {
        Self {
            status,
            message: format!(
                "Received status code: {status}. Check the `response` attribute for more details."
            ),
            response,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Errors produced by the Graph client.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Verb string outside the allowed set, rejected before any network
    /// activity.
    #[error("`{0}` is not a valid HTTP method")]
    InvalidMethod(String),

    /// A 4xx/5xx response, classified by the dispatcher and propagated by
    /// the default error handler.
    #[error("{0}")]
    Api(ApiError),

    /// Status code outside 200-599. The remote service (or an intermediary)
    /// answered outside the HTTP protocol's meaningful range; this is never
    /// routed through the error handler.
    #[error("Unknown status code: {0}")]
    UnexpectedStatus(u16),

    /// Transport-level failure (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body could not be parsed as JSON.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid configuration, such as a header name or token that cannot be
    /// encoded into a request.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Strategy for handling classified API failures.
///
/// Injected at client construction; the dispatcher routes every 4xx/5xx
/// through it. The default strategy is [`Propagate`]. An alternate handler
/// may log and swallow the failure by returning the error body as the
/// call's result, which keeps `?`-style call sites untouched.
pub trait ErrorHandler: Send + Sync {
    /// Decide the outcome of a failed call.
    fn handle(&self, error: ApiError) -> Result<ParsedResponse, GraphError>;
}

/// Default error handler: propagate the failure as [`GraphError::Api`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Propagate;

impl ErrorHandler for Propagate {
    fn handle(&self, error: ApiError) -> Result<ParsedResponse, GraphError> {
        Err(GraphError::Api(error))
    }
}
