//! Error type shared by every Plop operation.

use std::collections::HashMap;

/// Field-level validation messages returned by the API, keyed by field name.
pub type ErrorDetails = HashMap<String, Vec<String>>;

/// Errors that can occur while talking to the Plop API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never produced an HTTP response (DNS, TLS, connection reset, ...).
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the `error` field of the response body, or a generic fallback.
        message: String,
        /// Per-field validation messages, when the API sent them.
        details: Option<ErrorDetails>,
    },

    /// A response body or stream payload was not the JSON we expected.
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The event stream was corrupt or ended in the middle of a frame.
    #[error("Failed to decode event stream: {0}")]
    Decode(String),

    /// [`wait_for`](crate::Messages::wait_for) gave up before a message arrived.
    #[error("Timeout waiting for message")]
    Timeout,

    /// A webhook signature header could not be split into `t` and `v1`.
    #[error("Invalid webhook signature format")]
    MalformedSignature,

    /// No API key was configured and `PLOP_API_KEY` is unset.
    #[error(
        "Missing API key. Pass it to the builder or set the PLOP_API_KEY environment variable."
    )]
    MissingApiKey,

    /// The configured base URL could not be parsed or cannot carry a path.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The API key or user agent cannot be sent as an HTTP header value.
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// The stream endpoint answered without a response body.
    #[error("No response body for stream")]
    MissingStreamBody,

    /// The stream was cancelled before the server responded.
    #[error("Stream request cancelled")]
    Cancelled,
}

impl Error {
    /// HTTP-style status code for this error.
    ///
    /// Transport and decoding problems report `0`; [`Error::Timeout`] reports
    /// `408`, [`Error::MalformedSignature`] `400` and [`Error::MissingApiKey`] `401`.
    pub fn status(&self) -> u16 {
        match self {
            Error::Api { status, .. } => *status,
            Error::Timeout => 408,
            Error::MalformedSignature => 400,
            Error::MissingApiKey => 401,
            _ => 0,
        }
    }

    /// `true` when the API reported that the resource does not exist (yet).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { status: 404, .. })
    }

    /// Validation details attached to an API error, if any.
    pub fn details(&self) -> Option<&ErrorDetails> {
        match self {
            Error::Api { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}
