// Error types for every stage of a call.
//
// A call fails in exactly one place: the transport (network or HTTP status),
// the outer envelope, the envelope status check, or the typed `data` payload.
// Each stage has its own enum; `ClientError` flattens them for callers.

use thiserror::Error;

/// Failure while sending a request or reading its response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// DNS, connect, TLS, timeout or body read failure.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The server answered with HTTP status >= 400. The body is kept verbatim.
    #[error("API error: HTTP status {status}, body: {body}")]
    HttpStatus { status: u16, body: String },
}

/// Failure while unwrapping the `{status, message, data}` envelope.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed response envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("could not decode response data as {shape}: {source}")]
    Payload {
        shape: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Only produced under `StatusPolicy::Enforce`.
    #[error("API rejected the request (status {status}): {message}")]
    Rejected { status: i64, message: String },
}

/// Unified error returned by `ApiClient::call` and every operation.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("API error: HTTP status {status}, body: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("malformed response envelope: {0}")]
    EnvelopeDecode(#[source] serde_json::Error),

    #[error("could not decode response data as {shape}: {source}")]
    PayloadDecode {
        shape: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("API rejected the request (status {status}): {message}")]
    Rejected { status: i64, message: String },
}

impl ClientError {
    /// Returns `true` if the request hit the configured time bound.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network(e) if e.is_timeout())
    }
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Network(e) => Self::Network(e),
            TransportError::HttpStatus { status, body } => Self::HttpStatus { status, body },
        }
    }
}

impl From<DecodeError> for ClientError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Envelope(e) => Self::EnvelopeDecode(e),
            DecodeError::Payload { shape, source } => Self::PayloadDecode { shape, source },
            DecodeError::Rejected { status, message } => Self::Rejected { status, message },
        }
    }
}

/// Failure while constructing the client session.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("API token contains characters that cannot be sent in an HTTP header")]
    InvalidToken(#[source] reqwest::header::InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Invalid menu input. Recovered locally by the interactive loop.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MenuError {
    #[error("invalid input {0:?}, please enter a number")]
    NotANumber(String),

    #[error("invalid option {0}")]
    UnknownOption(i64),
}
