//! Classified errors for the transport client.
//!
//! Every failure a [`Client`](crate::Client) can produce is one of three
//! mutually exclusive kinds: a local misconfiguration ([`ClientError`]),
//! a structurally invalid request ([`RequestError`]) or a network-layer
//! failure reported by the transport ([`NetworkError`]). No raw transport
//! error escapes unclassified.

use std::fmt;
use std::sync::Arc;

use crate::message::Request;

/// Boxed low-level fault kept for diagnostic chaining.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Shared capability: an error that can name the request it belongs to.
///
/// The request is shared, not owned — it outlives the error, and callers
/// can compare it against the request they sent with [`Arc::ptr_eq`].
pub trait WithRequest {
    /// The originating request, when one was attributable at failure time.
    fn request(&self) -> Option<&Arc<Request>>;
}

/// Local misconfiguration or environment failure.
///
/// Carries no request when it precedes request validation (the failure is
/// environmental, not request-specific); carries one otherwise.
#[derive(Debug)]
pub struct ClientError {
    message: String,
    code: Option<i64>,
    request: Option<Arc<Request>>,
    cause: Option<Cause>,
}

impl ClientError {
    /// Create a client error with a message and nothing else attached.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            request: None,
            cause: None,
        }
    }

    /// Attach the low-level fault that triggered this classification.
    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Attach a numeric code.
    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach the originating request.
    pub fn with_request(mut self, request: Arc<Request>) -> Self {
        self.request = Some(request);
        self
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The numeric code, if one applies.
    pub fn code(&self) -> Option<i64> {
        self.code
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl WithRequest for ClientError {
    fn request(&self) -> Option<&Arc<Request>> {
        self.request.as_ref()
    }
}

/// The supplied request is structurally invalid for transport.
///
/// Always carries the originating request.
#[derive(Debug)]
pub struct RequestError {
    message: String,
    code: Option<i64>,
    request: Arc<Request>,
    cause: Option<Cause>,
}

impl RequestError {
    /// Create a request error attributed to `request`.
    pub fn new(message: impl Into<String>, request: Arc<Request>) -> Self {
        Self {
            message: message.into(),
            code: None,
            request,
            cause: None,
        }
    }

    /// Attach the low-level fault that triggered this classification.
    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Attach a numeric code.
    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The numeric code, if one applies.
    pub fn code(&self) -> Option<i64> {
        self.code
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl WithRequest for RequestError {
    fn request(&self) -> Option<&Arc<Request>> {
        Some(&self.request)
    }
}

/// The transport attempted the exchange and failed at the network layer.
///
/// Always carries the transport's numeric fault code, its message and the
/// originating request. Covers DNS failure, connection refused, TLS
/// failure, timeouts — anything the transport itself detects.
#[derive(Debug)]
pub struct NetworkError {
    message: String,
    code: i64,
    request: Arc<Request>,
    cause: Option<Cause>,
}

impl NetworkError {
    /// Create a network error from the transport's code/message pair.
    pub fn new(message: impl Into<String>, code: i64, request: Arc<Request>) -> Self {
        Self {
            message: message.into(),
            code,
            request,
            cause: None,
        }
    }

    /// Attach the low-level fault that triggered this classification.
    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The transport's numeric fault code.
    pub fn code(&self) -> i64 {
        self.code
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (transport fault {})", self.message, self.code)
    }
}

impl std::error::Error for NetworkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl WithRequest for NetworkError {
    fn request(&self) -> Option<&Arc<Request>> {
        Some(&self.request)
    }
}

/// A classified transport failure.
#[derive(Debug)]
pub enum Error {
    /// Local misconfiguration or environment failure.
    Client(ClientError),
    /// The request is structurally invalid for transport.
    Request(RequestError),
    /// The transport attempted the exchange and failed.
    Network(NetworkError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client(err) => write!(f, "Client error: {err}"),
            Self::Request(err) => write!(f, "Request error: {err}"),
            Self::Network(err) => write!(f, "Network error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let cause = match self {
            Self::Client(err) => err.cause.as_deref(),
            Self::Request(err) => err.cause.as_deref(),
            Self::Network(err) => err.cause.as_deref(),
        };
        cause.map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl WithRequest for Error {
    fn request(&self) -> Option<&Arc<Request>> {
        match self {
            Self::Client(err) => err.request(),
            Self::Request(err) => err.request(),
            Self::Network(err) => err.request(),
        }
    }
}

impl From<ClientError> for Error {
    fn from(err: ClientError) -> Self {
        Self::Client(err)
    }
}

impl From<RequestError> for Error {
    fn from(err: RequestError) -> Self {
        Self::Request(err)
    }
}

impl From<NetworkError> for Error {
    fn from(err: NetworkError) -> Self {
        Self::Network(err)
    }
}

/// A specialized Result type for transport operations.
pub type Result<T> = std::result::Result<T, Error>;
