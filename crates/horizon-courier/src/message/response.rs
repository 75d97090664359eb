//! Response values assembled from the transport's header stream.

use std::fmt;
use std::io;

use bytes::Bytes;

use super::body::{BodySink, MemorySink};
use super::headers::HeaderMap;

/// A response that mutates by replacement.
///
/// `with_status` and `with_header` each return an updated value instead of
/// mutating in place; the assembler threads the latest version forward and
/// hands it out only once the body has been attached. Implementations are
/// value objects, hence the `Clone` requirement.
pub trait ResponseMessage: Clone {
    /// Replace the status code and reason phrase.
    #[must_use]
    fn with_status(self, code: u16, reason: &str) -> Self;

    /// Add `value` under `name`, keeping values already recorded there.
    #[must_use]
    fn with_header(self, name: &str, value: &str) -> Self;

    /// Write the response body into the underlying sink.
    fn write_body(&mut self, content: &[u8]) -> io::Result<()>;
}

/// The concrete response shipped with this crate.
pub struct Response {
    status: u16,
    reason: String,
    headers: HeaderMap,
    sink: Box<dyn BodySink + Send>,
}

impl Response {
    /// An empty `200 OK` response writing its body into memory.
    pub fn new() -> Self {
        Self::with_sink(Box::new(MemorySink::new()))
    }

    /// An empty `200 OK` response writing its body into `sink`.
    pub fn with_sink(sink: Box<dyn BodySink + Send>) -> Self {
        Self {
            status: 200,
            reason: "OK".to_string(),
            headers: HeaderMap::new(),
            sink,
        }
    }

    /// The status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The reason phrase.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The body bytes written so far.
    pub fn body_bytes(&self) -> Bytes {
        self.sink.contents()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Response {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            reason: self.reason.clone(),
            headers: self.headers.clone(),
            sink: self.sink.clone_sink(),
        }
    }
}

impl ResponseMessage for Response {
    fn with_status(mut self, code: u16, reason: &str) -> Self {
        self.status = code;
        self.reason = reason.to_string();
        self
    }

    fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.append(name, value);
        self
    }

    fn write_body(&mut self, content: &[u8]) -> io::Result<()> {
        if !self.sink.is_writable() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "response body sink is not writable",
            ));
        }
        self.sink.write_all(content)
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("reason", &self.reason)
            .field("headers", &self.headers)
            .finish()
    }
}

/// Creates the initial response value for a request.
pub trait ResponseFactory<R: ResponseMessage> {
    /// Produce a fresh response; called once per request.
    fn create_response(&self) -> R;
}

impl<R: ResponseMessage, F> ResponseFactory<R> for F
where
    F: Fn() -> R,
{
    fn create_response(&self) -> R {
        self()
    }
}

/// Where the client obtains the initial response value for each request.
///
/// The two variants model the same capability: either a prototype value
/// cloned per request, or a factory invoked per request. The client
/// resolves the variant once at call start.
pub enum ResponseSource<R: ResponseMessage> {
    /// A prototype value cloned for each request.
    Prototype(R),
    /// A factory invoked once per request.
    Factory(Box<dyn ResponseFactory<R> + Send + Sync>),
}

impl<R: ResponseMessage> ResponseSource<R> {
    /// Produce the initial response value for one request.
    pub fn instantiate(&self) -> R {
        match self {
            Self::Prototype(prototype) => prototype.clone(),
            Self::Factory(factory) => factory.create_response(),
        }
    }
}

impl Default for ResponseSource<Response> {
    fn default() -> Self {
        Self::Prototype(Response::new())
    }
}

impl<R: ResponseMessage> fmt::Debug for ResponseSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prototype(_) => f.write_str("ResponseSource::Prototype"),
            Self::Factory(_) => f.write_str("ResponseSource::Factory"),
        }
    }
}
