//! The immutable request description handed to the client.

use std::fmt;
use std::sync::Arc;

use http::Uri;
use parking_lot::{Mutex, MutexGuard};

use super::body::BodyStream;
use super::headers::HeaderMap;

/// An abstract HTTP request: method, URI, protocol version, headers and
/// an optional body stream.
///
/// The request itself is an immutable value; only the body stream's
/// cursor moves when the translator rewinds and reads it. Requests are
/// shared into classified errors as [`Arc<Request>`] so a failure can
/// always name the request that caused it.
pub struct Request {
    method: String,
    uri: Uri,
    version: String,
    headers: HeaderMap,
    body: Option<Mutex<Box<dyn BodyStream + Send>>>,
}

impl Request {
    /// Start building a request. Defaults: `GET`, URI `/`, version `1.1`.
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// The request method, sent verbatim. May be empty, which is a
    /// precondition failure at send time rather than a construction error.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The target URI.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The protocol version string, e.g. `"1.1"` or `"2"`.
    pub fn protocol_version(&self) -> &str {
        &self.version
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Exclusive access to the body stream, if one is present.
    pub fn body(&self) -> Option<MutexGuard<'_, Box<dyn BodyStream + Send>>> {
        self.body.as_ref().map(Mutex::lock)
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("version", &self.version)
            .field("headers", &self.headers)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// Builder for [`Request`] values.
pub struct RequestBuilder {
    method: String,
    uri: Uri,
    version: String,
    headers: HeaderMap,
    body: Option<Box<dyn BodyStream + Send>>,
}

impl RequestBuilder {
    fn new() -> Self {
        Self {
            method: "GET".to_string(),
            uri: Uri::from_static("/"),
            version: "1.1".to_string(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Set the request method. The string is not validated here.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Set the target URI.
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = uri;
        self
    }

    /// Set the protocol version string.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Add a header value, keeping values already recorded under the name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Attach a body stream.
    pub fn body(mut self, body: impl BodyStream + Send + 'static) -> Self {
        self.body = Some(Box::new(body));
        self
    }

    /// Finish building the request.
    pub fn build(self) -> Request {
        Request {
            method: self.method,
            uri: self.uri,
            version: self.version,
            headers: self.headers,
            body: self.body.map(Mutex::new),
        }
    }

    /// Finish building and wrap the request for sharing.
    pub fn build_shared(self) -> Arc<Request> {
        Arc::new(self.build())
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
