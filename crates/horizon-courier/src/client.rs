//! The send-request orchestration: preconditions, option translation,
//! transport execution and failure classification.

use std::fmt;
use std::sync::Arc;

use crate::assembler::ResponseAssembler;
use crate::error::{ClientError, Error, NetworkError, RequestError, Result};
use crate::message::{Request, Response, ResponseFactory, ResponseMessage, ResponseSource};
use crate::options::{self, OptionValue, TransportOption, TransportOptions};
use crate::transport::{NativeTransport, Transport};

/// Builder for [`Client`].
pub struct ClientBuilder<R: ResponseMessage = Response, T: Transport = NativeTransport> {
    transport: T,
    response_source: ResponseSource<R>,
    overrides: TransportOptions,
}

impl ClientBuilder {
    /// Start from the defaults: the native transport and the concrete
    /// [`Response`] type.
    pub fn new() -> Self {
        Self {
            transport: NativeTransport::new(),
            response_source: ResponseSource::default(),
            overrides: TransportOptions::new(),
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ResponseMessage, T: Transport> ClientBuilder<R, T> {
    /// Use a different transport implementation.
    pub fn transport<T2: Transport>(self, transport: T2) -> ClientBuilder<R, T2> {
        ClientBuilder {
            transport,
            response_source: self.response_source,
            overrides: self.overrides,
        }
    }

    /// Use a different response source.
    pub fn response_source<R2: ResponseMessage>(
        self,
        source: ResponseSource<R2>,
    ) -> ClientBuilder<R2, T> {
        ClientBuilder {
            transport: self.transport,
            response_source: source,
            overrides: self.overrides,
        }
    }

    /// Clone `prototype` as the initial response value of every request.
    pub fn response_prototype<R2: ResponseMessage>(self, prototype: R2) -> ClientBuilder<R2, T> {
        self.response_source(ResponseSource::Prototype(prototype))
    }

    /// Invoke `factory` once per request for the initial response value.
    pub fn response_factory<R2: ResponseMessage>(
        self,
        factory: impl ResponseFactory<R2> + Send + Sync + 'static,
    ) -> ClientBuilder<R2, T> {
        self.response_source(ResponseSource::Factory(Box::new(factory)))
    }

    /// Set one transport override option.
    ///
    /// Overrides are applied after the options translated from the
    /// request and win on key collision — the mechanism for forcing
    /// transport behaviors (timeouts, proxy, TLS verification) the
    /// translator does not itself expose.
    pub fn option(mut self, key: TransportOption, value: OptionValue) -> Self {
        self.overrides.set(key, value);
        self
    }

    /// Merge a whole override option set.
    pub fn options(mut self, overrides: &TransportOptions) -> Self {
        self.overrides.merge(overrides);
        self
    }

    /// Build the client.
    pub fn build(self) -> Client<R, T> {
        Client {
            transport: self.transport,
            response_source: self.response_source,
            overrides: self.overrides,
        }
    }
}

/// A synchronous HTTP transport client.
///
/// Performs exactly one request/response cycle per
/// [`send_request`](Client::send_request) invocation, blocking the
/// calling thread until the exchange completes or fails. Every failure
/// is classified (see [`Error`]); nothing escapes unclassified.
///
/// # Example
///
/// ```ignore
/// use horizon_courier::{Client, Request};
///
/// let client = Client::new();
/// let request = Request::builder()
///     .method("GET")
///     .uri("https://api.example.com/data".parse()?)
///     .header("Accept", "application/json")
///     .build();
///
/// let response = client.send_request(request)?;
/// println!("Status: {}", response.status());
/// ```
pub struct Client<R: ResponseMessage = Response, T: Transport = NativeTransport> {
    transport: T,
    response_source: ResponseSource<R>,
    overrides: TransportOptions,
}

impl Client {
    /// A client with the default configuration.
    pub fn new() -> Self {
        ClientBuilder::new().build()
    }

    /// Start configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ResponseMessage, T: Transport> Client<R, T> {
    /// The configured override options.
    pub fn overrides(&self) -> &TransportOptions {
        &self.overrides
    }

    /// The configured transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute one request/response cycle.
    ///
    /// Preconditions are checked in a fixed order — transport capability,
    /// then URI host, then method — before any transport work happens.
    /// The transport call then runs with a per-call assembler wired as
    /// its header callback; a transport fault classifies as
    /// [`NetworkError`], a body-attachment failure as [`ClientError`].
    pub fn send_request(&self, request: impl Into<Arc<Request>>) -> Result<R> {
        let request = request.into();

        if !self.transport.is_remote_enabled() {
            return Err(Error::Client(ClientError::new(
                "Remote transfers are disabled on this transport",
            )));
        }

        if request.uri().host().is_none_or(str::is_empty) {
            return Err(Error::Request(RequestError::new(
                "Host is missing from the URI",
                Arc::clone(&request),
            )));
        }

        if request.method().is_empty() {
            return Err(Error::Request(RequestError::new(
                "Request method is missing",
                Arc::clone(&request),
            )));
        }

        let initial = self.response_source.instantiate();
        let options = options::translate(&request, &self.overrides)?;

        tracing::debug!(
            target: "horizon_courier::client",
            method = %request.method(),
            uri = %request.uri(),
            "Sending request"
        );

        let mut assembler = ResponseAssembler::new(initial);
        let outcome = {
            let mut on_header = |line: &[u8]| assembler.on_header_line(line);
            self.transport.execute(&options, &mut on_header)
        };

        match outcome {
            Ok(content) => assembler
                .attach_body(&content)
                .map_err(|err| Error::Client(err.with_request(Arc::clone(&request)))),
            Err(fault) => Err(Error::Network(NetworkError::new(
                fault.message,
                fault.code,
                Arc::clone(&request),
            ))),
        }
    }
}

impl<R: ResponseMessage, T: Transport + fmt::Debug> fmt::Debug for Client<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("transport", &self.transport)
            .field("response_source", &self.response_source)
            .field("overrides", &self.overrides)
            .finish()
    }
}
