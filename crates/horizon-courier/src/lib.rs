//! Horizon Courier: a synchronous HTTP transport client.
//!
//! The crate executes one abstract HTTP request against a live network
//! transport and hands back an abstract response — or a classified
//! failure that always names the request that caused it:
//!
//! - [`Client::send_request`] — preconditions, orchestration, one
//!   request/response cycle per invocation.
//! - [`options::translate`](translate) — maps the declarative request
//!   model onto the flat option set the transport call accepts; caller
//!   overrides win on key collision.
//! - [`ResponseAssembler`] — a streaming state machine fed one raw header
//!   line at a time by the transport, rebuilding the response
//!   incrementally.
//! - [`Error`] — every failure is exactly one of
//!   [`ClientError`] / [`RequestError`] / [`NetworkError`].
//!
//! # Example
//!
//! ```ignore
//! use horizon_courier::{Client, Request};
//!
//! let client = Client::new();
//!
//! let request = Request::builder()
//!     .method("GET")
//!     .uri("https://api.example.com/users".parse()?)
//!     .header("Accept", "application/json")
//!     .build();
//!
//! let response = client.send_request(request)?;
//! println!("Status: {} {}", response.status(), response.reason());
//! println!("Body: {} bytes", response.body_bytes().len());
//! ```
//!
//! # Overriding transport behavior
//!
//! The client owns no timeout, proxy or retry policy; transport behaviors
//! are forced through override options, which always win over what the
//! translator derives from the request:
//!
//! ```ignore
//! use std::time::Duration;
//! use horizon_courier::{Client, OptionValue, TransportOption};
//!
//! let client = Client::builder()
//!     .option(TransportOption::Timeout, OptionValue::Duration(Duration::from_secs(10)))
//!     .option(TransportOption::FollowRedirects, OptionValue::Bool(true))
//!     .build();
//! ```
//!
//! # Logging
//!
//! The crate is instrumented with the `tracing` crate; install a
//! subscriber such as `tracing_subscriber::fmt::init()` in the
//! application to see events under the `horizon_courier::*` targets.

mod assembler;
mod client;
mod error;
pub mod message;
mod options;
pub mod transport;

pub use assembler::{AssemblerState, ResponseAssembler};
pub use client::{Client, ClientBuilder};
pub use error::{Cause, ClientError, Error, NetworkError, RequestError, Result, WithRequest};
pub use message::{
    BodySink, BodyStream, HeaderMap, MemoryBody, MemorySink, Request, RequestBuilder, Response,
    ResponseFactory, ResponseMessage, ResponseSource,
};
pub use options::{translate, HttpVersion, OptionValue, TransportOption, TransportOptions};
pub use transport::{
    fault_codes, HeaderCallback, NativeTransport, NativeTransportBuilder, Transport,
    TransportFault,
};
