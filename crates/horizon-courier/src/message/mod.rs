//! Message model: requests, responses, bodies and headers.
//!
//! The client core consumes these types only through their interface
//! surface — the [`BodyStream`]/[`BodySink`] traits, the
//! [`ResponseMessage`] trait and the [`ResponseSource`] seam — so callers
//! can substitute their own message implementations. The concrete
//! [`Request`], [`Response`], [`MemoryBody`] and [`MemorySink`] types make
//! the crate usable out of the box.

mod body;
mod headers;
mod request;
mod response;

pub use body::{BodySink, BodyStream, MemoryBody, MemorySink};
pub use headers::HeaderMap;
pub use request::{Request, RequestBuilder};
pub use response::{Response, ResponseFactory, ResponseMessage, ResponseSource};
