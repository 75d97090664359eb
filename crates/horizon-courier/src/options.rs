//! Translation of a request description into the transport's option set.
//!
//! The translator is a leaf component: it reads the request (and rewinds
//! its body stream, the one observable side effect), produces the flat
//! option set the transport call accepts, and applies caller-supplied
//! overrides last so they win on key collision.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::error::{RequestError, Result};
use crate::message::{HeaderMap, Request};

/// Protocol versions the option set can ask the transport to negotiate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpVersion {
    /// HTTP/1.0
    Http10,
    /// HTTP/1.1
    Http11,
    /// HTTP/2
    Http2,
}

impl HttpVersion {
    /// Map a protocol-version string onto a transport version.
    ///
    /// `"2"` and `"2.0"` select HTTP/2 and `"1.1"` selects HTTP/1.1 after
    /// trimming whitespace; every other value falls back to HTTP/1.0. The
    /// permissive fallback is deliberate: unrecognized versions degrade
    /// instead of failing.
    pub fn from_protocol_version(version: &str) -> Self {
        match version.trim() {
            "2" | "2.0" => Self::Http2,
            "1.1" => Self::Http11,
            _ => Self::Http10,
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http10 => write!(f, "HTTP/1.0"),
            Self::Http11 => write!(f, "HTTP/1.1"),
            Self::Http2 => write!(f, "HTTP/2"),
        }
    }
}

/// Keys of the flat option set a transport call accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportOption {
    /// Request method, sent verbatim.
    Method,
    /// Absolute target URL.
    Url,
    /// Protocol version to negotiate.
    HttpVersion,
    /// Raw request body bytes.
    Body,
    /// Pre-formatted `Name: value` header lines.
    Headers,
    /// Whether the transport returns the response body to the caller.
    ReturnTransfer,
    /// Content-encoding negotiation; the empty string lets the transport
    /// offer everything it supports.
    AcceptEncoding,
    /// Overall time budget for the exchange.
    Timeout,
    /// Time budget for establishing the connection.
    ConnectTimeout,
    /// Proxy URL routing the exchange.
    Proxy,
    /// Whether TLS peer certificates are verified.
    TlsVerifyPeer,
    /// Whether the transport follows redirects on its own.
    FollowRedirects,
    /// Upper bound on followed redirects.
    MaxRedirects,
    /// User-Agent sent when the request headers do not name one.
    UserAgent,
}

/// Values the option set can carry.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    /// A boolean flag.
    Bool(bool),
    /// An integer quantity.
    Int(i64),
    /// A string value.
    Str(String),
    /// A raw byte payload.
    Bytes(Bytes),
    /// A list of pre-formatted lines.
    List(Vec<String>),
    /// A protocol version.
    Version(HttpVersion),
    /// A time budget.
    Duration(Duration),
}

impl OptionValue {
    /// The boolean behind this value, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The integer behind this value, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// The string behind this value, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// The byte payload behind this value, if it is one.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(value) => Some(value),
            _ => None,
        }
    }

    /// The line list behind this value, if it is one.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(value) => Some(value),
            _ => None,
        }
    }

    /// The protocol version behind this value, if it is one.
    pub fn as_version(&self) -> Option<HttpVersion> {
        match self {
            Self::Version(value) => Some(*value),
            _ => None,
        }
    }

    /// The duration behind this value, if it is one.
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Duration(value) => Some(*value),
            _ => None,
        }
    }
}

/// The flat option set handed to a transport call.
///
/// Built per call and discarded afterwards. Merging applies the other
/// set's entries last, so caller overrides win on key collision.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransportOptions {
    entries: HashMap<TransportOption, OptionValue>,
}

impl TransportOptions {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one option, replacing any previous value under the key.
    pub fn set(&mut self, key: TransportOption, value: OptionValue) -> &mut Self {
        self.entries.insert(key, value);
        self
    }

    /// Read one option.
    pub fn get(&self, key: TransportOption) -> Option<&OptionValue> {
        self.entries.get(&key)
    }

    /// Apply every entry of `overrides` on top of this set.
    pub fn merge(&mut self, overrides: &TransportOptions) {
        for (key, value) in &overrides.entries {
            self.entries.insert(*key, value.clone());
        }
    }

    /// Number of options set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no option is set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (TransportOption, &OptionValue)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }
}

/// Build the option set for `request`, then apply `overrides` on top.
///
/// Method and URI pass through verbatim; the protocol version is mapped
/// with [`HttpVersion::from_protocol_version`]; headers are flattened to
/// one `Name: v1, v2` line per name; a readable, seekable, non-empty body
/// is rewound and read fully. A body read failure is a
/// [`RequestError`](crate::RequestError) — it reflects a malformed
/// request, not a transport fault.
pub fn translate(request: &Arc<Request>, overrides: &TransportOptions) -> Result<TransportOptions> {
    let mut options = TransportOptions::new();
    options.set(
        TransportOption::Method,
        OptionValue::Str(request.method().to_string()),
    );
    options.set(
        TransportOption::Url,
        OptionValue::Str(request.uri().to_string()),
    );
    options.set(
        TransportOption::HttpVersion,
        OptionValue::Version(HttpVersion::from_protocol_version(
            request.protocol_version(),
        )),
    );
    options.set(TransportOption::Body, OptionValue::Bytes(read_body(request)?));
    options.set(
        TransportOption::Headers,
        OptionValue::List(flatten_headers(request.headers())),
    );
    options.set(TransportOption::ReturnTransfer, OptionValue::Bool(true));
    options.set(
        TransportOption::AcceptEncoding,
        OptionValue::Str(String::new()),
    );

    options.merge(overrides);
    Ok(options)
}

/// One `Name: v1, v2` line per header name, in map iteration order.
fn flatten_headers(headers: &HeaderMap) -> Vec<String> {
    headers
        .iter()
        .map(|(name, values)| format!("{name}: {}", values.join(", ")))
        .collect()
}

/// The effective post-field payload for the request.
///
/// Only a present, readable, seekable body of known non-zero size is
/// consumed; everything else yields an empty payload. The stream is
/// rewound to position zero first — an observable cursor move.
fn read_body(request: &Arc<Request>) -> Result<Bytes> {
    let Some(mut stream) = request.body() else {
        return Ok(Bytes::new());
    };

    if !stream.is_readable() || !stream.is_seekable() || stream.size().unwrap_or(0) == 0 {
        return Ok(Bytes::new());
    }

    let mut buffer = Vec::new();
    stream
        .rewind()
        .and_then(|()| stream.read_to_end(&mut buffer))
        .map_err(|err| {
            RequestError::new("Unable to read request body", Arc::clone(request)).with_cause(err)
        })?;

    Ok(Bytes::from(buffer))
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::message::{BodyStream, MemoryBody};

    #[test]
    fn version_lookup_is_exact_after_trimming() {
        assert_eq!(HttpVersion::from_protocol_version("2"), HttpVersion::Http2);
        assert_eq!(
            HttpVersion::from_protocol_version("2.0"),
            HttpVersion::Http2
        );
        assert_eq!(
            HttpVersion::from_protocol_version(" 1.1 "),
            HttpVersion::Http11
        );
        assert_eq!(
            HttpVersion::from_protocol_version("\t2.0\n"),
            HttpVersion::Http2
        );
    }

    #[test]
    fn unrecognized_versions_fall_back_to_1_0() {
        for version in ["3", "1.2", "0.9", "", "http/1.1", "two"] {
            assert_eq!(
                HttpVersion::from_protocol_version(version),
                HttpVersion::Http10,
                "version {version:?} must fall back to HTTP/1.0"
            );
        }
    }

    #[test]
    fn method_and_url_pass_through() {
        let request = Request::builder()
            .method("PATCH")
            .uri("http://example.com/things/1".parse().expect("valid uri"))
            .build_shared();
        let options = translate(&request, &TransportOptions::new()).expect("translate failed");

        assert_eq!(
            options.get(TransportOption::Method).and_then(OptionValue::as_str),
            Some("PATCH")
        );
        assert_eq!(
            options.get(TransportOption::Url).and_then(OptionValue::as_str),
            Some("http://example.com/things/1")
        );
    }

    #[test]
    fn headers_flatten_to_joined_lines() {
        let request = Request::builder()
            .uri("http://example.com/".parse().expect("valid uri"))
            .header("Accept", "text/html")
            .header("X-Tag", "a")
            .header("X-Tag", "b")
            .build_shared();
        let options = translate(&request, &TransportOptions::new()).expect("translate failed");

        let lines = options
            .get(TransportOption::Headers)
            .and_then(OptionValue::as_list)
            .expect("header lines missing");
        assert_eq!(lines, ["Accept: text/html", "X-Tag: a, b"]);
    }

    #[test]
    fn body_is_rewound_and_read_fully() {
        let mut body = MemoryBody::new(b"payload".to_vec());
        body.set_position(4);

        let request = Request::builder()
            .method("POST")
            .uri("http://example.com/".parse().expect("valid uri"))
            .body(body)
            .build_shared();
        let options = translate(&request, &TransportOptions::new()).expect("translate failed");

        assert_eq!(
            options
                .get(TransportOption::Body)
                .and_then(OptionValue::as_bytes)
                .map(|bytes| bytes.as_ref()),
            Some(&b"payload"[..])
        );
    }

    #[test]
    fn empty_body_yields_empty_payload() {
        let request = Request::builder()
            .method("POST")
            .uri("http://example.com/".parse().expect("valid uri"))
            .body(MemoryBody::new(Vec::new()))
            .build_shared();
        let options = translate(&request, &TransportOptions::new()).expect("translate failed");

        assert_eq!(
            options
                .get(TransportOption::Body)
                .and_then(OptionValue::as_bytes)
                .map(|bytes| bytes.len()),
            Some(0)
        );
    }

    struct UnreadableBody;

    impl BodyStream for UnreadableBody {
        fn is_readable(&self) -> bool {
            false
        }

        fn is_seekable(&self) -> bool {
            true
        }

        fn size(&self) -> Option<u64> {
            Some(10)
        }

        fn rewind(&mut self) -> io::Result<()> {
            Ok(())
        }

        fn read_to_end(&mut self, _buf: &mut Vec<u8>) -> io::Result<usize> {
            Err(io::Error::other("not readable"))
        }
    }

    #[test]
    fn unreadable_body_is_skipped_not_an_error() {
        let request = Request::builder()
            .method("POST")
            .uri("http://example.com/".parse().expect("valid uri"))
            .body(UnreadableBody)
            .build_shared();
        let options = translate(&request, &TransportOptions::new()).expect("translate failed");

        assert_eq!(
            options
                .get(TransportOption::Body)
                .and_then(OptionValue::as_bytes)
                .map(|bytes| bytes.len()),
            Some(0)
        );
    }

    struct FailingBody;

    impl BodyStream for FailingBody {
        fn is_readable(&self) -> bool {
            true
        }

        fn is_seekable(&self) -> bool {
            true
        }

        fn size(&self) -> Option<u64> {
            Some(10)
        }

        fn rewind(&mut self) -> io::Result<()> {
            Ok(())
        }

        fn read_to_end(&mut self, _buf: &mut Vec<u8>) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn body_read_failure_is_a_request_error() {
        let request = Request::builder()
            .method("POST")
            .uri("http://example.com/".parse().expect("valid uri"))
            .body(FailingBody)
            .build_shared();

        let err = translate(&request, &TransportOptions::new())
            .expect_err("read failure must surface");
        match err {
            crate::Error::Request(err) => {
                assert_eq!(err.message(), "Unable to read request body");
            }
            other => panic!("expected RequestError, got {other:?}"),
        }
    }

    #[test]
    fn overrides_win_on_key_collision() {
        let request = Request::builder()
            .method("GET")
            .uri("http://example.com/".parse().expect("valid uri"))
            .build_shared();

        let mut overrides = TransportOptions::new();
        overrides.set(
            TransportOption::Method,
            OptionValue::Str("REPORT".to_string()),
        );
        overrides.set(
            TransportOption::Timeout,
            OptionValue::Duration(Duration::from_secs(3)),
        );

        let options = translate(&request, &overrides).expect("translate failed");
        assert_eq!(
            options.get(TransportOption::Method).and_then(OptionValue::as_str),
            Some("REPORT")
        );
        assert_eq!(
            options
                .get(TransportOption::Timeout)
                .and_then(OptionValue::as_duration),
            Some(Duration::from_secs(3))
        );
    }

    #[test]
    fn baseline_flags_are_always_set() {
        let request = Request::builder()
            .uri("http://example.com/".parse().expect("valid uri"))
            .build_shared();
        let options = translate(&request, &TransportOptions::new()).expect("translate failed");

        assert_eq!(
            options
                .get(TransportOption::ReturnTransfer)
                .and_then(OptionValue::as_bool),
            Some(true)
        );
        assert_eq!(
            options
                .get(TransportOption::AcceptEncoding)
                .and_then(OptionValue::as_str),
            Some("")
        );
    }
}
