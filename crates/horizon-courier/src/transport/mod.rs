//! The transport boundary: option set in, header lines and body out.
//!
//! A [`Transport`] performs one socket-level HTTP exchange described by a
//! [`TransportOptions`] set. The wire protocol — framing, connection
//! management, DNS, TLS, redirects — lives entirely inside the transport;
//! this crate only negotiates the option and callback surface. The
//! shipped implementation is [`NativeTransport`].

mod native;

use std::fmt;

use crate::options::TransportOptions;

pub use native::{NativeTransport, NativeTransportBuilder};

/// Numeric fault codes a transport reports.
///
/// The numbering follows libcurl's error table so the codes stay
/// meaningful to operators correlating logs across layers. A transport
/// implementation may use any subset.
pub mod fault_codes {
    /// The option set requested a protocol the transport cannot speak.
    pub const UNSUPPORTED_PROTOCOL: i64 = 1;
    /// The transport could not be initialized from the option set.
    pub const FAILED_INIT: i64 = 2;
    /// The target URL did not parse.
    pub const BAD_URL: i64 = 3;
    /// Host name resolution failed.
    pub const COULDNT_RESOLVE_HOST: i64 = 6;
    /// The connection could not be established.
    pub const COULDNT_CONNECT: i64 = 7;
    /// The exchange exceeded its time budget.
    pub const OPERATION_TIMEDOUT: i64 = 28;
    /// TLS negotiation failed.
    pub const SSL_CONNECT_ERROR: i64 = 35;
    /// A callback returned a short count, aborting the transfer.
    pub const ABORTED_BY_CALLBACK: i64 = 42;
    /// The transport gave up after too many redirects.
    pub const TOO_MANY_REDIRECTS: i64 = 47;
    /// Sending request data failed mid-transfer.
    pub const SEND_ERROR: i64 = 55;
    /// Receiving response data failed mid-transfer.
    pub const RECV_ERROR: i64 = 56;
}

/// A failed transport call: numeric fault code plus the transport's own
/// message. The classifier turns this into a
/// [`NetworkError`](crate::NetworkError).
#[derive(Clone, Debug)]
pub struct TransportFault {
    /// One of the [`fault_codes`] constants, never zero.
    pub code: i64,
    /// The transport's human-readable description of the failure.
    pub message: String,
}

impl TransportFault {
    /// Create a fault from a code/message pair.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport fault {}: {}", self.code, self.message)
    }
}

impl std::error::Error for TransportFault {}

/// Callback receiving each raw header line; returns the bytes consumed.
///
/// Returning less than the full line length tells the transport to treat
/// the transfer as aborted.
pub type HeaderCallback<'a> = dyn FnMut(&[u8]) -> usize + 'a;

/// A facility that can execute one HTTP exchange described by an option
/// set.
///
/// Implementations are invoked synchronously; the header callback is
/// called reentrantly from inside `execute`, once per raw header line in
/// the exact order received. The transport handle backing a call must be
/// scoped to that call and released on every exit path.
pub trait Transport {
    /// Whether the environment permits remote exchanges at all.
    ///
    /// When this returns `false` the client refuses to send before
    /// touching the request — the failure is environmental, not
    /// request-specific.
    fn is_remote_enabled(&self) -> bool {
        true
    }

    /// Execute the exchange, feeding each raw header line through
    /// `on_header_line` and returning the response body bytes.
    fn execute(
        &self,
        options: &TransportOptions,
        on_header_line: &mut HeaderCallback<'_>,
    ) -> Result<Vec<u8>, TransportFault>;
}
