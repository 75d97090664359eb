//! Incremental reconstruction of a response from raw header lines.
//!
//! The transport invokes [`ResponseAssembler::on_header_line`] once per
//! line of the raw response header block, in the exact order received.
//! The transport does not validate line framing or ordering, so the
//! assembler tolerates blank separators, repeated status lines and
//! malformed input without aborting the transfer.

use std::io;

use crate::error::ClientError;
use crate::message::ResponseMessage;

/// Parse states for the header-line stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssemblerState {
    /// No status line has been seen yet.
    AwaitingStatusLine,
    /// A status line was recorded; header lines accumulate.
    AccumulatingHeaders,
}

/// Streaming consumer of the transport's raw header-line callback.
///
/// The assembler owns the response value being built and rebinds it on
/// every replacement-style mutation, handing it out only once the body
/// has been attached. Each call gets its own assembler; the state is
/// never shared between concurrent invocations.
pub struct ResponseAssembler<R: ResponseMessage> {
    response: Option<R>,
    state: AssemblerState,
}

impl<R: ResponseMessage> ResponseAssembler<R> {
    /// Wrap the initial response value obtained from the response source.
    pub fn new(initial: R) -> Self {
        Self {
            response: Some(initial),
            state: AssemblerState::AwaitingStatusLine,
        }
    }

    /// The current parse state.
    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Consume one raw header line, returning the number of bytes handled.
    ///
    /// The return value is always the full length of `raw`, whether the
    /// line had any effect or not; a shorter count tells the transport to
    /// treat the transfer as aborted.
    pub fn on_header_line(&mut self, raw: &[u8]) -> usize {
        let line = String::from_utf8_lossy(raw);
        let trimmed = line.trim();

        if trimmed.is_empty() {
            // Separator between informational blocks, or before the body.
            return raw.len();
        }

        if trimmed.starts_with("HTTP/") {
            self.apply_status_line(trimmed);
        } else {
            self.apply_header_line(trimmed);
        }

        raw.len()
    }

    /// Record a status line, replacing any status seen earlier.
    ///
    /// Transports deliver one status line per header block, so redirects
    /// and `100 Continue` exchanges produce several sightings; the last
    /// one wins by virtue of being applied last.
    fn apply_status_line(&mut self, line: &str) {
        let mut tokens = line.split(' ');
        let _protocol = tokens.next();
        let Some(code) = tokens.next().and_then(|token| token.parse::<u16>().ok()) else {
            tracing::warn!(
                target: "horizon_courier::assembler",
                "Discarding malformed status line: {line:?}"
            );
            return;
        };
        let reason = tokens.collect::<Vec<_>>().join(" ");

        if let Some(response) = self.response.take() {
            self.response = Some(response.with_status(code, &reason));
        }
        self.state = AssemblerState::AccumulatingHeaders;
    }

    /// Record a header line, adding to any values seen under the name.
    fn apply_header_line(&mut self, line: &str) {
        let (name, value) = match line.split_once(':') {
            Some((name, value)) => (name.trim(), value.trim()),
            None => (line, ""),
        };

        if let Some(response) = self.response.take() {
            self.response = Some(response.with_header(name, value));
        }
    }

    /// Attach the accumulated body bytes and hand out the finished response.
    ///
    /// A write failure means the response container supplied by the caller
    /// is broken — the network did its job — so it classifies as a
    /// [`ClientError`].
    pub fn attach_body(mut self, content: &[u8]) -> Result<R, ClientError> {
        let mut response = self
            .response
            .take()
            .expect("assembler holds the response until finalization");
        response.write_body(content).map_err(|err: io::Error| {
            ClientError::new("Unable to write response body, check body is writable")
                .with_cause(err)
        })?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Response;

    fn feed(assembler: &mut ResponseAssembler<Response>, lines: &[&str]) {
        for line in lines {
            let consumed = assembler.on_header_line(line.as_bytes());
            assert_eq!(consumed, line.len(), "line {line:?} must be fully consumed");
        }
    }

    #[test]
    fn assembles_status_and_headers_in_order() {
        let mut assembler = ResponseAssembler::new(Response::new());
        feed(
            &mut assembler,
            &[
                "HTTP/1.1 200 OK\r\n",
                "Content-Type: text/plain\r\n",
                "X-Foo: a\r\n",
                "X-Foo: b\r\n",
                "\r\n",
            ],
        );

        let response = assembler.attach_body(b"").expect("attach failed");
        assert_eq!(response.status(), 200);
        assert_eq!(response.reason(), "OK");
        assert_eq!(
            response.headers().get("Content-Type"),
            Some(&["text/plain".to_string()][..])
        );
        assert_eq!(
            response.headers().get("X-Foo"),
            Some(&["a".to_string(), "b".to_string()][..])
        );
    }

    #[test]
    fn last_status_line_wins() {
        let mut assembler = ResponseAssembler::new(Response::new());
        feed(
            &mut assembler,
            &[
                "HTTP/1.1 100 Continue\r\n",
                "\r\n",
                "HTTP/1.1 200 OK\r\n",
                "\r\n",
            ],
        );

        let response = assembler.attach_body(b"").expect("attach failed");
        assert_eq!(response.status(), 200);
        assert_eq!(response.reason(), "OK");
    }

    #[test]
    fn multi_word_reason_phrase_is_rejoined() {
        let mut assembler = ResponseAssembler::new(Response::new());
        feed(&mut assembler, &["HTTP/1.1 404 Not Found\r\n"]);

        let response = assembler.attach_body(b"").expect("attach failed");
        assert_eq!(response.status(), 404);
        assert_eq!(response.reason(), "Not Found");
    }

    #[test]
    fn status_line_without_reason_yields_empty_phrase() {
        let mut assembler = ResponseAssembler::new(Response::new());
        feed(&mut assembler, &["HTTP/2 204\r\n"]);

        let response = assembler.attach_body(b"").expect("attach failed");
        assert_eq!(response.status(), 204);
        assert_eq!(response.reason(), "");
    }

    #[test]
    fn blank_lines_are_consumed_without_effect() {
        let mut assembler = ResponseAssembler::new(Response::new());
        assert_eq!(assembler.on_header_line(b"\r\n"), 2);
        assert_eq!(assembler.on_header_line(b"   \r\n"), 5);
        assert_eq!(assembler.state(), AssemblerState::AwaitingStatusLine);
    }

    #[test]
    fn malformed_status_line_is_ignored() {
        let mut assembler = ResponseAssembler::new(Response::new());
        feed(
            &mut assembler,
            &["HTTP/1.1 banana\r\n", "HTTP/1.1 503 Service Unavailable\r\n"],
        );

        let response = assembler.attach_body(b"").expect("attach failed");
        assert_eq!(response.status(), 503);
        assert_eq!(response.reason(), "Service Unavailable");
    }

    #[test]
    fn header_value_keeps_embedded_colons() {
        let mut assembler = ResponseAssembler::new(Response::new());
        feed(
            &mut assembler,
            &[
                "HTTP/1.1 200 OK\r\n",
                "Location: http://example.com:8080/next\r\n",
            ],
        );

        let response = assembler.attach_body(b"").expect("attach failed");
        assert_eq!(
            response.headers().get("Location"),
            Some(&["http://example.com:8080/next".to_string()][..])
        );
    }

    #[test]
    fn header_line_without_colon_gets_empty_value() {
        let mut assembler = ResponseAssembler::new(Response::new());
        feed(&mut assembler, &["HTTP/1.1 200 OK\r\n", "X-Strange\r\n"]);

        let response = assembler.attach_body(b"").expect("attach failed");
        assert_eq!(
            response.headers().get("X-Strange"),
            Some(&["".to_string()][..])
        );
    }

    #[test]
    fn state_transitions_on_first_status_line() {
        let mut assembler = ResponseAssembler::new(Response::new());
        assert_eq!(assembler.state(), AssemblerState::AwaitingStatusLine);
        assembler.on_header_line(b"HTTP/1.1 200 OK\r\n");
        assert_eq!(assembler.state(), AssemblerState::AccumulatingHeaders);
    }

    #[test]
    fn body_is_written_into_the_sink() {
        let mut assembler = ResponseAssembler::new(Response::new());
        feed(&mut assembler, &["HTTP/1.1 200 OK\r\n", "\r\n"]);

        let response = assembler.attach_body(b"hello body").expect("attach failed");
        assert_eq!(response.body_bytes().as_ref(), b"hello body");
    }
}
