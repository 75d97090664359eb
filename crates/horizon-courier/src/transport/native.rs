//! Transport implementation backed by the blocking native HTTP engine.

use http::header::{HeaderName, HeaderValue};
use http::Version;

use super::{fault_codes, HeaderCallback, Transport, TransportFault};
use crate::options::{HttpVersion, OptionValue, TransportOption, TransportOptions};

/// Builder for [`NativeTransport`].
#[derive(Clone, Debug)]
pub struct NativeTransportBuilder {
    remote_enabled: bool,
}

impl NativeTransportBuilder {
    /// Start from the default configuration: remote exchanges enabled.
    pub fn new() -> Self {
        Self {
            remote_enabled: true,
        }
    }

    /// Forbid remote exchanges entirely.
    ///
    /// A client using such a transport refuses every request with a
    /// classified client error before any connection attempt — the
    /// environment-level kill switch for sandboxed deployments.
    pub fn disable_remote(mut self) -> Self {
        self.remote_enabled = false;
        self
    }

    /// Build the transport.
    pub fn build(self) -> NativeTransport {
        NativeTransport {
            remote_enabled: self.remote_enabled,
        }
    }
}

impl Default for NativeTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The shipped [`Transport`] implementation.
///
/// Delegates the wire protocol — connection management, DNS, TLS,
/// redirect-following — to the blocking HTTP engine and adapts its
/// surface to the option-set/callback contract: the engine is configured
/// from the option set, its parsed response is replayed to the header
/// callback as a raw CRLF-terminated line stream, and engine failures are
/// mapped onto the [`fault_codes`] table.
///
/// One engine instance is built per `execute` call and dropped on every
/// exit path; connection reuse across calls is deliberately not this
/// layer's job.
#[derive(Clone, Debug)]
pub struct NativeTransport {
    remote_enabled: bool,
}

impl NativeTransport {
    /// A transport with the default configuration.
    pub fn new() -> Self {
        NativeTransportBuilder::new().build()
    }

    /// Start configuring a transport.
    pub fn builder() -> NativeTransportBuilder {
        NativeTransportBuilder::new()
    }
}

impl Default for NativeTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for NativeTransport {
    fn is_remote_enabled(&self) -> bool {
        self.remote_enabled
    }

    fn execute(
        &self,
        options: &TransportOptions,
        on_header_line: &mut HeaderCallback<'_>,
    ) -> Result<Vec<u8>, TransportFault> {
        let engine = build_engine(options)?;
        let request = build_request(&engine, options)?;

        tracing::debug!(
            target: "horizon_courier::transport",
            method = %request.method(),
            url = %request.url(),
            "Executing exchange"
        );

        let response = engine.execute(request).map_err(classify)?;

        feed_header_lines(&response, on_header_line)?;

        let content = response.bytes().map_err(classify)?;
        let return_transfer = options
            .get(TransportOption::ReturnTransfer)
            .and_then(OptionValue::as_bool)
            .unwrap_or(true);
        if return_transfer {
            Ok(content.to_vec())
        } else {
            Ok(Vec::new())
        }
    }
}

/// Configure a per-call engine instance from the option set.
fn build_engine(options: &TransportOptions) -> Result<reqwest::blocking::Client, TransportFault> {
    // No timeout policy is owned by this layer; the engine's default
    // timeout is switched off unless an override provides one.
    let mut builder = reqwest::blocking::Client::builder().timeout(None);

    if let Some(timeout) = options
        .get(TransportOption::Timeout)
        .and_then(OptionValue::as_duration)
    {
        builder = builder.timeout(timeout);
    }
    if let Some(timeout) = options
        .get(TransportOption::ConnectTimeout)
        .and_then(OptionValue::as_duration)
    {
        builder = builder.connect_timeout(timeout);
    }

    // Redirects are not followed unless an override asks for them.
    let follow = options
        .get(TransportOption::FollowRedirects)
        .and_then(OptionValue::as_bool)
        .unwrap_or(false);
    if follow {
        let max = options
            .get(TransportOption::MaxRedirects)
            .and_then(OptionValue::as_int)
            .unwrap_or(10);
        builder = builder.redirect(reqwest::redirect::Policy::limited(max.max(0) as usize));
    } else {
        builder = builder.redirect(reqwest::redirect::Policy::none());
    }

    if let Some(proxy_url) = options
        .get(TransportOption::Proxy)
        .and_then(OptionValue::as_str)
    {
        let proxy = reqwest::Proxy::all(proxy_url).map_err(|err| {
            TransportFault::new(fault_codes::FAILED_INIT, format!("invalid proxy: {err}"))
        })?;
        builder = builder.proxy(proxy);
    }

    if let Some(false) = options
        .get(TransportOption::TlsVerifyPeer)
        .and_then(OptionValue::as_bool)
    {
        builder = builder.danger_accept_invalid_certs(true);
    }

    if let Some(user_agent) = options
        .get(TransportOption::UserAgent)
        .and_then(OptionValue::as_str)
    {
        builder = builder.user_agent(user_agent.to_string());
    }

    // An absent negotiation flag turns automatic content decoding off;
    // the empty string leaves the engine free to offer what it supports.
    match options
        .get(TransportOption::AcceptEncoding)
        .and_then(OptionValue::as_str)
    {
        Some(_) => {}
        None => builder = builder.no_gzip(),
    }

    builder
        .build()
        .map_err(|err| TransportFault::new(fault_codes::FAILED_INIT, err.to_string()))
}

/// Assemble the engine request from the option set.
fn build_request(
    engine: &reqwest::blocking::Client,
    options: &TransportOptions,
) -> Result<reqwest::blocking::Request, TransportFault> {
    let method_str = options
        .get(TransportOption::Method)
        .and_then(OptionValue::as_str)
        .ok_or_else(|| TransportFault::new(fault_codes::FAILED_INIT, "method option missing"))?;
    let method = reqwest::Method::from_bytes(method_str.as_bytes()).map_err(|err| {
        TransportFault::new(
            fault_codes::FAILED_INIT,
            format!("invalid method {method_str:?}: {err}"),
        )
    })?;

    let url_str = options
        .get(TransportOption::Url)
        .and_then(OptionValue::as_str)
        .ok_or_else(|| TransportFault::new(fault_codes::FAILED_INIT, "url option missing"))?;
    let url = url::Url::parse(url_str)
        .map_err(|err| TransportFault::new(fault_codes::BAD_URL, format!("{url_str:?}: {err}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(TransportFault::new(
            fault_codes::UNSUPPORTED_PROTOCOL,
            format!("unsupported scheme {:?}", url.scheme()),
        ));
    }

    let mut builder = engine.request(method, url);

    if let Some(version) = options
        .get(TransportOption::HttpVersion)
        .and_then(OptionValue::as_version)
    {
        builder = builder.version(match version {
            HttpVersion::Http10 => Version::HTTP_10,
            HttpVersion::Http11 => Version::HTTP_11,
            HttpVersion::Http2 => Version::HTTP_2,
        });
    }

    if let Some(lines) = options
        .get(TransportOption::Headers)
        .and_then(OptionValue::as_list)
    {
        for line in lines {
            let (name, value) = line
                .split_once(':')
                .map(|(name, value)| (name.trim(), value.trim()))
                .unwrap_or((line.trim(), ""));
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => builder = builder.header(name, value),
                _ => {
                    tracing::warn!(
                        target: "horizon_courier::transport",
                        "Skipping header line the engine cannot carry: {line:?}"
                    );
                }
            }
        }
    }

    // A custom Accept-Encoding wish overrides the engine's negotiation.
    if let Some(encoding) = options
        .get(TransportOption::AcceptEncoding)
        .and_then(OptionValue::as_str)
    {
        if !encoding.is_empty() {
            if let Ok(value) = HeaderValue::from_str(encoding) {
                builder = builder.header(http::header::ACCEPT_ENCODING, value);
            }
        }
    }

    if let Some(body) = options
        .get(TransportOption::Body)
        .and_then(OptionValue::as_bytes)
    {
        if !body.is_empty() {
            builder = builder.body(body.to_vec());
        }
    }

    builder
        .build()
        .map_err(|err| TransportFault::new(fault_codes::FAILED_INIT, err.to_string()))
}

/// Replay the parsed response head as the raw header-line stream the
/// callback contract promises: status line, one line per header, blank
/// terminator, all CRLF-ended.
fn feed_header_lines(
    response: &reqwest::blocking::Response,
    on_header_line: &mut HeaderCallback<'_>,
) -> Result<(), TransportFault> {
    let protocol = match response.version() {
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/1.0",
    };
    let status = response.status();

    let mut lines = Vec::with_capacity(response.headers().len() + 2);
    match status.canonical_reason() {
        Some(reason) => lines.push(format!("{protocol} {} {reason}\r\n", status.as_u16())),
        None => lines.push(format!("{protocol} {}\r\n", status.as_u16())),
    }
    for (name, value) in response.headers() {
        let value = String::from_utf8_lossy(value.as_bytes());
        lines.push(format!("{name}: {value}\r\n"));
    }
    lines.push("\r\n".to_string());

    for line in lines {
        let consumed = on_header_line(line.as_bytes());
        if consumed != line.len() {
            return Err(TransportFault::new(
                fault_codes::ABORTED_BY_CALLBACK,
                format!(
                    "header callback consumed {consumed} of {} bytes",
                    line.len()
                ),
            ));
        }
    }
    Ok(())
}

/// Map an engine failure onto the numeric fault table.
fn classify(err: reqwest::Error) -> TransportFault {
    let code = if err.is_timeout() {
        fault_codes::OPERATION_TIMEDOUT
    } else if err.is_connect() {
        fault_codes::COULDNT_CONNECT
    } else if err.is_redirect() {
        fault_codes::TOO_MANY_REDIRECTS
    } else if err.is_builder() {
        fault_codes::FAILED_INIT
    } else if err.is_request() {
        fault_codes::SEND_ERROR
    } else {
        fault_codes::RECV_ERROR
    };
    TransportFault::new(code, err.to_string())
}
