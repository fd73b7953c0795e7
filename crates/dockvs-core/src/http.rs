//! Blocking HTTP GET over libcurl.
//!
//! Small bodies (latest-version text, catalogs) are collected in memory.
//! Archives are pushed chunk by chunk into a caller-provided sink so the
//! whole body is never buffered.

use std::cell::Cell;
use std::fmt;
use std::io::{self, Write};
use std::str;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("dockvs/", env!("CARGO_PKG_VERSION"));

/// Per-request transport settings shared by the resolver and the downloader.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Connect timeout. `None` leaves libcurl's default in place.
    pub connect_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Failure to obtain a response body from the remote side.
#[derive(Debug)]
pub enum TransportError {
    /// Curl reported an error (connection refused, DNS, timeout, truncated body).
    Curl(curl::Error),
    /// Final response status was outside 2xx.
    Http(u32),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Curl(e) => write!(f, "{}", e),
            TransportError::Http(code) => write!(f, "HTTP {}", code),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Curl(e) => Some(e),
            TransportError::Http(_) => None,
        }
    }
}

impl From<curl::Error> for TransportError {
    fn from(e: curl::Error) -> Self {
        TransportError::Curl(e)
    }
}

/// Failure of a streaming GET: either the transfer or the local sink broke.
#[derive(Debug)]
pub enum StreamError {
    Transport(TransportError),
    /// Writing a chunk into the sink failed; the transfer was aborted.
    Sink(io::Error),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Transport(e) => write!(f, "{}", e),
            StreamError::Sink(e) => write!(f, "sink: {}", e),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::Transport(e) => Some(e),
            StreamError::Sink(e) => Some(e),
        }
    }
}

impl From<TransportError> for StreamError {
    fn from(e: TransportError) -> Self {
        StreamError::Transport(e)
    }
}

impl From<curl::Error> for StreamError {
    fn from(e: curl::Error) -> Self {
        StreamError::Transport(TransportError::Curl(e))
    }
}

fn new_easy(url: &str, opts: &HttpOptions) -> Result<curl::easy::Easy, curl::Error> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.useragent(&opts.user_agent)?;
    if let Some(timeout) = opts.connect_timeout {
        easy.connect_timeout(timeout)?;
    }
    Ok(easy)
}

fn is_success(code: u32) -> bool {
    (200..300).contains(&code)
}

fn check_status(easy: &mut curl::easy::Easy) -> Result<(), TransportError> {
    let code = easy.response_code()?;
    if !is_success(code) {
        return Err(TransportError::Http(code));
    }
    Ok(())
}

/// Status code from an `HTTP/x.y NNN reason` line, if `line` is one.
fn parse_status_line(line: &[u8]) -> Option<u32> {
    let line = str::from_utf8(line).ok()?;
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

/// GET `url` and return the whole body. Any non-2xx final status is an error.
pub fn get_bytes(url: &str, opts: &HttpOptions) -> Result<Vec<u8>, TransportError> {
    let mut body = Vec::new();
    let mut easy = new_easy(url, opts)?;
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }
    check_status(&mut easy)?;
    tracing::debug!(url, bytes = body.len(), "GET complete");
    Ok(body)
}

/// GET `url` and write each received chunk into `sink` before the next one
/// is read. Returns the number of bytes written.
///
/// Compression is never negotiated and content decoding is off, so the sink
/// sees the literal bytes the server sent. Bodies of non-2xx responses are
/// not written.
pub fn get_streaming<W: Write>(
    url: &str,
    opts: &HttpOptions,
    sink: &mut W,
) -> Result<u64, StreamError> {
    let mut easy = new_easy(url, opts)?;
    easy.http_content_decoding(false)?;
    let mut list = curl::easy::List::new();
    list.append("Accept-Encoding: identity")?;
    easy.http_headers(list)?;

    let status = Cell::new(0u32);
    let mut written: u64 = 0;
    let mut sink_error: Option<io::Error> = None;

    let performed = {
        let mut transfer = easy.transfer();
        // Redirects produce several status lines; the last one wins.
        transfer.header_function(|line| {
            if let Some(code) = parse_status_line(line) {
                status.set(code);
            }
            true
        })?;
        transfer.write_function(|data| {
            if !is_success(status.get()) {
                return Ok(0);
            }
            match sink.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    tracing::warn!("stream sink write failed: {}", e);
                    sink_error = Some(e);
                    Ok(0) // abort transfer
                }
            }
        })?;
        transfer.perform()
    };

    if let Some(e) = sink_error {
        return Err(StreamError::Sink(e));
    }
    let code = status.get();
    if code != 0 && !is_success(code) {
        return Err(TransportError::Http(code).into());
    }
    performed?;
    check_status(&mut easy)?;
    sink.flush().map_err(StreamError::Sink)?;
    Ok(written)
}
