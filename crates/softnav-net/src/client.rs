//! Minimal HTTP/1.1 GET client.
//!
//! Plain HTTP over `std::net::TcpStream`, HTTPS through a [`TlsProvider`]
//! when one is supplied. Blocking; the async
//! [`HttpNetwork`](crate::HttpNetwork) runs it on tokio's blocking pool.
//!
//! A response is only returned once its body is complete according to its
//! framing (`Content-Length`, chunked, or connection close). A body cut
//! short by a dropped connection or a stalled read is a transport error,
//! never a shorter body.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use softnav_types::error::{Result, SoftnavError};

use crate::tls::TlsProvider;
use crate::url::Url;

/// Maximum response body size (8 MB).
const MAX_BODY_SIZE: usize = 8 * 1024 * 1024;

/// Maximum size of the status line plus headers.
const MAX_HEAD_SIZE: usize = 64 * 1024;

const MAX_REDIRECTS: u8 = 5;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-read and per-write socket timeout.
const IO_TIMEOUT: Duration = Duration::from_secs(15);

/// A complete HTTP response.
#[derive(Debug)]
pub struct HttpResponse {
    pub status_code: u16,
    /// (lowercased name, value) pairs in arrival order.
    pub headers: Vec<(String, String)>,
    /// Body with any transfer coding removed.
    pub body: Vec<u8>,
}

/// GET `url`, following up to five redirects.
///
/// HTTPS without a TLS provider is a transport error.
pub fn http_get(url: &Url, tls: Option<&dyn TlsProvider>) -> Result<HttpResponse> {
    let mut current = url.clone();
    for _ in 0..=MAX_REDIRECTS {
        let resp = fetch_once(&current, tls)?;
        let location = match resp.status_code {
            301 | 302 | 303 | 307 | 308 => find_header(&resp.headers, "location"),
            _ => None,
        };
        let Some(location) = location else {
            return Ok(resp);
        };
        current = current
            .resolve(location)
            .ok_or_else(|| transport(format!("bad redirect Location: {location}")))?;
        log::debug!("redirected to {current}");
    }
    Err(transport("too many redirects"))
}

fn transport(msg: impl Into<String>) -> SoftnavError {
    SoftnavError::Transport(msg.into())
}

/// One request/response exchange on a fresh connection.
fn fetch_once(url: &Url, tls: Option<&dyn TlsProvider>) -> Result<HttpResponse> {
    match (url.scheme.as_str(), tls) {
        ("http", _) => {
            let mut stream = connect(&url.host, url.effective_port())?;
            exchange(&mut stream, url)
        },
        ("https", Some(provider)) => {
            let stream = connect(&url.host, url.effective_port())?;
            let mut stream = provider.connect_tls(stream, &url.host)?;
            exchange(&mut stream, url)
        },
        ("https", None) => Err(transport(format!(
            "HTTPS not available (built without TLS): {url}"
        ))),
        (scheme, _) => Err(transport(format!("unsupported scheme for HTTP client: {scheme}"))),
    }
}

fn exchange<S: Read + Write>(stream: &mut S, url: &Url) -> Result<HttpResponse> {
    stream
        .write_all(request_bytes(url).as_bytes())
        .and_then(|()| stream.flush())
        .map_err(|e| transport(format!("send request: {e}")))?;
    read_response(stream)
}

/// Connect to the first reachable address of `host:port`.
fn connect(host: &str, port: u16) -> Result<TcpStream> {
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| transport(format!("DNS resolution failed for {host}: {e}")))?;

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(stream) => {
                stream
                    .set_read_timeout(Some(IO_TIMEOUT))
                    .and_then(|()| stream.set_write_timeout(Some(IO_TIMEOUT)))
                    .map_err(|e| transport(format!("socket setup: {e}")))?;
                return Ok(stream);
            },
            Err(e) => last_err = Some(e),
        }
    }
    Err(match last_err {
        Some(e) => transport(format!("connect to {host}:{port} failed: {e}")),
        None => transport(format!("no addresses for {host}:{port}")),
    })
}

fn request_bytes(url: &Url) -> String {
    let host = match url.port {
        Some(port) if port != url.default_port() => format!("{}:{port}", url.host),
        _ => url.host.clone(),
    };
    format!(
        "GET {target} HTTP/1.1\r\n\
         Host: {host}\r\n\
         User-Agent: softnav/{version}\r\n\
         Accept: text/html, */*\r\n\
         Connection: close\r\n\
         \r\n",
        target = url.request_target(),
        version = env!("CARGO_PKG_VERSION"),
    )
}

// ---------------------------------------------------------------------------
// Response framing
// ---------------------------------------------------------------------------

/// How the end of the body is signalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    Chunked,
    Length(usize),
    UntilClose,
}

struct Head {
    status_code: u16,
    headers: Vec<(String, String)>,
    framing: Framing,
}

/// Read one response from `stream`, stopping as soon as its body is
/// complete.
fn read_response(stream: &mut impl Read) -> Result<HttpResponse> {
    let mut buf = Vec::with_capacity(8192);

    let body_start = loop {
        if let Some(i) = find_subsequence(&buf, b"\r\n\r\n") {
            break i + 4;
        }
        if buf.len() > MAX_HEAD_SIZE {
            return Err(transport("response headers too large"));
        }
        if fill(stream, &mut buf)? == 0 {
            return Err(transport("connection closed before response headers ended"));
        }
    };
    let head = parse_head(&buf[..body_start - 4])?;

    loop {
        let raw = &buf[body_start..];
        if might_be_complete(head.framing, raw)
            && let Some(body) = decode_body(head.framing, raw)?
        {
            return Ok(into_response(head, body));
        }
        if fill(stream, &mut buf)? == 0 {
            let body = finish_body(head.framing, &buf[body_start..])?;
            return Ok(into_response(head, body));
        }
    }
}

/// Parse a complete response held in memory (the connection has closed
/// after the last byte).
pub fn parse_response(data: &[u8]) -> Result<HttpResponse> {
    let split = find_subsequence(data, b"\r\n\r\n")
        .ok_or_else(|| transport("malformed HTTP response: no header terminator"))?;
    let head = parse_head(&data[..split])?;
    let body = finish_body(head.framing, &data[split + 4..])?;
    Ok(into_response(head, body))
}

fn into_response(head: Head, body: Vec<u8>) -> HttpResponse {
    HttpResponse {
        status_code: head.status_code,
        headers: head.headers,
        body,
    }
}

/// Append one read's worth of bytes. `Ok(0)` is end of stream.
fn fill(stream: &mut impl Read, buf: &mut Vec<u8>) -> Result<usize> {
    let mut chunk = [0u8; 8192];
    loop {
        match stream.read(&mut chunk) {
            Ok(n) => {
                if buf.len() + n > MAX_HEAD_SIZE + MAX_BODY_SIZE {
                    return Err(transport("response body exceeds 8 MB limit"));
                }
                buf.extend_from_slice(&chunk[..n]);
                return Ok(n);
            },
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
            // TLS peers that close without close_notify.
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(0),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                return Err(transport("timed out reading response"));
            },
            Err(e) => return Err(transport(format!("read response: {e}"))),
        }
    }
}

fn parse_head(head: &[u8]) -> Result<Head> {
    let text = std::str::from_utf8(head).map_err(|_| transport("non-UTF-8 response headers"))?;
    let mut lines = text.split("\r\n");
    let status_code = parse_status_line(lines.next().unwrap_or(""))?;

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    let chunked = find_header(&headers, "transfer-encoding")
        .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"));
    let framing = if status_code == 204 || status_code == 304 || (100..200).contains(&status_code)
    {
        Framing::Length(0)
    } else if chunked {
        Framing::Chunked
    } else if let Some(value) = find_header(&headers, "content-length") {
        let len: usize = value
            .parse()
            .map_err(|_| transport(format!("bad Content-Length: {value}")))?;
        if len > MAX_BODY_SIZE {
            return Err(transport("response body exceeds 8 MB limit"));
        }
        Framing::Length(len)
    } else {
        Framing::UntilClose
    };

    Ok(Head {
        status_code,
        headers,
        framing,
    })
}

fn parse_status_line(line: &str) -> Result<u16> {
    let mut parts = line.splitn(3, ' ');
    if !parts.next().is_some_and(|v| v.starts_with("HTTP/")) {
        return Err(transport(format!("bad status line: {line}")));
    }
    parts
        .next()
        .and_then(|code| code.parse().ok())
        .ok_or_else(|| transport(format!("bad status code in: {line}")))
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Cheap pre-check so a chunked body is not re-decoded after every read.
fn might_be_complete(framing: Framing, raw: &[u8]) -> bool {
    match framing {
        Framing::Length(len) => raw.len() >= len,
        Framing::Chunked => raw.ends_with(b"\r\n"),
        Framing::UntilClose => false,
    }
}

/// The body if `raw` already holds all of it, `None` if more is needed.
fn decode_body(framing: Framing, raw: &[u8]) -> Result<Option<Vec<u8>>> {
    match framing {
        Framing::Length(len) if raw.len() >= len => Ok(Some(raw[..len].to_vec())),
        Framing::Length(_) | Framing::UntilClose => Ok(None),
        Framing::Chunked => decode_chunked(raw),
    }
}

/// The body once the stream has ended. Anything short of complete is a
/// transport error.
fn finish_body(framing: Framing, raw: &[u8]) -> Result<Vec<u8>> {
    match framing {
        Framing::UntilClose => {
            if raw.len() > MAX_BODY_SIZE {
                return Err(transport("response body exceeds 8 MB limit"));
            }
            Ok(raw.to_vec())
        },
        Framing::Length(len) => decode_body(framing, raw)?.ok_or_else(|| {
            transport(format!("response body truncated: {} of {len} bytes", raw.len()))
        }),
        Framing::Chunked => decode_body(framing, raw)?
            .ok_or_else(|| transport("chunked response body truncated before final chunk")),
    }
}

/// Decode a chunked body. `Ok(None)` until the final zero-size chunk has
/// arrived; malformed or oversized chunks are errors.
fn decode_chunked(raw: &[u8]) -> Result<Option<Vec<u8>>> {
    let mut body = Vec::new();
    let mut rest = raw;
    loop {
        let Some(line_end) = find_subsequence(rest, b"\r\n") else {
            return Ok(None);
        };
        let size = parse_chunk_size(&rest[..line_end])?;
        rest = &rest[line_end + 2..];

        if size == 0 {
            // Trailer section, then the blank line.
            return Ok(trailers_complete(rest).then_some(body));
        }
        if size > MAX_BODY_SIZE - body.len() {
            return Err(transport("chunked body exceeds 8 MB limit"));
        }
        if rest.len() < size + 2 {
            return Ok(None);
        }
        if &rest[size..size + 2] != b"\r\n" {
            return Err(transport("chunk data not followed by CRLF"));
        }
        body.extend_from_slice(&rest[..size]);
        rest = &rest[size + 2..];
    }
}

fn parse_chunk_size(line: &[u8]) -> Result<usize> {
    let line = std::str::from_utf8(line).map_err(|_| transport("bad chunk size"))?;
    let digits = line.split(';').next().unwrap_or("").trim();
    usize::from_str_radix(digits, 16).map_err(|_| transport(format!("bad chunk size: {digits}")))
}

fn trailers_complete(rest: &[u8]) -> bool {
    rest.starts_with(b"\r\n") || find_subsequence(rest, b"\r\n\r\n").is_some()
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
