//! Test helpers: a one-shot canned HTTP server.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;

/// Serve each canned response to one connection, in order.
///
/// Returns the bound port and a handle yielding the request line of every
/// request received.
pub fn serve(responses: Vec<String>) -> (u16, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = std::thread::spawn(move || {
        let mut request_lines = Vec::new();
        for resp in responses {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 2048];
            let n = stream.read(&mut buf).unwrap_or(0);
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            request_lines.push(request.lines().next().unwrap_or("").to_string());
            let _ = stream.write_all(resp.as_bytes());
            let _ = stream.flush();
        }
        request_lines
    });
    (port, handle)
}

/// A `200 OK` response with `body`.
pub fn ok(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
}

/// A `404 Not Found` response.
pub fn not_found() -> String {
    "HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\n\r\nnot found".to_string()
}
