//! Minimal HTTP/1.1 server imitating a playback CDN for integration tests.
//!
//! Serves one body per `itag` on `/videoplayback`. Like the real thing it
//! honours a `range=<start>-<end>` query parameter, so only a sanitized URL
//! yields the whole resource. Unknown itags get 404.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

/// Starts a server in a background thread. Returns the base URL
/// (e.g. "http://127.0.0.1:12345"). The server runs until the process exits.
pub fn start(bodies: HashMap<u32, Vec<u8>>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let bodies = Arc::new(bodies);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let bodies = Arc::clone(&bodies);
            thread::spawn(move || handle(stream, &bodies));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

fn handle(mut stream: std::net::TcpStream, bodies: &HashMap<u32, Vec<u8>>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let target = request
        .lines()
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("");
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let param = |key: &str| {
        query
            .split('&')
            .filter_map(|p| p.split_once('='))
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    };

    let body = match param("itag").and_then(|v| v.parse::<u32>().ok()) {
        Some(itag) if path == "/videoplayback" => bodies.get(&itag),
        _ => None,
    };
    let Some(body) = body else {
        let _ = stream.write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
        return;
    };

    let slice = match param("range").and_then(|r| r.split_once('-')) {
        Some((a, b)) => {
            let start = a.parse::<usize>().unwrap_or(0).min(body.len());
            let end = b
                .parse::<usize>()
                .map(|e| e + 1)
                .unwrap_or(body.len())
                .clamp(start, body.len());
            &body[start..end]
        }
        None => &body[..],
    };
    let header = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: video/mp4\r\nContent-Length: {}\r\n\r\n",
        slice.len()
    );
    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(slice);
}
