//! Minimal HTTP/1.1 server on the loopback interface for download and CLI tests.
//!
//! Each route answers with a canned [`Reply`]; unknown paths get a 404.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    /// 200 with the given body.
    Body(Vec<u8>),
    /// Empty response with the given status code.
    Status(u16),
    /// Advertises `advertised` bytes, sends `body`, then closes the connection.
    Truncated { body: Vec<u8>, advertised: usize },
    /// Accepts the request and sends nothing for the given duration.
    Stall(Duration),
}

pub(crate) struct TestServer {
    base: String,
}

impl TestServer {
    /// Starts serving `routes` on a background thread until the process exits.
    pub(crate) fn start(routes: Vec<(&str, Reply)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        let routes: Arc<HashMap<String, Reply>> = Arc::new(
            routes
                .into_iter()
                .map(|(path, reply)| (path.to_string(), reply))
                .collect(),
        );

        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                thread::spawn(move || handle(stream, &routes));
            }
        });

        Self {
            base: format!("http://127.0.0.1:{port}"),
        }
    }

    /// Base URL without a trailing slash, e.g. `http://127.0.0.1:40000`.
    pub(crate) fn base(&self) -> &str {
        &self.base
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }
}

fn handle(mut stream: TcpStream, routes: &HashMap<String, Reply>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let Some(path) = read_request_path(&mut stream) else {
        return;
    };

    match routes.get(&path) {
        Some(Reply::Body(body)) => {
            write_head(&mut stream, "200 OK", body.len());
            let _ = stream.write_all(body);
        }
        Some(Reply::Status(code)) => write_head(&mut stream, &format!("{code} Status"), 0),
        Some(Reply::Truncated { body, advertised }) => {
            write_head(&mut stream, "200 OK", *advertised);
            let _ = stream.write_all(body);
            let _ = stream.flush();
            let _ = stream.shutdown(std::net::Shutdown::Both);
        }
        Some(Reply::Stall(duration)) => thread::sleep(*duration),
        None => write_head(&mut stream, "404 Not Found", 0),
    }
}

fn write_head(stream: &mut TcpStream, status: &str, content_length: usize) {
    let head = format!(
        "HTTP/1.1 {status}\r\nContent-Length: {content_length}\r\nConnection: close\r\n\r\n"
    );
    let _ = stream.write_all(head.as_bytes());
}

fn read_request_path(stream: &mut TcpStream) -> Option<String> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return None,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    let request = String::from_utf8_lossy(&request);
    let mut parts = request.lines().next()?.split_whitespace();
    let _method = parts.next()?;
    parts.next().map(str::to_string)
}
