//! Local HTTP server for download tests.
//!
//! A tiny blocking HTTP/1.1 server on `127.0.0.1` that answers each path
//! with a canned response, so mirror fallback can be exercised without
//! touching the network. Enabled by the `test-support` feature.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// How the server answers one path.
#[derive(Clone, Debug)]
pub enum Route {
    /// Respond with the given status and body.
    Respond(u16, Vec<u8>),
    /// Promise `declared` bytes, send `body`, then hang up.
    Truncated { declared: usize, body: Vec<u8> },
    /// Send the body in `chunks`, pausing `delay` before each one.
    Slow { chunks: Vec<Vec<u8>>, delay: Duration },
}

/// A running test server. Requests are counted so tests can assert which
/// sources were actually contacted.
pub struct TestServer {
    base: String,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    pub fn start(routes: Vec<(&str, Route)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
        let base = format!("http://{}", listener.local_addr().expect("local addr"));
        let routes: Arc<HashMap<String, Route>> = Arc::new(
            routes
                .into_iter()
                .map(|(path, route)| (path.to_string(), route))
                .collect(),
        );
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                counter.fetch_add(1, Ordering::SeqCst);
                let routes = Arc::clone(&routes);
                // Slow routes must not hold up the next connection
                thread::spawn(move || {
                    let _ = serve(stream, &routes);
                });
            }
        });

        Self { base, hits }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn serve(mut stream: TcpStream, routes: &HashMap<String, Route>) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let path = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string();

    // Drain headers
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 || line == "\r\n" {
            break;
        }
    }

    match routes.get(&path) {
        Some(Route::Respond(status, body)) => {
            write!(
                stream,
                "HTTP/1.1 {status} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                reason(*status),
                body.len()
            )?;
            stream.write_all(body)?;
        }
        Some(Route::Truncated { declared, body }) => {
            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Length: {declared}\r\nConnection: close\r\n\r\n"
            )?;
            stream.write_all(body)?;
        }
        Some(Route::Slow { chunks, delay }) => {
            let total: usize = chunks.iter().map(Vec::len).sum();
            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Length: {total}\r\nConnection: close\r\n\r\n"
            )?;
            stream.flush()?;
            for chunk in chunks {
                thread::sleep(*delay);
                stream.write_all(chunk)?;
                stream.flush()?;
            }
        }
        None => {
            write!(
                stream,
                "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            )?;
        }
    }
    stream.flush()?;
    stream.shutdown(std::net::Shutdown::Both)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
