//! Shared test fixtures
//!
//! A `tiny_http` server that records the requests it receives and answers
//! with a canned status and body, plus a raw TCP server that cuts the
//! response body short.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tiny_http::{Response, Server};

/// What the mock server saw.
#[derive(Debug)]
pub struct Recorded {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Recorded {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Mock storage service answering a fixed number of requests
pub struct MockServer {
    pub uri: String,
    handle: JoinHandle<Vec<Recorded>>,
}

impl MockServer {
    /// Answer the next request with `status` and `body`
    pub fn start(status: u16, body: &[u8]) -> Self {
        Self::start_with_delay(status, body, Duration::ZERO)
    }

    /// Like `start`, but wait `delay` before answering
    pub fn start_with_delay(status: u16, body: &[u8], delay: Duration) -> Self {
        Self::serve(1, status, body, delay)
    }

    /// Answer the next `count` requests with the same `status` and `body`
    pub fn start_many(count: usize, status: u16, body: &[u8]) -> Self {
        Self::serve(count, status, body, Duration::ZERO)
    }

    fn serve(count: usize, status: u16, body: &[u8], delay: Duration) -> Self {
        let server = Server::http("127.0.0.1:0").expect("failed to bind mock server");
        let addr = server.server_addr().to_ip().expect("mock server has no ip address");
        let body = body.to_vec();

        let handle = thread::spawn(move || {
            (0..count)
                .map_while(|_| answer_one(&server, status, &body, delay))
                .collect()
        });

        Self {
            uri: format!("http://{addr}"),
            handle,
        }
    }

    /// Wait for the server thread and return the first recorded request
    pub fn recorded(self) -> Recorded {
        self.recorded_all()
            .into_iter()
            .next()
            .expect("mock server received no request")
    }

    /// Wait for the server thread and return every recorded request
    pub fn recorded_all(self) -> Vec<Recorded> {
        self.handle.join().expect("mock server thread panicked")
    }
}

fn answer_one(server: &Server, status: u16, body: &[u8], delay: Duration) -> Option<Recorded> {
    let mut request = server.recv_timeout(Duration::from_secs(10)).ok()??;

    let mut req_body = Vec::new();
    request.as_reader().read_to_end(&mut req_body).ok()?;
    let recorded = Recorded {
        method: request.method().to_string(),
        url: request.url().to_string(),
        headers: request
            .headers()
            .iter()
            .map(|h| (h.field.to_string(), h.value.as_str().to_string()))
            .collect(),
        body: req_body,
    };

    thread::sleep(delay);
    // The client may have given up already.
    let _ = request.respond(Response::from_data(body.to_vec()).with_status_code(status));
    Some(recorded)
}

/// Start a server that answers one request with `status`, announces a
/// 1000-byte body, sends only a few bytes and closes the connection.
pub fn truncated_body_server(status: u16) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind truncating server");
    let addr = listener.local_addr().expect("truncating server has no address");

    let handle = thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else {
            return;
        };
        // Requests under test carry no body, so the head ends the request.
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => return,
                Ok(n) => head.extend_from_slice(&buf[..n]),
            }
        }
        let response = format!(
            "HTTP/1.1 {status} Whatever\r\nContent-Length: 1000\r\nConnection: close\r\n\r\nshort"
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.flush();
    });

    (format!("http://{addr}"), handle)
}
