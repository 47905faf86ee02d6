//! Minimal HTTP/1.1 server that replays scripted JSON responses for integration tests.
//!
//! Each route matches a path prefix and owns a queue of (status, body)
//! responses; the last response repeats once the queue is down to one.
//! Every request head is recorded so tests can assert on paths and headers.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct Route {
    pub path: &'static str,
    pub responses: Vec<(u16, String)>,
}

impl Route {
    pub fn new(path: &'static str, responses: Vec<(u16, &str)>) -> Self {
        Self {
            path,
            responses: responses.into_iter().map(|(s, b)| (s, b.to_string())).collect(),
        }
    }
}

pub struct ApiServer {
    /// e.g. "http://127.0.0.1:12345"
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ApiServer {
    /// Request heads received so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests whose target starts with `path`.
    pub fn hits(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| target(r).map_or(false, |t| t.starts_with(path)))
            .count()
    }
}

/// Starts a server in a background thread. The server runs until the process exits.
pub fn start(routes: Vec<Route>) -> ApiServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes = Arc::new(Mutex::new(routes));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);
    thread::spawn(move || {
        // Sequential on purpose: scripted queues are consumed in request order.
        for stream in listener.incoming().flatten() {
            handle(stream, &routes, &seen);
        }
    });
    ApiServer {
        base_url: format!("http://127.0.0.1:{}", port),
        requests,
    }
}

fn target(request: &str) -> Option<&str> {
    request.lines().next()?.split_whitespace().nth(1)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    routes: &Mutex<Vec<Route>>,
    seen: &Mutex<Vec<String>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = String::from_utf8_lossy(&buf[..n]).to_string();
    seen.lock().unwrap().push(request.clone());

    let (status, body) = {
        let mut routes = routes.lock().unwrap();
        let path = target(&request).unwrap_or("");
        match routes.iter_mut().find(|r| path.starts_with(r.path)) {
            Some(route) if route.responses.len() > 1 => route.responses.remove(0),
            Some(route) => route
                .responses
                .first()
                .cloned()
                .unwrap_or((404, String::new())),
            None => (404, String::new()),
        }
    };

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason(status),
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body.as_bytes());
}
