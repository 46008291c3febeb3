//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves canned responses by request path. Can require an `x-api-key`
//! header and can cut a body short (declares the full Content-Length, sends
//! only a prefix, then closes) to simulate a broken stream.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub body: Vec<u8>,
    /// If set, only this many body bytes are sent before the connection is dropped.
    pub truncate_at: Option<usize>,
    /// Serve a redirect to this path instead of the body.
    pub redirect_to: Option<String>,
}

impl Route {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            truncate_at: None,
            redirect_to: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            truncate_at: None,
            redirect_to: None,
        }
    }

    pub fn truncated(body: impl Into<Vec<u8>>, at: usize) -> Self {
        Self {
            truncate_at: Some(at),
            ..Self::ok(body)
        }
    }

    pub fn redirect(to: &str) -> Self {
        Self {
            status: 302,
            body: Vec::new(),
            truncate_at: None,
            redirect_to: Some(to.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockOptions {
    /// If set, any request without `x-api-key: <key>` gets 403.
    pub require_key: Option<String>,
}

type Routes = Arc<Mutex<HashMap<String, Route>>>;

/// Handle to a running server. Records every request path it served.
pub struct MockServer {
    pub base_url: String,
    routes: Routes,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockServer {
    /// Add or replace the response for `path`. Takes effect for the next request.
    pub fn route(&self, path: &str, route: Route) -> &Self {
        self.routes.lock().unwrap().insert(path.to_string(), route);
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests().iter().filter(|p| p.as_str() == path).count()
    }
}

/// Starts a server with no routes. Base URL has no trailing slash
/// (e.g. "http://127.0.0.1:12345"). The server runs until the process exits.
pub fn start() -> MockServer {
    start_with_options(MockOptions::default())
}

/// Like `start` but allows customizing server behavior (API key enforcement).
pub fn start_with_options(opts: MockOptions) -> MockServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Routes = Arc::new(Mutex::new(HashMap::new()));
    let opts = Arc::new(opts);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let (served_routes, log) = (Arc::clone(&routes), Arc::clone(&requests));
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&served_routes);
            let opts = Arc::clone(&opts);
            let log = Arc::clone(&log);
            thread::spawn(move || handle(stream, &routes, &opts, &log));
        }
    });
    MockServer {
        base_url: format!("http://127.0.0.1:{}", port),
        routes,
        requests,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    routes: &Mutex<HashMap<String, Route>>,
    opts: &MockOptions,
    log: &Mutex<Vec<String>>,
) {
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
    let (path, api_key) = parse_request(request);
    log.lock().unwrap().push(path.to_string());

    if let Some(required) = &opts.require_key {
        if api_key != Some(required.as_str()) {
            let _ = stream.write_all(
                b"HTTP/1.1 403 Forbidden\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
            return;
        }
    }

    let route = routes.lock().unwrap().get(path).cloned();
    let Some(route) = route else {
        let _ = stream.write_all(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return;
    };

    if let Some(location) = &route.redirect_to {
        let response = format!(
            "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            location
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        route.status,
        reason(route.status),
        route.body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let sent = route
        .truncate_at
        .map(|at| at.min(route.body.len()))
        .unwrap_or(route.body.len());
    let _ = stream.write_all(&route.body[..sent]);
    let _ = stream.flush();
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    }
}

/// Returns (path, optional x-api-key value).
fn parse_request(request: &str) -> (&str, Option<&str>) {
    let mut path = "";
    let mut api_key = None;
    for (i, line) in request.lines().enumerate() {
        let line = line.trim();
        if i == 0 {
            path = line.split_whitespace().nth(1).unwrap_or("");
            continue;
        }
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("x-api-key") {
                api_key = Some(value.trim());
            }
        }
    }
    (path, api_key)
}
