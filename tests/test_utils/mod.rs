//! Shared fixtures for the integration tests: a loopback HTTP server that
//! captures requests, plus recording transport and reporter doubles.
#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::Duration;

use webhook_logger::{EmitError, ErrorReporter, LogRecord, Payload, TransportError, WebhookTransport};

#[derive(Debug)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

pub struct MockServer {
    pub addr: SocketAddr,
    rx: mpsc::Receiver<CapturedRequest>,
}

impl MockServer {
    /// Serve every connection with `status` until the test process exits.
    pub fn start(status: u16) -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener");
        let addr = listener.local_addr().expect("listener has address");
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else {
                    break;
                };
                let captured = read_http_request(&mut stream);
                // Capture before answering so the request is visible as
                // soon as the synchronous client returns.
                if tx.send(captured).is_err() {
                    break;
                }
                let response = format!(
                    "HTTP/1.1 {status} Mock\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok"
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        Self { addr, rx }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Requests received so far.
    pub fn received(&self) -> Vec<CapturedRequest> {
        self.rx.try_iter().collect()
    }
}

fn read_http_request(stream: &mut TcpStream) -> CapturedRequest {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

    let mut request_line = String::new();
    reader.read_line(&mut request_line).expect("read request line");
    let parts: Vec<&str> = request_line.trim().split(' ').collect();
    let method = parts.first().unwrap_or(&"").to_string();
    let path = parts.get(1).unwrap_or(&"").to_string();

    let mut headers = Vec::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("read header");
        if line.trim().is_empty() {
            break;
        }
        if let Some((key, value)) = line.trim().split_once(':') {
            let key = key.trim().to_lowercase();
            let value = value.trim().to_string();
            if key == "content-length" {
                content_length = value.parse().unwrap_or(0);
            }
            headers.push((key, value));
        }
    }

    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body).expect("read body");
    }

    CapturedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    }
}

/// Loopback URL nobody is listening on.
pub fn closed_port_url() -> String {
    let port = TcpListener::bind(("127.0.0.1", 0))
        .expect("bind ephemeral listener")
        .local_addr()
        .expect("listener has address")
        .port();
    format!("http://127.0.0.1:{port}/hook")
}

/// Transport double storing every post.
#[derive(Default)]
pub struct RecordingTransport {
    posts: Mutex<Vec<(String, String)>>,
}

impl RecordingTransport {
    pub fn posts(&self) -> Vec<(String, String)> {
        self.posts.lock().unwrap().clone()
    }

    pub fn bodies(&self) -> Vec<serde_json::Value> {
        self.posts()
            .iter()
            .map(|(_, body)| serde_json::from_str(body).expect("body is JSON"))
            .collect()
    }
}

impl WebhookTransport for RecordingTransport {
    fn post(&self, url: &str, payload: &Payload) -> Result<u16, TransportError> {
        let body = payload.to_json_string()?;
        self.posts.lock().unwrap().push((url.to_string(), body));
        Ok(200)
    }
}

/// Reporter double counting calls.
#[derive(Default)]
pub struct CountingReporter {
    calls: AtomicUsize,
    last: Mutex<Option<String>>,
}

impl CountingReporter {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_error(&self) -> Option<String> {
        self.last.lock().unwrap().clone()
    }
}

impl ErrorReporter for CountingReporter {
    fn report(&self, _record: &LogRecord, error: &EmitError) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(error.to_string());
    }
}
