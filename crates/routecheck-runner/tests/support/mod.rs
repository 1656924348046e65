//! Loopback HTTP server for exercising the real client without the network

#![allow(dead_code)]

use std::io::Read;
use std::sync::mpsc;
use std::thread;

use tiny_http::{Response, Server};

/// A request as the server saw it.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    /// Path and query string
    pub url: String,
    pub body: String,
}

pub struct MockServer {
    pub base_url: String,
    pub requests: mpsc::Receiver<Captured>,
    handle: thread::JoinHandle<()>,
}

impl MockServer {
    /// Serve `count` requests, answering each with `handler`.
    pub fn start<F>(count: usize, handler: F) -> Self
    where
        F: Fn(&Captured) -> (u16, String) + Send + 'static,
    {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            for _ in 0..count {
                let Ok(mut request) = server.recv() else {
                    return;
                };
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let captured = Captured {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    body,
                };
                let (status, reply) = handler(&captured);
                let _ = tx.send(captured);
                let _ = request.respond(Response::from_string(reply).with_status_code(status));
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests: rx,
            handle,
        }
    }

    /// Answer every request with the same status and body.
    pub fn fixed(count: usize, status: u16, body: &str) -> Self {
        let body = body.to_string();
        Self::start(count, move |_| (status, body.clone()))
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Wait for the server thread and return every captured request.
    pub fn finish(self) -> Vec<Captured> {
        let _ = self.handle.join();
        self.requests.try_iter().collect()
    }
}

pub const ROUTE_JAM: &str = r#"{
    "status": "OK",
    "type": "result",
    "result": [{
        "algorithm": "с учётом пробок",
        "total_distance": 412,
        "total_duration": 95,
        "maneuvers": [
            {"outcoming_path": {"distance": 212}},
            {"outcoming_path": {"distance": 200}},
            {"outcoming_path": null}
        ]
    }]
}"#;

pub const CAFES: &str = r#"{
    "meta": {"code": 200},
    "result": {
        "total": 3,
        "items": [{
            "id": "70000001",
            "name": "Кафе у площади",
            "type": "branch",
            "point": {"lon": 30.3351, "lat": 59.9287}
        }]
    }
}"#;

pub const NOT_FOUND: &str = r#"{"meta": {"code": 404, "error": {"type": "itemNotFound"}}}"#;
