// crates/supply-sim-providers/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Local HTTP stub servers for provider tests.
// Purpose: Capture outbound requests and replay canned responses.
// Dependencies: tiny_http
// ============================================================================

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

use std::thread;

use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

/// Request observed by a stub server.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub url: String,
    /// Header name/value pairs (names lowercased).
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: String,
}

impl CapturedRequest {
    /// Returns the first header with the given lowercase name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }
}

/// Spawns a server answering `responses.len()` requests in order.
pub fn spawn_server(
    responses: Vec<(u16, String)>,
) -> (String, thread::JoinHandle<Vec<CapturedRequest>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let url = format!("http://{addr}");

    let handle = thread::spawn(move || {
        let mut captured = Vec::new();
        for (status, body) in responses {
            let Ok(mut request) = server.recv() else {
                break;
            };
            let request_body = std::io::read_to_string(request.as_reader()).unwrap_or_default();
            captured.push(CapturedRequest {
                method: request.method().to_string(),
                url: request.url().to_string(),
                headers: request
                    .headers()
                    .iter()
                    .map(|header| {
                        (
                            header.field.as_str().as_str().to_ascii_lowercase(),
                            header.value.as_str().to_string(),
                        )
                    })
                    .collect(),
                body: request_body,
            });
            let content_type =
                Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
            let response =
                Response::from_string(body).with_status_code(status).with_header(content_type);
            let _ = request.respond(response);
        }
        captured
    });

    (url, handle)
}
