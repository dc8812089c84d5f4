// crates/supply-sim-providers/src/inventory.rs
// ============================================================================
// Module: Inventory Query Client
// Description: Couchbase Query Service client for the raw material inventory.
// Purpose: Issue one fixed statement and return the result rows.
// Dependencies: reqwest, serde, serde_json, url
// ============================================================================

//! ## Overview
//! The inventory lives in a hosted Couchbase cluster. Rather than a native
//! SDK, the client talks to the cluster's Query Service REST endpoint, derived
//! from the connection string by [`query_service_url`]. Requests use HTTP
//! basic auth and a server-side timeout that mirrors the client timeout.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::http::LimitedReadError;
use crate::http::read_response_limited;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Query Service port for TLS connections.
const QUERY_TLS_PORT: u16 = 18093;
/// Query Service port for cleartext connections.
const QUERY_PORT: u16 = 8093;
/// Query Service REST path.
const QUERY_PATH: &str = "/query/service";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the inventory query client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryQueryConfig {
    /// Query Service endpoint.
    pub endpoint: Url,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Statement to execute.
    pub statement: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
}

/// Inventory query errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// Connection string or credentials rejected before any request.
    #[error("invalid inventory config: {0}")]
    InvalidConfig(String),
    /// The request could not be delivered.
    #[error("inventory transport error: {0}")]
    Transport(String),
    /// The Query Service answered with a non-success status and no error list.
    #[error("inventory query returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
    /// The Query Service reported statement errors.
    #[error("inventory query failed: {0}")]
    Query(String),
    /// The response could not be decoded.
    #[error("inventory response invalid: {0}")]
    InvalidResponse(String),
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Query Service request body.
#[derive(Debug, Serialize)]
struct QueryBody<'a> {
    /// SQL++ statement.
    statement: &'a str,
    /// Server-side timeout, e.g. `10000ms`.
    timeout: String,
}

/// Query Service response body.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    /// Result rows.
    #[serde(default)]
    results: Vec<Value>,
    /// Overall status (`success`, `errors`, `timeout`, ...).
    #[serde(default)]
    status: Option<String>,
    /// Reported statement errors.
    #[serde(default)]
    errors: Vec<QueryErrorEntry>,
}

/// Single Query Service error entry.
#[derive(Debug, Deserialize)]
struct QueryErrorEntry {
    /// Error code.
    #[serde(default)]
    code: Option<i64>,
    /// Error message.
    #[serde(default)]
    msg: Option<String>,
}

// ============================================================================
// SECTION: Connection Strings
// ============================================================================

/// Derives the Query Service URL from a Couchbase connection string.
///
/// `couchbases://host` maps to `https://host:18093/query/service` and
/// `couchbase://host` maps to `http://host:8093/query/service`. Only the first
/// host of a multi-host string is used; any port or options are ignored.
///
/// # Errors
///
/// Returns [`InventoryError::InvalidConfig`] for unsupported schemes or missing hosts.
pub fn query_service_url(connection_string: &str) -> Result<Url, InventoryError> {
    let trimmed = connection_string.trim();
    let (scheme, port, rest) = if let Some(rest) = trimmed.strip_prefix("couchbases://") {
        ("https", QUERY_TLS_PORT, rest)
    } else if let Some(rest) = trimmed.strip_prefix("couchbase://") {
        ("http", QUERY_PORT, rest)
    } else {
        return Err(InventoryError::InvalidConfig(
            "connection string must use couchbase:// or couchbases://".to_string(),
        ));
    };
    let hosts = rest.split(['/', '?']).next().unwrap_or_default();
    let first = hosts.split([',', ';']).next().unwrap_or_default().trim();
    let host = if first.starts_with('[') {
        first.split_inclusive(']').next().unwrap_or_default()
    } else {
        first.split(':').next().unwrap_or_default()
    };
    if host.is_empty() {
        return Err(InventoryError::InvalidConfig("connection string has no host".to_string()));
    }
    Url::parse(&format!("{scheme}://{host}:{port}{QUERY_PATH}"))
        .map_err(|_| InventoryError::InvalidConfig("connection string host is invalid".to_string()))
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking Couchbase Query Service client.
pub struct CouchbaseQueryClient {
    /// Client configuration.
    config: InventoryQueryConfig,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl CouchbaseQueryClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError`] when credentials are missing or the client cannot be built.
    pub fn new(config: InventoryQueryConfig) -> Result<Self, InventoryError> {
        if config.username.trim().is_empty() {
            return Err(InventoryError::InvalidConfig("username is empty".to_string()));
        }
        if config.password.is_empty() {
            return Err(InventoryError::InvalidConfig("password is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent("supply-sim/0.1")
            .redirect(Policy::none())
            .build()
            .map_err(|_| InventoryError::InvalidConfig("http client build failed".to_string()))?;
        Ok(Self {
            config,
            client,
        })
    }

    /// Executes the configured statement and returns the result rows.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError`] on transport, status, or statement failures.
    pub fn query(&self) -> Result<Vec<Value>, InventoryError> {
        let body = QueryBody {
            statement: &self.config.statement,
            timeout: format!("{}ms", self.config.timeout_ms),
        };
        let mut response = self
            .client
            .post(self.config.endpoint.clone())
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(&body)
            .send()
            .map_err(|err| {
                InventoryError::Transport(if err.is_timeout() {
                    "query timed out".to_string()
                } else {
                    "query request failed".to_string()
                })
            })?;
        let status = response.status();
        let bytes =
            read_response_limited(&mut response, self.config.max_response_bytes).map_err(|err| {
                InventoryError::Transport(
                    match err {
                        LimitedReadError::TooLarge => "query response exceeds size limit",
                        LimitedReadError::Truncated => "query response truncated",
                        LimitedReadError::Read => "failed to read query response",
                    }
                    .to_string(),
                )
            })?;
        let decoded: Result<QueryResponse, _> = serde_json::from_slice(&bytes);
        let decoded = match decoded {
            Ok(decoded) => decoded,
            Err(_) if !status.is_success() => {
                return Err(InventoryError::Status {
                    status: status.as_u16(),
                });
            }
            Err(err) => return Err(InventoryError::InvalidResponse(err.to_string())),
        };
        if !decoded.errors.is_empty() {
            return Err(InventoryError::Query(join_errors(&decoded.errors)));
        }
        if !status.is_success() {
            return Err(InventoryError::Status {
                status: status.as_u16(),
            });
        }
        match decoded.status.as_deref() {
            None | Some("success") => Ok(decoded.results),
            Some(other) => Err(InventoryError::Query(format!("query status {other}"))),
        }
    }
}

/// Renders Query Service errors as `code: message` pairs.
fn join_errors(errors: &[QueryErrorEntry]) -> String {
    errors
        .iter()
        .map(|entry| {
            let msg = entry.msg.as_deref().unwrap_or("unknown error");
            entry.code.map_or_else(|| msg.to_string(), |code| format!("{code}: {msg}"))
        })
        .collect::<Vec<_>>()
        .join("; ")
}
