// crates/supply-sim-providers/src/llm.rs
// ============================================================================
// Module: Structured Call Client
// Description: Assessment source backed by a hosted LLM structured call.
// Purpose: Send the disruption prompt and return the raw answer unparsed.
// Dependencies: supply-sim-core, reqwest, serde, serde_json, url
// ============================================================================

//! ## Overview
//! The client POSTs `{name, instructions, input, output_schema, model?}` to the
//! configured endpoint with the API key in the `x-opper-api-key` header. The
//! answer envelope is `{message?, json_payload?}`; the structured payload is
//! preferred and the free-text message is the fallback. Parsing the payload
//! into assessments is left to the disruption applier so that malformed
//! answers count against its retry budget.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use supply_sim_core::AssessmentRequest;
use supply_sim_core::AssessmentSource;
use supply_sim_core::RawAssessment;
use supply_sim_core::SourceError;
use thiserror::Error;
use url::Url;

use crate::http::LimitedReadError;
use crate::http::read_response_limited;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-opper-api-key";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the structured-call client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredCallConfig {
    /// Structured-call endpoint URL.
    pub endpoint: String,
    /// Name of the structured call.
    pub call_name: String,
    /// Optional model override.
    pub model: Option<String>,
    /// API key sent with every call.
    pub api_key: String,
    /// Allow cleartext HTTP (disabled by default).
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for StructuredCallConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.opper.ai/v2/call".to_string(),
            call_name: "supply_chain_disruption_assessment".to_string(),
            model: None,
            api_key: String::new(),
            allow_http: false,
            timeout_ms: 30_000,
            max_response_bytes: 1024 * 1024,
            user_agent: "supply-sim/0.1".to_string(),
        }
    }
}

/// Client construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Configuration rejected before any request was made.
    #[error("invalid client config: {0}")]
    InvalidConfig(String),
    /// The underlying HTTP client could not be built.
    #[error("http client build failed")]
    Build,
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Structured-call request body.
#[derive(Debug, Serialize)]
struct CallBody<'a> {
    /// Call name.
    name: &'a str,
    /// Task instructions.
    instructions: &'a str,
    /// Prompt input.
    input: &'a str,
    /// Expected answer schema.
    output_schema: &'a Value,
    /// Optional model override.
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

/// Structured-call response envelope.
#[derive(Debug, Deserialize)]
struct CallResponse {
    /// Free-text answer.
    #[serde(default)]
    message: Option<String>,
    /// Structured answer.
    #[serde(default)]
    json_payload: Option<Value>,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Assessment source backed by a hosted structured call.
pub struct StructuredCallClient {
    /// Client configuration.
    config: StructuredCallConfig,
    /// Validated endpoint.
    endpoint: Url,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl StructuredCallClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the endpoint, key, or HTTP client is unusable.
    pub fn new(config: StructuredCallConfig) -> Result<Self, ClientError> {
        let endpoint = Url::parse(config.endpoint.trim())
            .map_err(|_| ClientError::InvalidConfig("invalid llm endpoint".to_string()))?;
        match endpoint.scheme() {
            "https" => {}
            "http" if config.allow_http => {}
            _ => {
                return Err(ClientError::InvalidConfig(
                    "unsupported llm endpoint scheme".to_string(),
                ));
            }
        }
        if config.api_key.trim().is_empty() {
            return Err(ClientError::InvalidConfig("llm api key is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|_| ClientError::Build)?;
        Ok(Self {
            config,
            endpoint,
            client,
        })
    }

    /// Returns the validated endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl AssessmentSource for StructuredCallClient {
    fn assess(&self, request: &AssessmentRequest) -> Result<RawAssessment, SourceError> {
        let body = CallBody {
            name: &self.config.call_name,
            instructions: &request.instructions,
            input: &request.prompt,
            output_schema: &request.output_schema,
            model: self.config.model.as_deref(),
        };
        let mut response = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, self.config.api_key.as_str())
            .json(&body)
            .send()
            .map_err(|err| SourceError::Transport(describe_transport_error(&err)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }
        let bytes = read_response_limited(&mut response, self.config.max_response_bytes)
            .map_err(|err| match err {
                LimitedReadError::TooLarge => SourceError::TooLarge {
                    max_bytes: self.config.max_response_bytes,
                },
                LimitedReadError::Truncated => {
                    SourceError::Transport("llm response truncated".to_string())
                }
                LimitedReadError::Read => {
                    SourceError::Transport("failed to read llm response".to_string())
                }
            })?;
        let envelope: CallResponse = serde_json::from_slice(&bytes)
            .map_err(|err| SourceError::InvalidResponse(err.to_string()))?;
        match envelope {
            CallResponse {
                json_payload: Some(payload),
                ..
            } if !payload.is_null() => Ok(RawAssessment::Json(payload)),
            CallResponse {
                message: Some(message),
                ..
            } => Ok(RawAssessment::Text(message)),
            _ => Err(SourceError::InvalidResponse(
                "response carries neither json_payload nor message".to_string(),
            )),
        }
    }
}

/// Summarizes a transport error without echoing request headers.
fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "llm request timed out".to_string()
    } else if err.is_connect() {
        "llm endpoint unreachable".to_string()
    } else {
        "llm request failed".to_string()
    }
}
