// crates/supply-sim-config/src/config.rs
// ============================================================================
// Module: Supply Sim Configuration
// Description: Configuration loading and validation for the simulator.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: supply-sim-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The file is resolved from an explicit path, then the `SUPPLY_SIM_CONFIG`
//! environment variable, then `supply-sim.toml` in the working directory.
//! Only the implicit default file may be absent; in that case the built-in
//! defaults apply.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use supply_sim_core::Catalog;
use supply_sim_core::CatalogDocument;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "supply-sim.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SUPPLY_SIM_CONFIG";
/// Maximum configuration or catalog file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default HTTP bind address.
pub(crate) const DEFAULT_BIND: &str = "127.0.0.1:8080";
/// Default maximum request body size in bytes.
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;
/// Default maximum disruption event length in characters.
pub(crate) const DEFAULT_MAX_EVENT_CHARS: usize = 4_000;
/// Maximum allowed disruption event length in characters.
pub(crate) const MAX_EVENT_CHARS: usize = 32_000;
/// Default structured-call endpoint.
pub(crate) const DEFAULT_LLM_ENDPOINT: &str = "https://api.opper.ai/v2/call";
/// Default structured-call name.
pub(crate) const DEFAULT_LLM_CALL_NAME: &str = "supply_chain_disruption_assessment";
/// Default environment variable holding the LLM API key.
pub(crate) const DEFAULT_LLM_API_KEY_ENV: &str = "OPPER_API_KEY";
/// Default LLM request timeout in milliseconds.
pub(crate) const DEFAULT_LLM_TIMEOUT_MS: u64 = 30_000;
/// Minimum LLM request timeout in milliseconds.
pub(crate) const MIN_LLM_TIMEOUT_MS: u64 = 500;
/// Maximum LLM request timeout in milliseconds.
pub(crate) const MAX_LLM_TIMEOUT_MS: u64 = 120_000;
/// Default attempts per disruption event.
pub(crate) const DEFAULT_LLM_MAX_ATTEMPTS: u32 = 5;
/// Maximum attempts per disruption event.
pub(crate) const MAX_LLM_MAX_ATTEMPTS: u32 = 20;
/// Default maximum LLM response size in bytes.
pub(crate) const DEFAULT_LLM_MAX_RESPONSE_BYTES: usize = 1024 * 1024;
/// Maximum allowed LLM response size in bytes.
pub(crate) const MAX_LLM_MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;
/// Default environment variable holding the database password.
pub(crate) const DEFAULT_DB_PASSWORD_ENV: &str = "DB_PASSWORD";
/// Default inventory bucket.
pub(crate) const DEFAULT_INVENTORY_BUCKET: &str = "hackaping";
/// Default inventory scope.
pub(crate) const DEFAULT_INVENTORY_SCOPE: &str = "HardwareDestroyer";
/// Default inventory collection.
pub(crate) const DEFAULT_INVENTORY_COLLECTION: &str = "RawMaterial";
/// Default inventory query timeout in milliseconds.
pub(crate) const DEFAULT_INVENTORY_TIMEOUT_MS: u64 = 10_000;
/// Minimum inventory query timeout in milliseconds.
pub(crate) const MIN_INVENTORY_TIMEOUT_MS: u64 = 100;
/// Maximum inventory query timeout in milliseconds.
pub(crate) const MAX_INVENTORY_TIMEOUT_MS: u64 = 120_000;
/// Maximum length for names such as bucket, call name, or env var.
pub(crate) const MAX_NAME_LENGTH: usize = 256;
/// Maximum length for a query statement.
pub(crate) const MAX_STATEMENT_LENGTH: usize = 8 * 1024;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Supply Sim configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplySimConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// LLM collaborator configuration.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Stage catalog configuration.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Inventory query configuration.
    #[serde(default)]
    pub inventory: InventoryConfig,
}

impl SupplySimConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, origin) = resolve_path(path)?;
        validate_path(&resolved)?;
        if origin == ConfigOrigin::Default && !resolved.exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let content = read_limited(&resolved, "config")?;
        let config: Self =
            toml::from_str(&content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.llm.validate()?;
        self.audit.validate()?;
        self.catalog.validate()?;
        self.inventory.validate()?;
        Ok(())
    }

    /// Loads the configured stage catalog, or the built-in laptop catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the catalog file is unreadable or invalid.
    pub fn load_catalog(&self) -> Result<Catalog, ConfigError> {
        let Some(path) = &self.catalog.path else {
            return Ok(Catalog::laptop());
        };
        let content = read_limited(Path::new(path), "catalog")?;
        let document: CatalogDocument =
            toml::from_str(&content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        Catalog::try_from(document).map_err(|err| ConfigError::Invalid(err.to_string()))
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP API.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Maximum disruption event length in characters.
    #[serde(default = "default_max_event_chars")]
    pub max_event_chars: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            max_event_chars: default_max_event_chars(),
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the bind address is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid("server.bind is not a valid address".to_string()))
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_event_chars == 0 || self.max_event_chars > MAX_EVENT_CHARS {
            return Err(ConfigError::Invalid(format!(
                "server.max_event_chars must be between 1 and {MAX_EVENT_CHARS}"
            )));
        }
        Ok(())
    }
}

/// LLM structured-call configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Structured-call endpoint URL.
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    /// Name of the structured call.
    #[serde(default = "default_llm_call_name")]
    pub call_name: String,
    /// Optional model override.
    #[serde(default)]
    pub model: Option<String>,
    /// Environment variable holding the API key.
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,
    /// Attempts per disruption event.
    #[serde(default = "default_llm_max_attempts")]
    pub max_attempts: u32,
    /// Maximum response size in bytes.
    #[serde(default = "default_llm_max_response_bytes")]
    pub max_response_bytes: usize,
    /// Allow a non-TLS endpoint (explicit opt-in).
    #[serde(default)]
    pub allow_http: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            call_name: default_llm_call_name(),
            model: None,
            api_key_env: default_llm_api_key_env(),
            timeout_ms: default_llm_timeout_ms(),
            max_attempts: default_llm_max_attempts(),
            max_response_bytes: default_llm_max_response_bytes(),
            allow_http: false,
        }
    }
}

impl LlmConfig {
    /// Validates LLM configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint.trim();
        if endpoint.starts_with("http://") {
            if !self.allow_http {
                return Err(ConfigError::Invalid(
                    "llm.endpoint uses http:// without allow_http".to_string(),
                ));
            }
        } else if !endpoint.starts_with("https://") {
            return Err(ConfigError::Invalid(
                "llm.endpoint must include http:// or https://".to_string(),
            ));
        }
        validate_name("llm.call_name", &self.call_name)?;
        validate_name("llm.api_key_env", &self.api_key_env)?;
        if let Some(model) = &self.model {
            validate_name("llm.model", model)?;
        }
        validate_timeout_range(
            "llm.timeout_ms",
            self.timeout_ms,
            MIN_LLM_TIMEOUT_MS,
            MAX_LLM_TIMEOUT_MS,
        )?;
        if self.max_attempts == 0 || self.max_attempts > MAX_LLM_MAX_ATTEMPTS {
            return Err(ConfigError::Invalid(format!(
                "llm.max_attempts must be between 1 and {MAX_LLM_MAX_ATTEMPTS}"
            )));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_LLM_MAX_RESPONSE_BYTES {
            return Err(ConfigError::Invalid(format!(
                "llm.max_response_bytes must be between 1 and {MAX_LLM_MAX_RESPONSE_BYTES}"
            )));
        }
        Ok(())
    }
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Enable structured audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines). Defaults to stderr.
    #[serde(default)]
    pub path: Option<String>,
    /// Log raw disruption event text instead of a digest (explicit opt-in).
    #[serde(default)]
    pub log_event_text: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
            log_event_text: false,
        }
    }
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

/// Stage catalog configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    /// Optional catalog TOML path. The built-in laptop catalog is used when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl CatalogConfig {
    /// Validates catalog configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("catalog.path", path)?;
        }
        Ok(())
    }
}

/// Inventory query configuration for the document database.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryConfig {
    /// Cluster connection string (`couchbase://` or `couchbases://`).
    #[serde(default)]
    pub connection_string: Option<String>,
    /// Database username.
    #[serde(default)]
    pub username: Option<String>,
    /// Environment variable holding the database password.
    #[serde(default = "default_db_password_env")]
    pub password_env: String,
    /// Bucket name.
    #[serde(default = "default_inventory_bucket")]
    pub bucket: String,
    /// Scope name.
    #[serde(default = "default_inventory_scope")]
    pub scope: String,
    /// Collection name.
    #[serde(default = "default_inventory_collection")]
    pub collection: String,
    /// Optional statement override.
    #[serde(default)]
    pub statement: Option<String>,
    /// Query timeout in milliseconds.
    #[serde(default = "default_inventory_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            username: None,
            password_env: default_db_password_env(),
            bucket: default_inventory_bucket(),
            scope: default_inventory_scope(),
            collection: default_inventory_collection(),
            statement: None,
            timeout_ms: default_inventory_timeout_ms(),
        }
    }
}

impl InventoryConfig {
    /// Returns the query statement, defaulting to a full collection scan.
    ///
    /// Keyspace names are backtick-quoted so names containing `-` are not read
    /// as arithmetic.
    #[must_use]
    pub fn effective_statement(&self) -> String {
        self.statement.clone().unwrap_or_else(|| {
            format!("SELECT * FROM `{}`.`{}`.`{}`", self.bucket, self.scope, self.collection)
        })
    }

    /// Validates inventory configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(connection) = &self.connection_string {
            let trimmed = connection.trim();
            if !(trimmed.starts_with("couchbase://") || trimmed.starts_with("couchbases://")) {
                return Err(ConfigError::Invalid(
                    "inventory.connection_string must use couchbase:// or couchbases://"
                        .to_string(),
                ));
            }
        }
        if let Some(username) = &self.username {
            validate_name("inventory.username", username)?;
        }
        validate_name("inventory.password_env", &self.password_env)?;
        for (field, value) in [
            ("inventory.bucket", &self.bucket),
            ("inventory.scope", &self.scope),
            ("inventory.collection", &self.collection),
        ] {
            validate_name(field, value)?;
            if !value.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-') {
                return Err(ConfigError::Invalid(format!(
                    "{field} must contain only letters, digits, '_' or '-'"
                )));
            }
        }
        if let Some(statement) = &self.statement {
            if statement.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "inventory.statement must be non-empty".to_string(),
                ));
            }
            if statement.len() > MAX_STATEMENT_LENGTH {
                return Err(ConfigError::Invalid(
                    "inventory.statement exceeds max length".to_string(),
                ));
            }
        }
        validate_timeout_range(
            "inventory.timeout_ms",
            self.timeout_ms,
            MIN_INVENTORY_TIMEOUT_MS,
            MAX_INVENTORY_TIMEOUT_MS,
        )
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Where the config path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigOrigin {
    /// Explicit caller-provided path.
    Explicit,
    /// `SUPPLY_SIM_CONFIG` environment variable.
    Environment,
    /// Implicit default filename.
    Default,
}

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, ConfigOrigin), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), ConfigOrigin::Explicit));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), ConfigOrigin::Environment));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), ConfigOrigin::Default))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Reads a UTF-8 file bounded by the config size limit.
fn read_limited(path: &Path, what: &str) -> Result<String, ConfigError> {
    let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    if bytes.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::Invalid(format!("{what} file exceeds size limit")));
    }
    String::from_utf8(bytes)
        .map_err(|_| ConfigError::Invalid(format!("{what} file must be utf-8")))
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a short non-empty name.
fn validate_name(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.len() > MAX_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    Ok(())
}

/// Validates a timeout value against bounds.
fn validate_timeout_range(
    field: &str,
    value_ms: u64,
    min_ms: u64,
    max_ms: u64,
) -> Result<(), ConfigError> {
    if value_ms < min_ms || value_ms > max_ms {
        return Err(ConfigError::Invalid(format!(
            "{field} must be between {min_ms} and {max_ms} milliseconds",
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Default maximum request body size.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Default maximum event length.
const fn default_max_event_chars() -> usize {
    DEFAULT_MAX_EVENT_CHARS
}

/// Default structured-call endpoint.
fn default_llm_endpoint() -> String {
    DEFAULT_LLM_ENDPOINT.to_string()
}

/// Default structured-call name.
fn default_llm_call_name() -> String {
    DEFAULT_LLM_CALL_NAME.to_string()
}

/// Default API key environment variable.
fn default_llm_api_key_env() -> String {
    DEFAULT_LLM_API_KEY_ENV.to_string()
}

/// Default LLM timeout.
const fn default_llm_timeout_ms() -> u64 {
    DEFAULT_LLM_TIMEOUT_MS
}

/// Default attempts per event.
const fn default_llm_max_attempts() -> u32 {
    DEFAULT_LLM_MAX_ATTEMPTS
}

/// Default maximum LLM response size.
const fn default_llm_max_response_bytes() -> usize {
    DEFAULT_LLM_MAX_RESPONSE_BYTES
}

/// Audit logging is on by default.
const fn default_audit_enabled() -> bool {
    true
}

/// Default database password environment variable.
fn default_db_password_env() -> String {
    DEFAULT_DB_PASSWORD_ENV.to_string()
}

/// Default inventory bucket.
fn default_inventory_bucket() -> String {
    DEFAULT_INVENTORY_BUCKET.to_string()
}

/// Default inventory scope.
fn default_inventory_scope() -> String {
    DEFAULT_INVENTORY_SCOPE.to_string()
}

/// Default inventory collection.
fn default_inventory_collection() -> String {
    DEFAULT_INVENTORY_COLLECTION.to_string()
}

/// Default inventory timeout.
const fn default_inventory_timeout_ms() -> u64 {
    DEFAULT_INVENTORY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::*;

    #[test]
    fn validate_timeout_range_accepts_bounds() {
        assert!(validate_timeout_range("t", 500, 500, 1_000).is_ok());
        assert!(validate_timeout_range("t", 1_000, 500, 1_000).is_ok());
    }

    #[test]
    fn validate_timeout_range_error_includes_field_name() {
        let Err(err) = validate_timeout_range("llm.timeout_ms", 1, 500, 1_000) else {
            panic!("expected error");
        };
        assert!(err.to_string().contains("llm.timeout_ms"));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn explicit_path_wins_over_default() {
        let (path, origin) = resolve_path(Some(Path::new("custom.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("custom.toml"));
        assert_eq!(origin, ConfigOrigin::Explicit);
    }

    #[test]
    fn overlong_path_component_is_rejected() {
        let long = "a".repeat(MAX_PATH_COMPONENT_LENGTH + 1);
        assert!(validate_path(Path::new(&long)).is_err());
    }
}
