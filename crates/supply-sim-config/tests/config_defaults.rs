//! Config defaults and validation tests for supply-sim-config.
// crates/supply-sim-config/tests/config_defaults.rs
// =============================================================================
// Module: Config Defaults and Validation Tests
// Description: Validate default values and per-section invariants.
// Purpose: Ensure a minimal config is valid and bad values fail closed.
// =============================================================================

use common::assert_invalid;

mod common;

type TestResult = Result<(), String>;

#[test]
fn default_config_validates() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn defaults_match_documented_values() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    if config.server.bind != "127.0.0.1:8080" {
        return Err(format!("unexpected bind {}", config.server.bind));
    }
    if config.llm.endpoint != "https://api.opper.ai/v2/call" {
        return Err(format!("unexpected endpoint {}", config.llm.endpoint));
    }
    if config.llm.api_key_env != "OPPER_API_KEY" {
        return Err("unexpected api key env".to_string());
    }
    if config.llm.max_attempts != 5 || config.llm.timeout_ms != 30_000 {
        return Err("unexpected llm retry defaults".to_string());
    }
    if !config.audit.enabled || config.audit.log_event_text {
        return Err("unexpected audit defaults".to_string());
    }
    if config.inventory.password_env != "DB_PASSWORD" {
        return Err("unexpected password env".to_string());
    }
    Ok(())
}

#[test]
fn default_inventory_statement_targets_raw_material() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    let statement = config.inventory.effective_statement();
    if statement != "SELECT * FROM `hackaping`.`HardwareDestroyer`.`RawMaterial`" {
        return Err(format!("unexpected statement {statement}"));
    }
    Ok(())
}

#[test]
fn hyphenated_bucket_is_quoted_in_default_statement() -> TestResult {
    let config = common::config_from_toml("[inventory]\nbucket = \"travel-sample\"\n")
        .map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    let statement = config.inventory.effective_statement();
    if statement != "SELECT * FROM `travel-sample`.`HardwareDestroyer`.`RawMaterial`" {
        return Err(format!("unexpected statement {statement}"));
    }
    Ok(())
}

#[test]
fn statement_override_is_used_verbatim() -> TestResult {
    let config = common::config_from_toml(
        "[inventory]\nstatement = \"SELECT name FROM inv.s.c LIMIT 5\"\n",
    )
    .map_err(|err| err.to_string())?;
    if config.inventory.effective_statement() != "SELECT name FROM inv.s.c LIMIT 5" {
        return Err("statement override ignored".to_string());
    }
    Ok(())
}

#[test]
fn invalid_bind_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.server.bind = "localhost".to_string();
    assert_invalid(config.validate(), "server.bind")
}

#[test]
fn zero_body_limit_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.server.max_body_bytes = 0;
    assert_invalid(config.validate(), "max_body_bytes")
}

#[test]
fn event_length_is_bounded() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.server.max_event_chars = 0;
    assert_invalid(config.validate(), "max_event_chars")?;
    config.server.max_event_chars = 32_001;
    assert_invalid(config.validate(), "max_event_chars")
}

#[test]
fn http_llm_endpoint_requires_opt_in() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.llm.endpoint = "http://127.0.0.1:9000/v2/call".to_string();
    assert_invalid(config.validate(), "allow_http")?;
    config.llm.allow_http = true;
    config.validate().map_err(|err| err.to_string())
}

#[test]
fn llm_endpoint_requires_scheme() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.llm.endpoint = "api.opper.ai/v2/call".to_string();
    assert_invalid(config.validate(), "llm.endpoint")
}

#[test]
fn llm_attempts_are_bounded() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.llm.max_attempts = 0;
    assert_invalid(config.validate(), "llm.max_attempts")?;
    config.llm.max_attempts = 21;
    assert_invalid(config.validate(), "llm.max_attempts")?;
    config.llm.max_attempts = 20;
    config.validate().map_err(|err| err.to_string())
}

#[test]
fn llm_timeout_is_bounded() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.llm.timeout_ms = 499;
    assert_invalid(config.validate(), "llm.timeout_ms")?;
    config.llm.timeout_ms = 120_001;
    assert_invalid(config.validate(), "llm.timeout_ms")
}

#[test]
fn blank_call_name_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.llm.call_name = "  ".to_string();
    assert_invalid(config.validate(), "llm.call_name")
}

#[test]
fn inventory_connection_requires_couchbase_scheme() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.inventory.connection_string = Some("https://cb.example.com".to_string());
    assert_invalid(config.validate(), "inventory.connection_string")?;
    config.inventory.connection_string = Some("couchbases://cb.example.com".to_string());
    config.validate().map_err(|err| err.to_string())
}

#[test]
fn inventory_keyspace_names_are_restricted() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.inventory.collection = "RawMaterial; DROP".to_string();
    assert_invalid(config.validate(), "inventory.collection")
}

#[test]
fn blank_audit_path_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.audit.path = Some(String::new());
    assert_invalid(config.validate(), "audit.path")
}
