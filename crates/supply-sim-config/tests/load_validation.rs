//! File loading tests for supply-sim-config.
// crates/supply-sim-config/tests/load_validation.rs
// =============================================================================
// Module: Load Validation Tests
// Description: Validate config and catalog file loading.
// Purpose: Ensure explicit paths, size limits, and catalog files behave.
// =============================================================================

use std::path::Path;

use supply_sim_config::ConfigError;
use supply_sim_config::SupplySimConfig;
use supply_sim_core::StageId;

mod common;

type TestResult = Result<(), String>;

const CATALOG_TOML: &str = r#"
[[stages]]
stage_id = "Packaging"
default_choice = "Virgin plastic (China)"
cost_usd = 5
co2_kg = 8

[[stages.alternatives]]
label = "Molded pulp"
cost_usd = 6
co2_kg = 2
suppliers = "Pulpworks (US)"

[[stages]]
stage_id = "Shipping"
default_choice = "Air freight"
cost_usd = 20
co2_kg = 90
"#;

#[test]
fn explicit_path_is_loaded() -> TestResult {
    let file = common::temp_file(
        "[server]\nbind = \"127.0.0.1:9090\"\n\n[llm]\nmax_attempts = 3\nmodel = \"gpt-4o\"\n",
    )?;
    let config = SupplySimConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.server.bind != "127.0.0.1:9090" {
        return Err("bind not loaded".to_string());
    }
    if config.llm.max_attempts != 3 || config.llm.model.as_deref() != Some("gpt-4o") {
        return Err("llm section not loaded".to_string());
    }
    Ok(())
}

#[test]
fn missing_explicit_path_is_io_error() -> TestResult {
    match SupplySimConfig::load(Some(Path::new("/nonexistent/supply-sim.toml"))) {
        Err(ConfigError::Io(_)) => Ok(()),
        Err(other) => Err(format!("expected io error, got {other}")),
        Ok(_) => Err("expected io error".to_string()),
    }
}

#[test]
fn malformed_toml_is_parse_error() -> TestResult {
    let file = common::temp_file("[server\nbind = 1")?;
    match SupplySimConfig::load(Some(file.path())) {
        Err(ConfigError::Parse(_)) => Ok(()),
        Err(other) => Err(format!("expected parse error, got {other}")),
        Ok(_) => Err("expected parse error".to_string()),
    }
}

#[test]
fn invalid_values_fail_on_load() -> TestResult {
    let file = common::temp_file("[llm]\nmax_attempts = 0\n")?;
    match SupplySimConfig::load(Some(file.path())) {
        Err(ConfigError::Invalid(message)) if message.contains("max_attempts") => Ok(()),
        Err(other) => Err(format!("expected invalid error, got {other}")),
        Ok(_) => Err("expected invalid error".to_string()),
    }
}

#[test]
fn oversized_file_is_rejected() -> TestResult {
    let padding = format!("# {}\n", "x".repeat(1024 * 1024));
    let file = common::temp_file(&padding)?;
    match SupplySimConfig::load(Some(file.path())) {
        Err(ConfigError::Invalid(message)) if message.contains("size limit") => Ok(()),
        Err(other) => Err(format!("expected size error, got {other}")),
        Ok(_) => Err("expected size error".to_string()),
    }
}

#[test]
fn builtin_catalog_used_without_path() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    let catalog = config.load_catalog().map_err(|err| err.to_string())?;
    if catalog.len() != 3 {
        return Err(format!("expected laptop catalog, got {} stages", catalog.len()));
    }
    Ok(())
}

#[test]
fn catalog_file_is_loaded_and_validated() -> TestResult {
    let file = common::temp_file(CATALOG_TOML)?;
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.catalog.path = Some(file.path().to_string_lossy().into_owned());
    let catalog = config.load_catalog().map_err(|err| err.to_string())?;
    let stage = catalog.stage(&StageId::new("Packaging")).ok_or("missing Packaging")?;
    if stage.alternatives.len() != 1 || stage.alternatives[0].suppliers != "Pulpworks (US)" {
        return Err("alternatives not loaded".to_string());
    }
    if catalog.position(&StageId::new("Shipping")) != Some(1) {
        return Err("stage order not preserved".to_string());
    }
    Ok(())
}

#[test]
fn catalog_with_reserved_label_is_invalid() -> TestResult {
    let file = common::temp_file(
        r#"
[[stages]]
stage_id = "Packaging"
default_choice = "Plastic"
cost_usd = 5
co2_kg = 8

[[stages.alternatives]]
label = "Default"
cost_usd = 1
co2_kg = 1
suppliers = "Nobody"
"#,
    )?;
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.catalog.path = Some(file.path().to_string_lossy().into_owned());
    match config.load_catalog() {
        Err(ConfigError::Invalid(message)) if message.contains("reserved") => Ok(()),
        Err(other) => Err(format!("expected invalid catalog, got {other}")),
        Ok(_) => Err("expected invalid catalog".to_string()),
    }
}
