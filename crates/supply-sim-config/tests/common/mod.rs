// crates/supply-sim-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for supply-sim-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::io::Write;

use supply_sim_config::ConfigError;
use supply_sim_config::SupplySimConfig;
use tempfile::NamedTempFile;

/// Parses a TOML string into a `SupplySimConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<SupplySimConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a minimal config with all defaults applied.
pub fn minimal_config() -> Result<SupplySimConfig, toml::de::Error> {
    config_from_toml("")
}

/// Writes content to a temporary file that lives as long as the handle.
pub fn temp_file(content: &str) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content.as_bytes()).map_err(|err| err.to_string())?;
    Ok(file)
}

/// Asserts that a validation result is an error containing a substring.
pub fn assert_invalid(result: Result<(), ConfigError>, needle: &str) -> Result<(), String> {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(()) => Err("expected invalid config".to_string()),
    }
}
