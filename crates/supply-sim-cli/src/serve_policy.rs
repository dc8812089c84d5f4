// crates/supply-sim-cli/src/serve_policy.rs
// ============================================================================
// Module: Serve Policy
// Description: Network exposure check for the HTTP server launcher.
// Purpose: Keep the API on loopback unless exposure is explicitly requested.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The API has no authentication, so binding to a non-loopback address needs
//! an explicit opt-in via `--allow-non-loopback` or
//! [`ALLOW_NON_LOOPBACK_ENV`].

use std::env;
use std::fmt;
use std::net::SocketAddr;

/// Environment variable enabling non-loopback server binds.
pub const ALLOW_NON_LOOPBACK_ENV: &str = "SUPPLY_SIM_ALLOW_NON_LOOPBACK";

/// Serve policy failures for bind safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServePolicyError {
    /// Environment variable was set to an invalid value.
    InvalidEnv {
        /// Raw environment value.
        value: String,
    },
    /// Non-loopback binding requires explicit opt-in.
    NonLoopbackOptInRequired {
        /// Bind address.
        bind: SocketAddr,
    },
}

impl fmt::Display for ServePolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnv {
                value,
            } => write!(f, "invalid {ALLOW_NON_LOOPBACK_ENV} value: {value}"),
            Self::NonLoopbackOptInRequired {
                bind,
            } => write!(
                f,
                "refusing to bind {bind}: pass --allow-non-loopback or set \
                 {ALLOW_NON_LOOPBACK_ENV}=1"
            ),
        }
    }
}

/// Resolves the non-loopback opt-in flag from CLI and environment.
///
/// # Errors
/// Returns [`ServePolicyError::InvalidEnv`] when the environment value is invalid.
pub fn resolve_allow_non_loopback(flag: bool) -> Result<bool, ServePolicyError> {
    if flag {
        return Ok(true);
    }
    let Some(value) = env::var_os(ALLOW_NON_LOOPBACK_ENV) else {
        return Ok(false);
    };
    let value = value.to_string_lossy().to_string();
    parse_boolish(&value).ok_or(ServePolicyError::InvalidEnv {
        value,
    })
}

/// Returns true when the bind address is exposed beyond loopback.
///
/// # Errors
/// Returns [`ServePolicyError::NonLoopbackOptInRequired`] for a non-loopback
/// address without opt-in.
pub fn enforce_local_only(
    bind: SocketAddr,
    allow_non_loopback: bool,
) -> Result<bool, ServePolicyError> {
    if bind.ip().is_loopback() {
        return Ok(false);
    }
    if !allow_non_loopback {
        return Err(ServePolicyError::NonLoopbackOptInRequired {
            bind,
        });
    }
    Ok(true)
}

/// Parses a bool-ish string (true/false/1/0/yes/no/on/off).
fn parse_boolish(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
