// crates/supply-sim-cli/src/main.rs
// ============================================================================
// Module: Supply Sim CLI Entry Point
// Description: Command dispatcher for the scenario server and one-shot tools.
// Purpose: Serve the API, apply single events, and inspect config and inventory.
// Dependencies: clap, supply-sim-config, supply-sim-server, serde, thiserror, tokio.
// ============================================================================

//! ## Overview
//! The Supply Sim CLI starts the HTTP API, runs one disruption event against a
//! fresh scenario, prints the catalog, validates configuration, and queries the
//! raw material inventory. Results are JSON on stdout; errors go to stderr with
//! a failure exit code. Blocking HTTP clients are only used on the blocking
//! thread pool.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use serde_json::json;
use supply_sim_cli::serve_policy::enforce_local_only;
use supply_sim_cli::serve_policy::resolve_allow_non_loopback;
use supply_sim_config::SupplySimConfig;
use supply_sim_providers::CouchbaseQueryClient;
use supply_sim_providers::InventoryQueryConfig;
use supply_sim_providers::query_service_url;
use supply_sim_server::SimServer;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of an inventory query response.
const MAX_INVENTORY_RESPONSE_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "supply-sim", version, disable_help_subcommand = true)]
struct Cli {
    /// Optional config file path (defaults to supply-sim.toml or `SUPPLY_SIM_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the scenario HTTP API.
    Serve(ServeCommand),
    /// Apply one disruption event to a fresh scenario and print the result.
    Apply(ApplyCommand),
    /// Print the stage catalog.
    Catalog,
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Raw material inventory utilities.
    Inventory {
        /// Selected inventory subcommand.
        #[command(subcommand)]
        command: InventoryCommand,
    },
}

/// Configuration for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Allow binding to non-loopback addresses.
    #[arg(long, action = ArgAction::SetTrue)]
    allow_non_loopback: bool,
}

/// Configuration for the `apply` command.
#[derive(Args, Debug)]
struct ApplyCommand {
    /// Free-text disruption description.
    #[arg(long, value_name = "TEXT")]
    event: String,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a Supply Sim configuration file and its catalog.
    Validate,
}

/// Inventory subcommands.
#[derive(Subcommand, Debug)]
enum InventoryCommand {
    /// Run the configured inventory statement and print one row per line.
    Query,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve(command) => command_serve(config_path, &command).await,
        Commands::Apply(command) => command_apply(config_path, command).await,
        Commands::Catalog => command_catalog(config_path),
        Commands::Config {
            command,
        } => match command {
            ConfigCommand::Validate => command_config_validate(config_path),
        },
        Commands::Inventory {
            command,
        } => match command {
            InventoryCommand::Query => command_inventory_query(config_path).await,
        },
    }
}

/// Loads configuration from the resolved path.
fn load_config(path: Option<&Path>) -> CliResult<SupplySimConfig> {
    SupplySimConfig::load(path)
        .map_err(|err| CliError::new(format!("Failed to load config: {err}")))
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(config_path: Option<&Path>, command: &ServeCommand) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let bind = config.server.bind_addr().map_err(|err| CliError::new(err.to_string()))?;
    let allow_non_loopback = resolve_allow_non_loopback(command.allow_non_loopback)
        .map_err(|err| CliError::new(err.to_string()))?;
    let exposed = enforce_local_only(bind, allow_non_loopback)
        .map_err(|err| CliError::new(err.to_string()))?;
    if exposed {
        write_stderr_line(&format!(
            "WARNING: serving an unauthenticated API on non-loopback address {bind}"
        ))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    let server = SimServer::from_config(config)
        .await
        .map_err(|err| CliError::new(format!("Server init failed: {err}")))?;
    write_stderr_line(&format!("supply-sim listening on http://{bind}"))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    server.serve().await.map_err(|err| CliError::new(format!("Server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `apply` command against a fresh scenario.
async fn command_apply(config_path: Option<&Path>, command: ApplyCommand) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let server = SimServer::from_config(config)
        .await
        .map_err(|err| CliError::new(format!("Apply init failed: {err}")))?;
    let report = server
        .service()
        .apply_event(command.event)
        .await
        .map_err(|err| CliError::new(format!("Event not applied: {err}")))?;
    write_json(&report)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `catalog` command.
fn command_catalog(config_path: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let catalog = config
        .load_catalog()
        .map_err(|err| CliError::new(format!("Failed to load catalog: {err}")))?;
    write_json(&catalog)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the config validation command.
fn command_config_validate(config_path: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let catalog = config
        .load_catalog()
        .map_err(|err| CliError::new(format!("Failed to load catalog: {err}")))?;
    write_json(&json!({
        "status": "ok",
        "stages": catalog.len(),
    }))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the inventory query command.
async fn command_inventory_query(config_path: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let query_config = inventory_query_config(&config, |name| std::env::var(name).ok())?;
    let rows = tokio::task::spawn_blocking(move || {
        CouchbaseQueryClient::new(query_config).and_then(|client| client.query())
    })
    .await
    .map_err(|err| CliError::new(format!("Inventory query join failed: {err}")))?
    .map_err(|err| CliError::new(err.to_string()))?;
    for row in &rows {
        write_json(row)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Builds the inventory client configuration, reading the password through `lookup`.
fn inventory_query_config(
    config: &SupplySimConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> CliResult<InventoryQueryConfig> {
    let inventory = &config.inventory;
    let connection = inventory.connection_string.as_deref().ok_or_else(|| {
        CliError::new("inventory.connection_string is not configured".to_string())
    })?;
    let username = inventory
        .username
        .clone()
        .ok_or_else(|| CliError::new("inventory.username is not configured".to_string()))?;
    let password = lookup(&inventory.password_env).ok_or_else(|| {
        CliError::new(format!("environment variable {} is not set", inventory.password_env))
    })?;
    let endpoint = query_service_url(connection).map_err(|err| CliError::new(err.to_string()))?;
    Ok(InventoryQueryConfig {
        endpoint,
        username,
        password,
        statement: inventory.effective_statement(),
        timeout_ms: inventory.timeout_ms,
        max_response_bytes: MAX_INVENTORY_RESPONSE_BYTES,
    })
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a value as one line of JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let payload = serde_json::to_string(value)
        .map_err(|err| CliError::new(format!("Failed to encode output: {err}")))?;
    write_stdout_line(&payload).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("Failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
