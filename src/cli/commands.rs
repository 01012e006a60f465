//! CLI command implementations
//!
//! Each command loads the configuration, builds its collaborators from it
//! and owns its own tokio runtime.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::engine::{ContractExecutor, SqlxRunner};
use crate::http_server::{ApiState, HttpServer};
use crate::model::{Connector, Contract};
use crate::observability::Logger;
use crate::store::JsonFileStore;

use super::args::Command;
use super::config::AxisConfig;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_json};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Serve { config } => serve(&config),
        Command::Execute {
            contract_id,
            config,
            body,
        } => execute(&config, &contract_id, body.as_deref()),
    }
}

/// Create the contract and connector directories
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = AxisConfig::load(config_path)?;

    for dir in [config.contracts_path(), config.connectors_path()] {
        fs::create_dir_all(&dir).map_err(|e| {
            CliError::io_error(format!("Failed to create {}: {}", dir.display(), e))
        })?;
    }

    let contracts = config.contracts_path().display().to_string();
    let connectors = config.connectors_path().display().to_string();
    Logger::info(
        "STORAGE_INITIALIZED",
        &[
            ("contracts_dir", contracts.as_str()),
            ("connectors_dir", connectors.as_str()),
        ],
    );
    Ok(())
}

/// Serve the HTTP API until the process exits
pub fn serve(config_path: &Path) -> CliResult<()> {
    let config = AxisConfig::load(config_path)?;
    let (contracts, connectors) = open_stores(&config)?;

    let state = ApiState::new(
        Arc::new(contracts),
        Arc::new(connectors),
        Arc::new(SqlxRunner::new()),
    );
    let server = HttpServer::new(config.http.clone(), state, config.require_auth);

    let rt = runtime()?;
    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Execute one contract and print the response JSON
pub fn execute(config_path: &Path, contract_id: &str, body: Option<&Path>) -> CliResult<()> {
    let config = AxisConfig::load(config_path)?;
    let overrides = read_request(body)?;
    let (contracts, connectors) = open_stores(&config)?;

    let executor = ContractExecutor::new(
        Arc::new(contracts),
        Arc::new(connectors),
        Arc::new(SqlxRunner::new()),
    );

    let rt = runtime()?;
    let response = rt.block_on(executor.execute(contract_id, &overrides))?;
    write_json(&response)
}

fn open_stores(
    config: &AxisConfig,
) -> CliResult<(JsonFileStore<Contract>, JsonFileStore<Connector>)> {
    let contracts = JsonFileStore::open(config.contracts_path())
        .map_err(|e| CliError::boot_failed(format!("Failed to open contract store: {}", e)))?;
    let connectors = JsonFileStore::open(config.connectors_path())
        .map_err(|e| CliError::boot_failed(format!("Failed to open connector store: {}", e)))?;
    Ok((contracts, connectors))
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))
}
