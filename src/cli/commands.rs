//! CLI command implementations
//!
//! Each command loads the config, applies the log level, wires the local
//! backends into the reconciliation components, runs one operation and
//! prints a single JSON response. Counters are logged on the way out.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::address::{AddressLifecycleManager, LocalAddressApi};
use crate::mapping::{
    Convergence, LocalMappingStore, MappingConvergenceEngine, MappingStore, RoleMapping,
    UserMapping,
};
use crate::observability::{log_event_with_fields, Event, Logger, MetricsRegistry};
use crate::retry::BackoffExecutor;

use super::args::{Command, MappingArgs};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Allocate { config } => allocate(&config),
        Command::Release { config } => release(&config),
        Command::MapRole(args) => map_role(&args),
        Command::MapUser(args) => map_user(&args),
        Command::Inspect { config } => inspect(&config),
    }
}

fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);

    let path = config_path.display().to_string();
    let state_dir = config.state_dir.display().to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("cluster", config.cluster_name.as_str()),
            ("config", path.as_str()),
            ("state_dir", state_dir.as_str()),
        ],
    );
    Ok(config)
}

fn address_manager(
    config: &Config,
    metrics: Arc<MetricsRegistry>,
) -> AddressLifecycleManager<LocalAddressApi> {
    AddressLifecycleManager::new(
        LocalAddressApi::new(&config.state_dir),
        Arc::new(BackoffExecutor::new()),
        config.backoff.clone(),
    )
    .with_metrics(metrics)
}

fn mapping_engine(
    config: &Config,
    metrics: Arc<MetricsRegistry>,
) -> MappingConvergenceEngine<LocalMappingStore> {
    MappingConvergenceEngine::new(LocalMappingStore::new(&config.state_dir)).with_metrics(metrics)
}

fn log_summary(metrics: &MetricsRegistry) {
    let fields = metrics.snapshot().fields();
    let borrowed: Vec<(&str, &str)> = fields
        .iter()
        .map(|(name, value)| (*name, value.as_str()))
        .collect();
    log_event_with_fields(Event::RunSummary, &borrowed);
}

/// Allocate and tag one address for the configured cluster
pub fn allocate(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let metrics = Arc::new(MetricsRegistry::new());
    let manager = address_manager(&config, metrics.clone());

    let result = manager.allocate(&config.cluster_name);
    log_summary(&metrics);
    let allocation_id = result?;

    write_response(json!({
        "cluster": config.cluster_name,
        "allocation_id": allocation_id,
    }))
}

/// Release every address tagged for the configured cluster
pub fn release(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let metrics = Arc::new(MetricsRegistry::new());
    let manager = address_manager(&config, metrics.clone());

    let result = manager.release(&config.cluster_name);
    log_summary(&metrics);
    result?;

    write_response(json!({
        "cluster": config.cluster_name,
        "released": metrics.snapshot().addresses_released,
    }))
}

/// Converge a role mapping
pub fn map_role(args: &MappingArgs) -> CliResult<()> {
    let config = load_config(&args.config)?;
    let metrics = Arc::new(MetricsRegistry::new());
    let engine = mapping_engine(&config, metrics.clone());

    let desired = RoleMapping::new(args.arn.clone(), args.username.clone(), args.groups.clone());
    let result = engine.map_role(&desired);
    log_summary(&metrics);

    write_response(convergence_json("role", &args.arn, result?))
}

/// Converge a user mapping
pub fn map_user(args: &MappingArgs) -> CliResult<()> {
    let config = load_config(&args.config)?;
    let metrics = Arc::new(MetricsRegistry::new());
    let engine = mapping_engine(&config, metrics.clone());

    let desired = UserMapping::new(args.arn.clone(), args.username.clone(), args.groups.clone());
    let result = engine.map_user(&desired);
    log_summary(&metrics);

    write_response(convergence_json("user", &args.arn, result?))
}

fn convergence_json(kind: &str, arn: &str, outcome: Convergence) -> serde_json::Value {
    match outcome {
        Convergence::Created { name } => json!({
            "kind": kind,
            "arn": arn,
            "created": true,
            "record": name,
        }),
        Convergence::Unchanged { existing } => json!({
            "kind": kind,
            "arn": arn,
            "created": false,
            "record": existing,
        }),
    }
}

/// Print the cluster's addresses and every mapping record
pub fn inspect(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;

    let addresses = LocalAddressApi::new(&config.state_dir)
        .list_all()
        .map_err(|e| CliError::io_error(e.to_string()))?
        .into_iter()
        .filter(|a| a.belongs_to(&config.cluster_name))
        .collect::<Vec<_>>();
    let mappings = LocalMappingStore::new(&config.state_dir)
        .list()
        .map_err(|e| CliError::io_error(e.to_string()))?;

    write_response(json!({
        "cluster": config.cluster_name,
        "addresses": addresses,
        "mappings": mappings,
    }))
}
