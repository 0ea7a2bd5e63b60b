//! Configuration file
//!
//! ```json
//! {
//!   "cluster_name": "prod",
//!   "state_dir": "./state",
//!   "log_level": "info",
//!   "backoff": { "initial_delay_ms": 500, "factor": 1.5, "jitter": 0.4, "steps": 10 }
//! }
//! ```
//!
//! Only `cluster_name` is required.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::observability::Severity;
use crate::retry::BackoffPolicy;

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Cluster whose resources are reconciled (required)
    pub cluster_name: String,

    /// Directory holding the local address inventory and mapping store
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    /// Minimum log severity: trace, info, warn or error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Retry schedule for address release
    #[serde(default)]
    pub backoff: BackoffPolicy,
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("./state")
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// A config with defaults for everything but the cluster name
    pub fn for_cluster(cluster_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            state_dir: default_state_dir(),
            log_level: default_log_level(),
            backoff: BackoffPolicy::default(),
        }
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate field values
    pub fn validate(&self) -> CliResult<()> {
        if self.cluster_name.trim().is_empty() {
            return Err(CliError::config_error("cluster_name must not be empty"));
        }
        if self.cluster_name.chars().any(char::is_whitespace) {
            return Err(CliError::config_error(format!(
                "cluster_name must not contain whitespace: '{}'",
                self.cluster_name
            )));
        }

        self.severity()?;

        self.backoff
            .validate()
            .map_err(|e| CliError::config_error(e.to_string()))?;

        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse::<Severity>()
            .map_err(|e| CliError::config_error(format!("Invalid log_level: {}", e)))
    }
}
