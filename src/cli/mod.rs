//! CLI module for clusterward
//!
//! Provides command-line interface for:
//! - allocate: Allocate and tag an elastic IP for the cluster
//! - release: Release the cluster's unassociated elastic IPs
//! - map-role / map-user: Converge an IAM identity mapping
//! - inspect: Print current local state

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command, MappingArgs};
pub use commands::{allocate, inspect, map_role, map_user, release, run, run_command};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_error_to, write_response, write_response_to};
