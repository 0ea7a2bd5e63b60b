//! CLI argument definitions using clap
//!
//! Commands:
//! - clusterward allocate --config <path>
//! - clusterward release --config <path>
//! - clusterward map-role --config <path> --arn <arn> --username <name> [--group <g>]...
//! - clusterward map-user --config <path> --arn <arn> --username <name> [--group <g>]...
//! - clusterward inspect --config <path>

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// clusterward - converge cluster elastic IPs and IAM identity mappings
#[derive(Parser, Debug)]
#[command(name = "clusterward")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Allocate a new elastic IP owned by the cluster
    Allocate {
        /// Path to configuration file
        #[arg(long, default_value = "./clusterward.json")]
        config: PathBuf,
    },

    /// Release every elastic IP tagged for the cluster
    Release {
        /// Path to configuration file
        #[arg(long, default_value = "./clusterward.json")]
        config: PathBuf,
    },

    /// Ensure an IAM role is mapped into the cluster
    MapRole(MappingArgs),

    /// Ensure an IAM user is mapped into the cluster
    MapUser(MappingArgs),

    /// Print the cluster's addresses and all identity mappings
    Inspect {
        /// Path to configuration file
        #[arg(long, default_value = "./clusterward.json")]
        config: PathBuf,
    },
}

/// Arguments shared by the mapping commands
#[derive(Args, Debug, Clone)]
pub struct MappingArgs {
    /// Path to configuration file
    #[arg(long, default_value = "./clusterward.json")]
    pub config: PathBuf,

    /// ARN of the IAM principal
    #[arg(long)]
    pub arn: String,

    /// Cluster username the principal maps to
    #[arg(long)]
    pub username: String,

    /// Cluster group, repeatable
    #[arg(long = "group")]
    pub groups: Vec<String>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
