//! CLI argument definitions using clap
//!
//! Commands:
//! - axis init --config <path>
//! - axis serve --config <path>
//! - axis execute <contract-id> --config <path> [--body <file>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// axis - run SQL contracts and serve their templated, anonymized results
#[derive(Parser, Debug)]
#[command(name = "axis")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the contract and connector directories
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./axis.json")]
        config: PathBuf,
    },

    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./axis.json")]
        config: PathBuf,
    },

    /// Execute one contract and print the response
    Execute {
        /// Contract id
        contract_id: String,

        /// Path to configuration file
        #[arg(long, default_value = "./axis.json")]
        config: PathBuf,

        /// JSON file with filter, sort and pagination overrides
        #[arg(long)]
        body: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
