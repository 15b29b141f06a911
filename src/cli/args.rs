//! CLI argument definitions using clap
//!
//! Commands:
//! - tagstore check --config <path>
//! - tagstore compile --config <path>
//! - tagstore query --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tagstore - typed metadata records and queries
#[derive(Parser, Debug)]
#[command(name = "tagstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode and validate a record document read from stdin
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./tagstore.json")]
        config: PathBuf,
    },

    /// Compile a query envelope read from stdin into a store filter
    Compile {
        /// Path to configuration file
        #[arg(long, default_value = "./tagstore.json")]
        config: PathBuf,
    },

    /// Run a query over records read from stdin, in memory and through the store
    Query {
        /// Path to configuration file
        #[arg(long, default_value = "./tagstore.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
