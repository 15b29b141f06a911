//! CLI module for tagstore
//!
//! Provides command-line interface for:
//! - check: Decode and validate a record document
//! - compile: Turn a query envelope into a store filter
//! - query: Run a query in memory and through the store, and compare

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    check, check_request, compile, compile_request, query, query_request, run, run_command, Config, Session,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_response};
