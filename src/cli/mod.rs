//! CLI module for citeaudit
//!
//! Provides command-line interface for:
//! - serve: Run the HTTP audit service
//! - audit: One-shot audit of a file or stdin, NDJSON on stdout
//! - fact-check: Verify one claim, JSON verdict on stdout

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{audit, fact_check, run, run_command, serve};
pub use config::{AppConfig, AuditConfig};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_text, write_json, write_line};
