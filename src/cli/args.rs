//! CLI argument definitions using clap
//!
//! Commands:
//! - citeaudit serve [--config <path>]
//! - citeaudit audit [--config <path>] [--input <file>]
//! - citeaudit fact-check [--config <path>] [--input <file>] [--source <kind>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::fact_check::SourceFilter;

/// citeaudit - verify citation claims against academic metadata
#[derive(Parser, Debug)]
#[command(name = "citeaudit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP audit service
    Serve {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Audit text once and write NDJSON verdicts to stdout
    Audit {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// File holding the text to audit (reads stdin when omitted)
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Verify one claim and write a JSON verdict to stdout
    FactCheck {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// File holding the claim (reads stdin when omitted)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Kind of sources to check against: academic, news, social,
        /// authoritative or all
        #[arg(long, default_value = "all")]
        source: SourceFilter,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["citeaudit", "serve", "--config", "app.json"]).unwrap();
        match cli.command {
            Command::Serve { config } => assert_eq!(config, Some(PathBuf::from("app.json"))),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_audit_without_options() {
        let cli = Cli::try_parse_from(["citeaudit", "audit"]).unwrap();
        match cli.command {
            Command::Audit { config, input } => {
                assert!(config.is_none());
                assert!(input.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["citeaudit", "start"]).is_err());
    }

    #[test]
    fn test_parse_fact_check() {
        let cli = Cli::try_parse_from(["citeaudit", "fact-check", "--source", "news"]).unwrap();
        match cli.command {
            Command::FactCheck { source, input, .. } => {
                assert_eq!(source, SourceFilter::News);
                assert!(input.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["citeaudit", "fact-check"]).unwrap();
        assert!(matches!(cli.command, Command::FactCheck { source: SourceFilter::All, .. }));

        assert!(Cli::try_parse_from(["citeaudit", "fact-check", "--source", "blogs"]).is_err());
    }
}
