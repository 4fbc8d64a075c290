//! CLI command implementations

use std::io;
use std::path::Path;
use std::sync::Arc;

use futures_util::StreamExt;
use tracing::info;

use crate::audit::{validate_text, AuditOrchestrator};
use crate::fact_check::{FactChecker, SourceFilter};
use crate::http_server::HttpServer;
use crate::observability::{logging, MetricsRegistry};
use crate::providers::build_collaborators;

use super::args::Command;
use super::config::AppConfig;
use super::errors::{CliError, CliResult};
use super::io::{read_text, write_json, write_line};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    // A missing .env file is normal outside development.
    dotenv::dotenv().ok();

    match cmd {
        Command::Serve { config } => serve(config.as_deref()),
        Command::Audit { config, input } => audit(config.as_deref(), input.as_deref()),
        Command::FactCheck {
            config,
            input,
            source,
        } => fact_check(config.as_deref(), input.as_deref(), source),
    }
}

/// Configured services sharing one metrics registry
struct Services {
    config: AppConfig,
    orchestrator: AuditOrchestrator,
    fact_checker: FactChecker,
}

/// Load config, install logging and wire the production collaborators.
fn prepare(config_path: Option<&Path>) -> CliResult<Services> {
    let config = AppConfig::load(config_path)?;
    logging::init(config.log_format);

    let timeout = config.audit.remote_timeout();
    let providers = build_collaborators(&config.providers, timeout)
        .map_err(|e| CliError::config_error(e.to_string()))?;
    let metrics = Arc::new(MetricsRegistry::new());
    let orchestrator = AuditOrchestrator::new(providers.collaborators, timeout, Arc::clone(&metrics));
    let fact_checker = FactChecker::new(providers.claims, timeout, metrics);
    Ok(Services {
        config,
        orchestrator,
        fact_checker,
    })
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::startup_failed(format!("Failed to create tokio runtime: {}", e)))
}

/// Start the HTTP audit service
pub fn serve(config_path: Option<&Path>) -> CliResult<()> {
    let services = prepare(config_path)?;
    let config = services.config;
    let server = HttpServer::new(
        config.server.clone(),
        &config.rate_limit,
        Arc::new(services.orchestrator),
        Arc::new(services.fact_checker),
    );

    runtime()?.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::startup_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Audit one text and stream NDJSON lines to stdout as they complete.
///
/// Input is validated before any collaborator is configured, so rejected
/// text fails even without credentials.
pub fn audit(config_path: Option<&Path>, input: Option<&Path>) -> CliResult<()> {
    let text = read_text(input)?;
    validate_text(&text)?;

    let orchestrator = prepare(config_path)?.orchestrator;
    runtime()?.block_on(async {
        let mut lines = orchestrator.start(text)?;
        let mut stdout = io::stdout();
        let mut emitted = 0usize;
        while let Some(line) = lines.next().await {
            write_line(&mut stdout, &line)?;
            emitted += 1;
        }
        info!(lines = emitted, "Audit complete");
        Ok::<(), CliError>(())
    })
}

/// Check one claim and write the verdict as a JSON line to stdout.
pub fn fact_check(config_path: Option<&Path>, input: Option<&Path>, source: SourceFilter) -> CliResult<()> {
    let text = read_text(input)?;
    validate_text(&text)?;

    let checker = prepare(config_path)?.fact_checker;
    let result = runtime()?.block_on(checker.verify_claim(text.trim(), source))?;
    write_json(&mut io::stdout(), &result)
}
