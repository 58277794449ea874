mod commands;
mod error;
mod notify;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::commands::{completions, leads, submit, Context};
use crate::error::{exit_code_for, report_error};
use assurconnect_config as config;
use assurconnect_dispatch::{DispatchSettings, Endpoints, WebhookDispatcher};
use assurconnect_store::{paths, LeadStore};

/// Upper bound on how long the process lingers for webhook calls before exiting.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(15);

#[derive(Debug, Parser)]
#[command(name = "assurconnect", version, about = "assurconnect lead capture CLI")]
struct Cli {
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit a quote request form
    #[command(subcommand)]
    Submit(submit::SubmitCommand),
    /// List captured leads, most recent first
    List(leads::ListArgs),
    /// Write every lead to a CSV file
    Export(leads::ExportArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        json,
        verbose,
        command,
    } = cli;

    match command {
        Command::Completions(args) => completions::emit(args),
        Command::Submit(cmd) => with_store(db_path, config_path, json, verbose, |ctx| {
            submit::submit(ctx, cmd)
        }),
        Command::List(args) => with_store(db_path, config_path, json, verbose, |ctx| {
            leads::list_leads(ctx, args)
        }),
        Command::Export(args) => with_store(db_path, config_path, json, verbose, |ctx| {
            leads::export_leads(ctx, args)
        }),
    }
}

/// Wires config, webhook dispatcher, store and notifier, runs `action`, then
/// gives in-flight webhook calls a bounded chance to finish.
fn with_store<F>(
    db_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    json: bool,
    verbose: bool,
    action: F,
) -> Result<()>
where
    F: FnOnce(&Context<'_>) -> Result<()>,
{
    let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
    if verbose {
        match config::resolve_config_path(config_path) {
            Ok(path) => {
                if path.exists() {
                    debug!(path = %path.display(), "config resolved");
                } else {
                    debug!(path = %path.display(), "config missing, using defaults");
                }
            }
            Err(err) => {
                debug!(error = %err, "config unavailable");
            }
        }
    }

    let runtime = tokio::runtime::Runtime::new().with_context(|| "start async runtime")?;
    let endpoints = Endpoints::new(app_config.endpoints.clone());
    if verbose {
        for category in endpoints.missing() {
            debug!(category = %category, "no webhook configured");
        }
    }
    let dispatcher = Arc::new(
        WebhookDispatcher::new(
            endpoints,
            DispatchSettings {
                enabled: app_config.dispatch.enabled,
                timeout: Duration::from_secs(app_config.dispatch.timeout_seconds),
                user_agent: app_config.dispatch.user_agent.clone(),
            },
            runtime.handle().clone(),
        )
        .with_context(|| "build webhook client")?,
    );

    let db_path = paths::resolve_db_path(db_path).with_context(|| "resolve database path")?;
    if verbose {
        debug!(path = %db_path.display(), "database path resolved");
    }
    let store = LeadStore::open(&db_path, dispatcher.clone())
        .with_context(|| format!("open database {}", db_path.display()))?;

    let notifier = notify::build_notifier(&app_config.notifications)?;
    let ctx = Context {
        store: &store,
        json,
        notifier: notifier.as_deref(),
    };

    let result = action(&ctx);

    if !runtime.block_on(dispatcher.drain(SHUTDOWN_GRACE)) {
        debug!("exiting with lead dispatch still pending");
    }
    result
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
