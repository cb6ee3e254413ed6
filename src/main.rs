//! AllyHub - Main Entry Point
//!
//! Builds the timer and task list, attaches the status-bar presenter and
//! serves the models as MCP tools over stdio. The actual implementation is in
//! the `allyhub` library.

use allyhub::{AllyHub, Config, MainContext, StatusBarPresenter};
use anyhow::{Context, Result, anyhow};
use clap::Parser;
use mcp_attr::server::serve_stdio;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// AllyHub - countdown timer and task list companion served via Model Context Protocol
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file (defaults apply when absent)
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,

    /// Log filter, e.g. "info" or "allyhub=debug"
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// Validate the configuration and exit
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let config = match &args.config_path {
        Some(path) => Config::load(path).context("load config")?,
        None => Config::default(),
    };
    info!(
        total_duration_secs = config.timer.total_duration_secs,
        task_count = config.tasks.seed.len(),
        "configuration loaded"
    );

    if args.dry_run {
        info!("dry-run requested; configuration validated");
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());

    let (context, context_loop) = MainContext::new();
    let loop_shutdown = shutdown.clone();
    let context_task = tokio::spawn(async move {
        tokio::select! {
            _ = context_loop.run() => {}
            _ = loop_shutdown.cancelled() => {}
        }
    });

    let hub = AllyHub::new(context, &config);
    let presenter = StatusBarPresenter::attach(hub.timer().clone(), hub.tasks().clone());
    info!(title = %presenter.view().title, "serving MCP over stdio");

    tokio::select! {
        result = serve_stdio(hub) => {
            result.context("serve MCP over stdio")?;
            info!("client disconnected");
        }
        _ = shutdown.cancelled() => {
            info!("shutdown signal received");
        }
    }

    drop(presenter);
    shutdown.cancel();
    context_task.await.context("join execution context")?;
    info!("shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    // stdout carries the MCP stream
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
