//! IPPAN handle picker
//!
//! Interactive first-run flow: every stdin line replaces the handle being
//! typed, `:commit` claims it once available, `:quit` leaves.

mod app_config;
mod prompt;

use anyhow::{Context, Result};
use app_config::AppConfig;
use clap::Parser;
use ippan_handle_resolver::{
    CommitOutcome, HandleResolver, InMemoryHandleRegistry, ResolverSnapshot,
};
use prompt::{render, PromptLine};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "ippan-handle")]
#[command(about = "Pick a handle for a new IPPAN identity", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level; RUST_LOG takes precedence
    #[arg(long)]
    log_level: Option<String>,

    /// Handle to treat as already registered (repeatable)
    #[arg(long = "taken", value_name = "HANDLE")]
    taken: Vec<String>,

    /// Simulated registry round-trip in milliseconds
    #[arg(long)]
    latency_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(latency_ms) = cli.latency_ms {
        config.latency_ms = latency_ms;
    }
    config.taken.extend(cli.taken);

    init_logging(&config)?;

    let registry = Arc::new(
        InMemoryHandleRegistry::with_taken(config.taken_handles()).with_latency(config.latency()),
    );
    let resolver = HandleResolver::new(registry.clone(), registry.clone(), &config.resolver);
    let printer = tokio::spawn(print_updates(resolver.subscribe()));

    info!(
        debounce_ms = config.resolver.debounce_ms,
        taken = config.taken.len(),
        "handle picker ready"
    );
    println!("{}", render(&resolver.snapshot()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match PromptLine::parse(&line) {
            PromptLine::Quit => break,
            PromptLine::Input(text) => resolver.on_input_changed(text),
            PromptLine::Commit => match resolver.commit().await {
                Ok(CommitOutcome::Created(handle)) => {
                    println!("identity created for {handle}");
                    break;
                }
                Ok(CommitOutcome::NotReady) => {
                    println!("nothing to commit while {}", resolver.status());
                }
                Err(err) => eprintln!("commit failed: {err}"),
            },
        }
    }

    drop(resolver);
    printer.await.context("status printer panicked")?;
    debug!(queries = registry.query_count(), "handle picker finished");
    Ok(())
}

async fn print_updates(mut updates: watch::Receiver<ResolverSnapshot>) {
    while updates.changed().await.is_ok() {
        let snapshot = updates.borrow_and_update().clone();
        println!("{}", render(&snapshot));
    }
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}
