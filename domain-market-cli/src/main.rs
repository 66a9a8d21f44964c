//! `domain-market` operator CLI.
//!
//! Resolves the storage configuration from `DOMAIN_MARKET_*` variables and
//! flags, builds one `AppState`, and runs a single command against it.

mod args;
mod commands;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use domain_market_app::config::StorageConfig;
use domain_market_app::{AppStateBuilder, SelfHealReport, StorageHooks};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use args::Cli;

/// Surfaces database self-heal events on stderr.
struct LogStorageHooks;

#[async_trait]
impl StorageHooks for LogStorageHooks {
    async fn database_recovered(&self, report: &SelfHealReport) {
        tracing::warn!(
            "Database {} was unreadable ({}); recreated empty, old file kept at {}",
            report.database.display(),
            report.reason,
            report.corrupt_copy.display()
        );
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = StorageConfig::from_env().context("invalid DOMAIN_MARKET_* environment")?;
    if let Some(data_dir) = cli.storage.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(storage) = cli.storage.storage {
        config.storage = storage;
    }

    let state = AppStateBuilder::new(config)
        .hooks(Arc::new(LogStorageHooks))
        .build()?;
    commands::run(&state, cli.command).await
}
