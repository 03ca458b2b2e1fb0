// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! matchd — host process wiring `match-engine` to a concrete registry and
//! a demonstration match core.
//!
//! Architecture:
//! - `Registry`: in-process collaborator implementing label/removal bookkeeping
//! - One `MatchHandler` per live match, each with its own dispatcher task
//! - Signal handling for graceful shutdown: every live match is `stop()`ed

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;
mod echo_core;
mod registry;

use std::collections::HashMap;
use std::sync::Arc;

use match_core::MatchId;
use match_engine::{Collaborators, MatchConfig, MatchHandler, MatchStream};
use parking_lot::Mutex;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use crate::config::Config;
use crate::echo_core::EchoCore;
use crate::registry::{LoggingRouter, LoggingTracker, Registry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("matchd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                println!("matchd {}", env!("CARGO_PKG_VERSION"));
                println!("Authoritative realtime match runtime host process");
                return Ok(());
            }
            other => {
                eprintln!("error: unexpected argument '{other}'");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;
    let _log_guard = setup_logging(&config)?;

    info!(node = %config.node, "starting matchd");

    let registry = Registry::new();
    let tracker = Arc::new(LoggingTracker);
    let router = Arc::new(LoggingRouter);
    let live_matches: Arc<Mutex<Vec<MatchHandler>>> = Arc::new(Mutex::new(Vec::new()));

    let handler = spawn_match(&config, Arc::clone(&registry), Arc::clone(&tracker), Arc::clone(&router)).await?;
    info!(match_id = %handler.id_str(), "demo match started");
    live_matches.lock().push(handler);

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!("matchd ready");

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    for handler in live_matches.lock().drain(..) {
        handler.stop();
    }

    info!(live_matches = registry.live_count(), "matchd stopped");
    Ok(())
}

async fn spawn_match(
    config: &Config,
    registry: Arc<Registry>,
    tracker: Arc<LoggingTracker>,
    router: Arc<LoggingRouter>,
) -> Result<MatchHandler, Box<dyn std::error::Error>> {
    let id = MatchId::new_v4();
    let stream = MatchStream::new(id, config.node.clone());
    let core = EchoCore { stream };
    let collaborators = Collaborators {
        registry,
        tracker,
        router,
    };

    let handler = MatchHandler::new(
        id,
        config.node.clone(),
        core,
        HashMap::new(),
        config.default_match_config,
        collaborators,
    )
    .await
    .map_err(|e| {
        error!(error = %e, "failed to start demo match");
        e
    })?;

    Ok(handler)
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, config::ConfigError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or(config::ConfigError::NoStateDir)?,
        config
            .log_path
            .file_name()
            .ok_or(config::ConfigError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
