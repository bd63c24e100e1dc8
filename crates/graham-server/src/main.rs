// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Graham Bridge — loopback print bridge for Braille Ready Format jobs.
//
// Entry point. Initialises logging, resolves configuration, picks the OS print
// backend and serves the HTTP API until Ctrl-C.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use graham_bridge::{PrintBackend, platform_backend};
use graham_core::error::{BridgeError, Result};
use graham_print::{JobJournal, PrintService};
use graham_server::cli::Cli;
use graham_server::{AppStateInner, router};
use tokio::net::TcpListener;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "graham bridge stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.resolve_config()?;

    let backend: Arc<dyn PrintBackend> = platform_backend(&config)?.into();
    let journal = Arc::new(JobJournal::new(config.history_capacity, config.mailbox_size));
    let service = PrintService::new(backend, journal);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let state = AppStateInner::new(service.clone(), shutdown_rx);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr).await.map_err(|source| BridgeError::Bind {
        addr: addr.to_string(),
        source,
    })?;

    tracing::info!(
        %addr,
        backend = service.backend_name(),
        history = config.history_capacity,
        "graham bridge listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            wait_for_signal().await;
            tracing::info!("shutdown requested");
            // Ends every open log stream so the graceful drain can finish.
            let _ = shutdown_tx.send(true);
        })
        .await?;

    tracing::info!("graham bridge stopped cleanly");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            tracing::warn!(error = %e, "cannot watch SIGTERM, Ctrl-C only");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot watch Ctrl-C");
        std::future::pending::<()>().await;
    }
}
