//! Showroom CLI and HTTP entry point.
//!
//! Binary name: `showroom`
//!
//! Parses CLI arguments, initializes configuration, database and the
//! conversation core, then dispatches to the command handler or starts the
//! HTTP transport.

mod cli;
mod http;
mod state;

use std::time::Duration;

use clap::Parser;
use clap_complete::generate;
use tokio_util::sync::CancellationToken;

use cli::{Cli, Commands};
use state::AppState;

/// How often idle sessions are swept.
const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,showroom=debug",
        _ => "trace",
    };
    showroom_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "showroom", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;

    let result = match cli.command {
        Commands::Serve { port, host } => serve(state, &host, port).await,
        Commands::Chat { user } => cli::chat::loop_runner::run_chat_loop(&state, &user).await,
        Commands::Seed { file } => cli::seed::seed(&state, &file, cli.json).await,
        Commands::Status => cli::status::status(&state, cli.json).await,
        Commands::Completions { .. } => Ok(()),
    };

    showroom_observe::tracing_setup::shutdown_tracing();
    result
}

async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!(
        "  {} Showroom listening on {}",
        console::style("*").bold(),
        console::style(format!("http://{addr}/api/v1")).cyan()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let cancel = CancellationToken::new();
    let evictor = tokio::spawn(run_evictor(state.clone(), cancel.clone()));

    let router = http::router::build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    if let Err(e) = evictor.await {
        tracing::error!(error = %e, "session evictor task failed");
    }
    println!("\n  Server stopped.");
    Ok(())
}

/// Drop sessions idle past the configured timeout, once a minute.
async fn run_evictor(state: AppState, cancel: CancellationToken) {
    let max_idle = state.session_idle_timeout();
    let mut ticker = tokio::time::interval(EVICTION_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                state.conversation.evict_idle(max_idle);
            }
        }
    }
    tracing::debug!("session evictor stopped");
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
