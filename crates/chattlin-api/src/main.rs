//! Chattlin CLI and REST API entry point.
//!
//! Binary name: `chattlin`
//!
//! Parses CLI arguments, initializes the store and services, then dispatches
//! to the appropriate command handler or starts the REST API server.

mod background;
mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use tokio_util::sync::CancellationToken;

use chattlin_observe::{TracingOptions, init_tracing, shutdown_tracing};
use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut tracing_options = TracingOptions::for_verbosity(cli.verbose, cli.quiet);
    tracing_options.enable_otel = cli.otel;
    if let Err(e) = init_tracing(&tracing_options) {
        eprintln!("failed to initialize tracing: {e}");
    }

    // Neither needs app state
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "chattlin", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Relay { command } => {
            return cli::relay::handle_relay_command(command, cli.json);
        }
        _ => {}
    }

    let in_memory = matches!(cli.command, Commands::Serve { in_memory: true, .. });
    let state = AppState::init(in_memory).await?;

    let result = match cli.command {
        Commands::Serve { port, host, .. } => serve(state, host, port, cli.quiet).await,
        Commands::CheckVersion => cli::version::check_version(&state, cli.json).await,
        Commands::Version => cli::version::show_version(&state, cli.json).await,
        Commands::Kv { command } => cli::kv::handle_kv_command(command, &state, cli.json).await,
        Commands::Completions { .. } | Commands::Relay { .. } => unreachable!("handled above"),
    };

    shutdown_tracing();
    result
}

async fn serve(
    state: AppState,
    host: Option<String>,
    port: Option<u16>,
    quiet: bool,
) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| state.config.server.host.clone());
    let port = port.unwrap_or(state.config.server.port);
    let cancel = CancellationToken::new();

    let scheduler = background::start_version_schedule(&state).await?;
    let bridge = background::spawn_analytics_bridge(&state, cancel.clone())?;

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    if !quiet {
        println!();
        println!(
            "  {} Chattlin API listening on {}",
            console::style("⚡").bold(),
            console::style(format!("http://{addr}/api/v1")).cyan()
        );
        println!(
            "  {}",
            console::style(format!(
                "environment {} · store {} · analytics {}",
                state.config.environment,
                state.kv_store.backend(),
                if bridge.is_some() { "on" } else { "off" },
            ))
            .dim()
        );
        println!("  {}", console::style("Press Ctrl+C to stop").dim());
    }

    let router = http::router::build_router(state);
    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    cancel.cancel();
    if let Err(e) = scheduler.stop().await {
        tracing::warn!(error = %e, "scheduler did not stop cleanly");
    }
    if let Some(handle) = bridge {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "analytics bridge task failed");
        }
    }

    served?;
    if !quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
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

    tracing::info!("shutdown signal received");
}
