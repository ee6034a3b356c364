//! Host identity resolution daemon: wires the `accounts-core` caching and
//! refresh engine to an HTTP-backed `AccountSource` and a Unix-socket
//! query server, with graceful shutdown and an optional PID file.

mod config;
mod error;
mod pidfile;
mod server;

use std::path::PathBuf;
use std::sync::Arc;

use accounts_core::clock::SystemClock;
use accounts_core::Directory;
use accounts_source::HttpAccountSource;
use clap::Parser;
use tokio::net::UnixListener;

use config::Config;
use error::DaemonError;
use pidfile::PidFile;

/// Host-side identity resolution daemon.
#[derive(Parser, Debug)]
#[command(name = "accounts-daemon", version, about)]
struct Args {
    /// Path to the daemon's TOML configuration file.
    #[arg(long, short = 'c', default_value = "/etc/accounts-daemon/config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let args = Args::parse();
    init_logging();

    match run(args).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "daemon exited with an error");
            std::process::ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

async fn run(args: Args) -> Result<(), DaemonError> {
    let config = Config::load(&args.config).await?;

    let pid_file = match &config.pid_file {
        Some(path) => Some(PidFile::write(path).await?),
        None => None,
    };

    let source = HttpAccountSource::new(config.source.to_source_config())
        .map_err(|error| DaemonError::Source(error.to_string()))?;
    let clock = Arc::new(SystemClock::new());

    tracing::info!(socket = %config.socket_path.display(), "performing bootstrap refresh");
    let directory = Directory::new(config.refresh_config(), clock, Arc::new(source)).await;

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)
            .map_err(|error| DaemonError::Socket(format!("removing stale socket: {error}")))?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|error| DaemonError::Socket(format!("binding {}: {error}", config.socket_path.display())))?;
    tracing::info!(socket = %config.socket_path.display(), "listening");

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let server_task = tokio::spawn(server::serve(listener, directory, shutdown_rx));

    wait_for_shutdown_signal().await;
    tracing::info!("shutdown signal received");
    let _ = shutdown_tx.send(true);
    let _ = server_task.await;

    if let Some(pid_file) = pid_file {
        pid_file.remove().await;
    }
    let _ = std::fs::remove_file(&config.socket_path);

    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = tokio::signal::ctrl_c() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
