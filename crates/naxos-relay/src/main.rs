use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use naxos_common::RelayError;
use naxos_config::{config_to_json, load_config, LoggingConfig};
use naxos_presence::{HttpNotifier, PresenceTracker};
use naxos_relay::{serve, spawn_stats, Gate};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "naxos-relay", about = "WebSocket presence relay for the naxos forum")]
struct Args {
    /// Optional TOML config file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the resolved configuration as JSON and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), RelayError> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    if args.check {
        println!("{}", config_to_json(&config));
        return Ok(());
    }

    init_tracing(&config.logging);
    match &args.config {
        Some(path) => tracing::info!("Loaded config from {}", path.display()),
        None => tracing::info!("Using built-in defaults and environment"),
    }

    let notifier = HttpNotifier::new(&config.backend, config.logging.debug)?;
    tracing::info!(
        backend = %notifier.endpoint(),
        method = ?config.backend.method,
        debounce_ms = config.presence.debounce_ms,
        "Backend notifier ready"
    );

    let tracker = PresenceTracker::new(Arc::new(notifier), config.presence.debounce());
    let gate = Gate::new(config.server.session_cookie.as_str());

    let addr = config.server.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("naxos-relay listening on {}", addr);

    spawn_stats(
        tracker.clone(),
        Duration::from_secs(config.server.stats_interval_secs),
    );

    tokio::select! {
        _ = serve(listener, gate, tracker) => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Signal handler failed");
            }
            tracing::info!("Shutting down");
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(logging).into()),
        )
        .init();
}

/// Filter used when `RUST_LOG` is unset. `debug = true` overrides the level.
fn default_filter(logging: &LoggingConfig) -> String {
    let level = if logging.debug { "debug" } else { logging.level.as_str() };
    format!("naxos_relay={level},naxos_presence={level}")
}
