// crates/harvest-daemon/src/main.rs
//
// Binary entrypoint for the Harvest daemon.
//
// Parses CLI arguments, loads configuration, initializes tracing, opens
// the store, restores or creates the platform state, and serves the
// JSON-RPC endpoint until interrupted.

mod bootstrap;
mod config;
mod event_log;
mod shared;
mod state;

use std::sync::Arc;

use clap::Parser;
use config::DaemonConfig;
use shared::DaemonSharedState;
use state::{NodeState, NodeStateMachine};

use harvest_core::clock::SystemClock;
use harvest_rpc::{HarvestRpcServer, RpcConfig};
use harvest_store::{MemoryStore, RocksStore, StateStore};

/// Harvest Protocol daemon.
#[derive(Parser, Debug)]
#[command(name = "harvest-daemon", version = "0.1.0", about = "Harvest Protocol node daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.harvest/daemon.toml")]
    config: String,

    /// Keep all state in memory; nothing survives a restart.
    #[arg(long)]
    ephemeral: bool,

    /// Override the configured RPC port.
    #[arg(long)]
    rpc_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Config is read before tracing starts so `log_level` can apply.
    let config_path = expand_tilde(&args.config);
    let loaded = DaemonConfig::load(&config_path);
    let mut daemon_config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => DaemonConfig::default(),
    };
    if let Some(port) = args.rpc_port {
        daemon_config.rpc_port = port;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&daemon_config.log_level)),
        )
        .init();

    match &loaded {
        Ok(_) => tracing::info!("Loaded configuration from {}", config_path),
        Err(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            config_path,
            e
        ),
    }

    tracing::info!("Harvest Protocol Daemon v0.1.0");
    tracing::info!(
        "RPC endpoint: {}:{}",
        daemon_config.rpc_host,
        daemon_config.rpc_port
    );

    let mut state_machine = NodeStateMachine::new();

    let store: Arc<dyn StateStore> = if args.ephemeral {
        tracing::warn!("Ephemeral mode: state is kept in memory only");
        Arc::new(MemoryStore::new())
    } else {
        let data_dir = expand_tilde(&daemon_config.data_dir);
        std::fs::create_dir_all(&data_dir)?;
        let db_path = format!("{}/rocksdb", data_dir);
        let store = RocksStore::open(&db_path)?;
        tracing::info!("RocksDB opened at {}", db_path);
        Arc::new(store)
    };

    state_machine.transition(NodeState::Restoring)?;
    let platform =
        bootstrap::restore_or_genesis(store.as_ref(), &daemon_config, Arc::new(SystemClock)).await?;
    tracing::info!(height = platform.height(), "Platform ready");

    let shared_state = DaemonSharedState::new(platform, store);

    tokio::spawn(event_log::run_event_logger(
        shared_state.events_tx.subscribe(),
    ));

    let rpc_config = RpcConfig {
        host: daemon_config.rpc_host.clone(),
        port: daemon_config.rpc_port,
    };
    let rpc_server = HarvestRpcServer::new(
        rpc_config,
        shared_state.platform.clone(),
        shared_state.store.clone(),
    )
    .with_event_sender(shared_state.events_tx.clone())
    .with_start_time(shared_state.start_time);

    state_machine.transition(NodeState::Ready)?;

    tokio::select! {
        result = rpc_server.start() => {
            if let Err(e) = result {
                tracing::error!("RPC server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupt received");
        }
    }

    let _ = state_machine.transition(NodeState::ShuttingDown);
    tracing::info!(
        height = shared_state.platform.read().await.height(),
        "Harvest daemon shut down gracefully"
    );

    Ok(())
}

/// Expand `~` at the start of a path to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
