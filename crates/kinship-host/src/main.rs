//! Host binary for the Kinship relationship state core.
//!
//! Loads configuration, opens the save slot, builds the host session, and
//! runs the day loop until the day limit or Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `kinship-config.yaml` (or the path given as
//!    the first argument, or `KINSHIP_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Open the JSON save slot under `persistence.save_dir`
//! 4. Build the host session on an in-process hub
//! 5. Load the world: read the save, repair, broadcast
//! 6. Run the day loop
//! 7. Log the result

mod error;
mod report;

use std::path::PathBuf;

use kinship_core::config::LoggingConfig;
use kinship_core::{KinshipConfig, LocalHub, RunOptions, SessionBuilder, runner};
use kinship_db::{JsonFileSlot, SaveGateway};
use kinship_types::Role;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::HostError;
use crate::report::WorkReport;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "KINSHIP_CONFIG";

/// Default configuration file name.
const DEFAULT_CONFIG: &str = "kinship-config.yaml";

/// Application entry point for the host.
///
/// # Errors
///
/// Returns an error if configuration, the save slot, or world load fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = config_path();
    let config = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        config = %config_path.display(),
        role = %config.session.role,
        player = %config.session.local_player_id,
        save_dir = %config.persistence.save_dir.display(),
        tick_interval_ms = config.session.tick_interval_ms,
        "kinship-host starting"
    );

    if config.session.role != Role::Host {
        return Err(HostError::Role {
            message: String::from("peers join through the hosting game's channel"),
        }
        .into());
    }

    // 3. Open the save slot.
    let slot = JsonFileSlot::open(&config.persistence.save_dir).map_err(HostError::from)?;
    let gateway = SaveGateway::new(slot);
    info!(key = gateway.key(), "Save slot opened");

    // 4. Build the session.
    let local_player = config.session.local_player_id;
    let options = RunOptions::from_config(&config.session);
    let (hub, mut inbox) = LocalHub::new(local_player);
    let mut host = SessionBuilder::new(Role::Host)
        .local_player(local_player)
        .outbox(hub.outbox(local_player))
        .gateway(gateway)
        .config(config)
        .build()
        .map_err(HostError::from)?
        .into_host()
        .ok_or_else(|| HostError::Role {
            message: String::from("session was not built as host"),
        })?;

    // 5. Load the world.
    let repairs = host.world_loaded().map_err(HostError::from)?;
    info!(
        day = host.day(),
        repairs = repairs.total(),
        peers = hub.peers().len(),
        "World ready, entering day loop"
    );

    // 6. Run until the day limit or Ctrl-C.
    let (shutdown_tx, mut shutdown) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
        }
        let _ = shutdown_tx.send(true);
    });

    let mut callback = WorkReport::default();
    let result = runner::run_host(&mut host, &mut inbox, &mut shutdown, &mut callback, options).await;

    // 7. Log results.
    info!(
        end_reason = ?result.end_reason,
        days_run = result.days_run,
        reported_days = callback.days(),
        "kinship-host shutdown complete"
    );

    Ok(())
}

/// Configuration path: first argument, then `KINSHIP_CONFIG`, then the
/// default file name in the working directory.
fn config_path() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
}

/// Load the configuration, falling back to defaults if the file is absent.
fn load_config(path: &std::path::Path) -> Result<KinshipConfig, HostError> {
    if path.exists() {
        Ok(KinshipConfig::from_file(path)?)
    } else {
        let mut config = KinshipConfig::default();
        config.persistence.apply_env_overrides();
        Ok(config)
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
