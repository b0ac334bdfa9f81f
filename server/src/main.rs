//! Hero-Wars server
//!
//! Reads host events from stdin, writes messages, menus and actor requests
//! to stdout, and drives cooldown timers at the configured tick rate.

use herowars_server::config::{Config, DEFAULT_CONFIG_PATH};
use herowars_server::host::JsonLines;
use herowars_server::persistence;
use herowars_server::registry::PlayerRegistry;
use herowars_server::router::{GameEvent, Router};
use herowars_shared::content;
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting Hero-Wars server...");

    let config_path = std::env::var_os("HEROWARS_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = Config::load_or_default(&config_path)?;

    let catalog = content::default_catalog()?;
    config.validate(&catalog)?;
    info!(
        "Registered {} heroes and {} items",
        catalog.heroes().len(),
        catalog.items().len()
    );

    let database = persistence::init(&config.database_url).await?;
    let registry = PlayerRegistry::new(
        database,
        Arc::new(catalog),
        Arc::new(config.exp_curve.clone()),
        config.starting_heroes.clone(),
    );

    let tick = Duration::from_secs_f64(1.0 / f64::from(config.tick_rate));
    info!("Tick rate: {} Hz", config.tick_rate);

    let mut router = Router::new(
        registry,
        config,
        JsonLines::new(std::io::stdout()),
        JsonLines::new(std::io::stdout()),
    );
    router.announce_loaded();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Host closed stdin");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<GameEvent>(&line) {
                    Ok(event) => {
                        if let Err(e) = router.handle(event).await {
                            error!("Failed to handle event: {}", e);
                        }
                    }
                    Err(e) => warn!("Ignoring malformed event {:?}: {}", line, e),
                }
            }
            _ = interval.tick() => {
                router.tick(tick.as_secs_f32());
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down...");
                break;
            }
        }
    }

    let saved = router.unload().await?;
    info!("Saved {} players, bye", saved);
    Ok(())
}
