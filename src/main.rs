use std::path::PathBuf;

use anyhow::{Context, Result};
use surveyor::{
    config,
    logging,
    platform::{self, Platform},
    scheduler::Session,
};

const CONFIG_VAR: &str = "SURVEYOR_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let path = match dotenvy::var(CONFIG_VAR) {
        Ok(x) => PathBuf::from(x),
        Err(_) => PathBuf::from("surveyor.toml"),
    };
    let config = config::load_or_default(&path)?;

    let platform = match &config.replay {
        Some(replay) => platform::replay::platform(replay)?,
        None => {
            tracing::warn!("No sources configured, readings will only carry timestamps");
            Platform::default()
        }
    };

    let session = Session::start(&config, platform);
    tracing::info!(root = %session.layout().root().display(), "Collecting");

    let signal = tokio::signal::ctrl_c().await;
    session.shutdown().await;
    signal.context("Failed to listen for shutdown signal")
}
