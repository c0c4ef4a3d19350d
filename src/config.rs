use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

pub const SNAPSHOT_INTERVAL_MS: u64 = 5_000;
pub const CELLULAR_INTERVAL_MS: u64 = 5_000;
pub const BLUETOOTH_INTERVAL_MS: u64 = 5_000;
pub const ROTATION_WINDOW_MS: u64 = 600_000;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage_root: PathBuf,

    pub snapshot_interval_ms: u64,
    pub cellular_interval_ms: u64,
    pub bluetooth_interval_ms: u64,
    pub rotation_window_ms: u64,

    pub replay: Option<ReplayConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayConfig {
    /// CSV track with `timestamp_ms,lat,lon,accuracy,speed` columns
    pub gps_track: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("survey"),
            snapshot_interval_ms: SNAPSHOT_INTERVAL_MS,
            cellular_interval_ms: CELLULAR_INTERVAL_MS,
            bluetooth_interval_ms: BLUETOOTH_INTERVAL_MS,
            rotation_window_ms: ROTATION_WINDOW_MS,
            replay: None,
        }
    }
}

impl Config {
    /// Every cadence and the rotation window must be non-zero.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("snapshot_interval_ms", self.snapshot_interval_ms),
            ("cellular_interval_ms", self.cellular_interval_ms),
            ("bluetooth_interval_ms", self.bluetooth_interval_ms),
            ("rotation_window_ms", self.rotation_window_ms),
        ] {
            ensure!(value > 0, "{name} must be greater than zero");
        }
        Ok(())
    }

    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_millis(self.snapshot_interval_ms)
    }

    pub fn cellular_interval(&self) -> Duration {
        Duration::from_millis(self.cellular_interval_ms)
    }

    pub fn bluetooth_interval(&self) -> Duration {
        Duration::from_millis(self.bluetooth_interval_ms)
    }
}

pub fn load(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path).context("Failed to read config")?;
    let config: Config = toml::from_str(&data).context("Failed to parse config")?;
    config.validate().context("Invalid config")?;
    Ok(config)
}

/// Loads `path` if it exists, otherwise falls back to the built-in constants.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load(path)
    } else {
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = Config::default();
        assert_eq!(config.snapshot_interval(), Duration::from_secs(5));
        assert_eq!(config.cellular_interval(), Duration::from_secs(5));
        assert_eq!(config.bluetooth_interval(), Duration::from_secs(5));
        assert_eq!(config.rotation_window_ms, 600_000);
        assert!(config.replay.is_none());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surveyor.toml");
        fs::write(
            &path,
            "storage_root = \"/data/survey\"\n\n[replay]\ngps_track = \"track.csv\"\n",
        )
        .unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.storage_root, PathBuf::from("/data/survey"));
        assert_eq!(config.rotation_window_ms, ROTATION_WINDOW_MS);
        assert_eq!(
            config.replay.unwrap().gps_track,
            PathBuf::from("track.csv")
        );
    }

    #[test]
    fn zero_cadence_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surveyor.toml");
        fs::write(&path, "snapshot_interval_ms = 0\n").unwrap();

        let err = load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("snapshot_interval_ms must be greater than zero"));

        fs::write(&path, "rotation_window_ms = 0\n").unwrap();
        assert!(load(&path).is_err());
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_or_default(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.snapshot_interval_ms, SNAPSHOT_INTERVAL_MS);
    }
}
