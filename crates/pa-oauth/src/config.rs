//! Bridge configuration

use pa_types::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Default interval between popup location checks, in milliseconds
const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Bridge configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Interval between popup location checks, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl BridgeConfig {
    /// Poll interval as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> AppResult<BridgeConfig> {
    let contents = fs::read_to_string(path)?;
    let config: BridgeConfig = serde_json::from_str(&contents)?;
    if config.poll_interval_ms == 0 {
        return Err(AppError::Config(
            "poll_interval_ms must be positive".to_string(),
        ));
    }
    debug!("Loaded bridge config from {}", path.display());
    Ok(config)
}

/// Save configuration to a JSON file, creating parent directories as needed
pub fn save_config(path: &Path, config: &BridgeConfig) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)?;
    debug!("Saved bridge config to {}", path.display());
    Ok(())
}
