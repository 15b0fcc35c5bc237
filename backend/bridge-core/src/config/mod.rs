use crate::error::ConfigError;

use common::ErrorLocation;
use common::protocol::STATE_UPDATE_EVENT;

use std::panic::Location;
use std::path::Path;
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "statebridge.json";
const MIN_SWEEP_INTERVAL_MS: u64 = 50;
const MAX_SWEEP_INTERVAL_MS: u64 = 60_000;

// ============================================
// CONFIG STRUCT
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Channel the snapshots are emitted on.
    #[serde(default = "default_event_name")]
    pub event_name: String,

    /// Period of the liveness and discovery sweep.
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,

    /// Skip a broadcast identical to the previous one.
    #[serde(default = "default_true")]
    pub dedupe_broadcasts: bool,

    /// Retry a failed delivery once before evicting the consumer.
    #[serde(default = "default_true")]
    pub retry_failed_delivery: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            event_name: default_event_name(),
            sweep_interval_ms: default_sweep_interval_ms(),
            dedupe_broadcasts: default_true(),
            retry_failed_delivery: default_true(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_event_name() -> String {
    STATE_UPDATE_EVENT.to_string()
}
fn default_sweep_interval_ms() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}

// ============================================
// IMPLEMENTATION
// ============================================

impl BridgeConfig {
    /// Load config from {config_dir}/statebridge.json.
    ///
    /// # Returns
    ///
    /// Returns defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read, parsed
    /// or validated.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Bridge config not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read bridge config: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: BridgeConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse bridge config: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Bridge config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "event_name cannot be empty".to_string(),
            });
        }

        if !(MIN_SWEEP_INTERVAL_MS..=MAX_SWEEP_INTERVAL_MS).contains(&self.sweep_interval_ms) {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid sweep interval: {} ms (must be {}-{})",
                    self.sweep_interval_ms, MIN_SWEEP_INTERVAL_MS, MAX_SWEEP_INTERVAL_MS
                ),
            });
        }

        Ok(())
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}
