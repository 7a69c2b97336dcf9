//! Marketplace configuration.
//!
//! Loaded from a JSON file; every field is optional and falls back to its
//! default. Two environment variables override the file:
//!
//! - `MARKET_DATA_DIR`: directory for persisted data (default: in memory)
//! - `MARKET_BACKEND`: `indexed` or `flat` (default: `indexed`)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cart::CartConfig;
use crate::error::MarketError;
use crate::storage::BackendKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: BackendKind,
    /// Where data lives. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub storage: StorageConfig,
    pub cart: CartConfig,
    /// Seed demo users and listings into an empty catalog on open.
    pub seed_sample_data: bool,
    /// Log as JSON lines instead of human-readable text.
    pub json_logs: bool,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            cart: CartConfig::default(),
            seed_sample_data: true,
            json_logs: false,
        }
    }
}

impl MarketConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, MarketError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| MarketError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, MarketError> {
        let config: MarketConfig =
            serde_json::from_str(raw).map_err(|e| MarketError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `MARKET_DATA_DIR` and `MARKET_BACKEND` when set.
    pub fn with_env_overrides(mut self) -> Result<Self, MarketError> {
        if let Ok(dir) = std::env::var("MARKET_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
        if let Ok(backend) = std::env::var("MARKET_BACKEND") {
            self.storage.backend = serde_json::from_value(serde_json::Value::String(backend.clone()))
                .map_err(|_| MarketError::Config(format!("unknown backend {:?}", backend)))?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), MarketError> {
        let rate = self.cart.fee_rate;
        if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
            return Err(MarketError::Config(format!("fee_rate must be in [0, 1], got {}", rate)));
        }
        if self.cart.max_quantity == 0 {
            return Err(MarketError::Config("max_quantity must be at least 1".into()));
        }
        Ok(())
    }
}
