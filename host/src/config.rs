use std::fs;
use std::path::Path;

use crash_core::constants::FRAME_INTERVAL_MS;
use crash_core::{EngineConfig, GraphStyle};
use serde::{Deserialize, Serialize};

/// Largest config file accepted (1 MB)
pub const MAX_CONFIG_SIZE: u64 = 1024 * 1024;

pub const DEFAULT_WIDTH: f64 = 800.0;
pub const DEFAULT_HEIGHT: f64 = 450.0;

/// Everything the shell can be configured with; missing keys take defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub graph: GraphStyle,
    pub frame_interval_ms: u64,
    pub width: f64,
    pub height: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            graph: GraphStyle::default(),
            frame_interval_ms: FRAME_INTERVAL_MS,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: AppConfig =
            serde_json::from_str(raw).map_err(|e| format!("Error parsing config JSON: {}", e))?;
        config.engine.validate()?;
        if !(config.width > 0.0 && config.height > 0.0) {
            return Err(format!(
                "Invalid surface size: {}x{} (both must be > 0)",
                config.width, config.height
            )
            .into());
        }
        Ok(config)
    }
}

/// Read and validate a JSON config file
pub fn load_config(path: &Path) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let metadata = fs::metadata(path)
        .map_err(|e| format!("Error accessing config '{}': {}", path.display(), e))?;
    if metadata.len() > MAX_CONFIG_SIZE {
        return Err(format!(
            "Config file too large: {} bytes (max {} bytes)",
            metadata.len(),
            MAX_CONFIG_SIZE
        )
        .into());
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Error reading config '{}': {}", path.display(), e))?;
    let config = AppConfig::from_json(&raw)?;
    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}
