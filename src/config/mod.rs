pub mod bus_config;
pub mod sensor_config;

pub use bus_config::BusEntry;
pub use sensor_config::{SamplingEntry, SensorEntry};

use serde::Deserialize;
use std::fs;

use crate::errors::{ConfigError, ConfigResult};

/// File name looked up inside `CONFIG_PATH`
pub const CONFIG_FILE: &str = "mpl3115a2.toml";

/// Root of `mpl3115a2.toml`; every section is optional
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub bus: BusEntry,
    #[serde(default)]
    pub sensor: SensorEntry,
    #[serde(default)]
    pub sampling: SamplingEntry,
}

/// Parse and validate a TOML document
pub fn parse_config(content: &str) -> ConfigResult<AppConfig> {
    let parsed: AppConfig = toml::from_str(content)?;
    parsed.sensor.validate()?;
    parsed.sampling.validate()?;
    Ok(parsed)
}

/// Loads config from TOML file
pub fn load_config(path: &str) -> ConfigResult<AppConfig> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::LoadError {
        path: path.to_string(),
        source,
    })?;
    parse_config(&content)
}

/// `$CONFIG_PATH/mpl3115a2.toml`, with `CONFIG_PATH` defaulting to `config`
pub fn default_config_path() -> String {
    let config_dir = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config".to_string());
    format!("{}/{}", config_dir, CONFIG_FILE)
}
