use serde::Deserialize;
use std::time::Duration;

use crate::decode::BAR_IN_MAX_PA;
use crate::errors::{ConfigError, ConfigResult};
use crate::mpl3115a2::DriverConfig;
use crate::registers::{Oversampling, DEFAULT_ADDRESS};

/// `[sensor]` section. Unset tunables fall back to [`DriverConfig::default`].
#[derive(Debug, Deserialize)]
pub struct SensorEntry {
    #[serde(default = "default_id")]
    pub id: String,
    #[serde(default = "default_address")]
    pub address: u8,
    /// Oversampling ratio: 1, 2, 4, ... 128
    pub oversampling: Option<u8>,
    pub poll_interval_ms: Option<u64>,
    pub acquisition_timeout_ms: Option<u64>,
    pub bus_retries: Option<u8>,
    /// Sea-level reference written to BAR_IN at startup
    pub sea_level_pa: Option<u32>,
}

/// `[sampling]` section for the sampler binary
#[derive(Debug, Deserialize)]
pub struct SamplingEntry {
    /// Readings per second
    #[serde(default = "default_frequency")]
    pub frequency: u32,
}

fn default_id() -> String {
    "baro0".to_string()
}

fn default_address() -> u8 {
    DEFAULT_ADDRESS
}

fn default_frequency() -> u32 {
    1
}

impl Default for SensorEntry {
    fn default() -> Self {
        Self {
            id: default_id(),
            address: default_address(),
            oversampling: None,
            poll_interval_ms: None,
            acquisition_timeout_ms: None,
            bus_retries: None,
            sea_level_pa: None,
        }
    }
}

impl Default for SamplingEntry {
    fn default() -> Self {
        Self {
            frequency: default_frequency(),
        }
    }
}

impl SensorEntry {
    /// Parsed `oversampling`, `None` when unset
    pub fn oversampling(&self) -> ConfigResult<Option<Oversampling>> {
        self.oversampling
            .map(|ratio| {
                Oversampling::try_from(ratio).map_err(|reason| ConfigError::InvalidValue {
                    field: "sensor.oversampling".to_string(),
                    reason,
                })
            })
            .transpose()
    }

    /// Driver tunables; call [`validate`](Self::validate) first, an invalid
    /// oversampling ratio is ignored here.
    pub fn driver_config(&self) -> DriverConfig {
        let mut config = DriverConfig::default();
        if let Ok(Some(oversampling)) = self.oversampling() {
            config = config
                .oversampling(oversampling)
                .acquisition_timeout(oversampling.max_conversion_time() * 3);
        }
        if let Some(ms) = self.poll_interval_ms {
            config = config.poll_interval(Duration::from_millis(ms));
        }
        if let Some(ms) = self.acquisition_timeout_ms {
            config = config.acquisition_timeout(Duration::from_millis(ms));
        }
        if let Some(retries) = self.bus_retries {
            config = config.bus_retries(retries);
        }
        config
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.address > 0x7F {
            return Err(ConfigError::InvalidValue {
                field: "sensor.address".to_string(),
                reason: format!("{:#04x} is not a 7-bit I2C address", self.address),
            });
        }
        self.oversampling()?;
        if self.acquisition_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "sensor.acquisition_timeout_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if let Some(pa) = self.sea_level_pa {
            if pa > BAR_IN_MAX_PA {
                return Err(ConfigError::InvalidValue {
                    field: "sensor.sea_level_pa".to_string(),
                    reason: format!("{} Pa exceeds BAR_IN range (0..={})", pa, BAR_IN_MAX_PA),
                });
            }
        }
        Ok(())
    }
}

impl SamplingEntry {
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frequency as f64)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.frequency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sampling.frequency".to_string(),
                reason: "must be at least 1 Hz".to_string(),
            });
        }
        Ok(())
    }
}
