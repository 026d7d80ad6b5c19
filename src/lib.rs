//! Blocking I2C driver for the NXP MPL3115A2 barometric pressure, altitude
//! and temperature sensor, plus the configuration and sampling loop used by
//! the `mpl3115a2-sampler` binary.

// Public modules
pub mod bus;
pub mod config;
pub mod decode;
pub mod errors;
pub mod measurements;
pub mod mpl3115a2;
pub mod registers;
pub mod scheduler;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use bus::i2c::I2CBus;
pub use bus::Bus;
pub use config::{load_config, AppConfig};
pub use errors::{BusError, ConfigError, IdentityFault, SensorError, SensorResult};
pub use measurements::{Altitude, BarometerReading, Pressure, Temperature};
pub use mpl3115a2::{DriverConfig, Mpl3115a2, SharedSensor};
pub use registers::{Mode, Oversampling};
pub use scheduler::run_sampler;

use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize tracing with default configuration
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();
}

/// Open the bus, verify the sensor and sample forever using `config`
pub async fn run_from_config(config: AppConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let bus = I2CBus::new(&config.bus.path).map_err(BusError::from)?;
    info!("[bus] opened {}", config.bus.path);

    let mut sensor = Mpl3115a2::new(bus, config.sensor.address, config.sensor.driver_config())?;
    if let Some(pa) = config.sensor.sea_level_pa {
        sensor.set_sea_level_reference(pa)?;
        info!("[{}] sea-level reference {} Pa", config.sensor.id, pa);
    }

    run_sampler(
        sensor.into_shared(),
        config.sensor.id.clone(),
        config.sampling.period(),
        None,
    )
    .await?;

    Ok(())
}
