use thiserror::Error;
use crate::bus::i2c::I2CError;
use crate::registers::Mode;

/// Transport-level failures reported by a [`Bus`](crate::bus::Bus)
#[derive(Error, Debug)]
pub enum BusError {
    #[error("I2C communication failed: {0}")]
    I2c(#[from] I2CError),

    #[error("Short read: expected {expected} byte(s), got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("No acknowledge from device at {address:#04x}")]
    Nack { address: u8 },
}

/// Why the identity check at construction failed
#[derive(Error, Debug)]
pub enum IdentityFault {
    #[error("wrong chip ID: expected {expected:#04x}, got {actual:#04x}")]
    WrongChipId { expected: u8, actual: u8 },

    #[error("identity register unreadable: {0}")]
    Bus(#[source] BusError),
}

/// Errors raised by the MPL3115A2 driver
#[derive(Error, Debug)]
pub enum SensorError {
    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("MPL3115A2 at {address:#04x} failed identity verification: {fault}")]
    IdentityMismatch {
        address: u8,
        #[source]
        fault: IdentityFault,
    },

    #[error("MPL3115A2 at {address:#04x} produced no {mode} sample within {waited_ms}ms")]
    AcquisitionTimeout { address: u8, mode: Mode, waited_ms: u64 },

    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Sensor lock poisoned by a panicked holder")]
    LockPoisoned,
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from '{path}': {source}")]
    LoadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration format: {0}")]
    FormatError(#[from] toml::de::Error),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type aliases for convenience
pub type BusResult<T> = Result<T, BusError>;
pub type SensorResult<T> = Result<T, SensorError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
