use serde::Serialize;

use crate::decode;

/// Pressure expressed in the three units the driver reports
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct Pressure {
    pub mbar: f64,
    pub in_hg: f64,
    pub psi: f64,
}

impl Pressure {
    /// Station pressure from pascals
    pub fn from_pascals(pa: f64) -> Self {
        Self {
            mbar: pa / decode::PA_PER_MBAR,
            in_hg: pa / decode::PA_PER_INHG,
            psi: pa / decode::PA_PER_PSI,
        }
    }

    /// Pressure from millibar, using the millibar-based conversion factors
    pub fn from_mbar(mbar: f64) -> Self {
        Self {
            mbar,
            in_hg: mbar / decode::MBAR_PER_INHG,
            psi: mbar / decode::MBAR_PER_PSI,
        }
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct Temperature {
    pub c: f64,
    pub f: f64,
    pub k: f64,
}

impl Temperature {
    pub fn from_celsius(c: f64) -> Self {
        Self {
            c,
            f: c * 9.0 / 5.0 + 32.0,
            k: c + decode::KELVIN_OFFSET,
        }
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct Altitude {
    pub meters: f64,
    pub feet: f64,
}

impl Altitude {
    pub fn from_meters(meters: f64) -> Self {
        Self {
            meters,
            feet: meters * decode::FEET_PER_METER,
        }
    }
}

/// One complete sample as published by the sampler
#[derive(Serialize, Clone, Debug)]
pub struct BarometerReading {
    pub sensor_id: String,
    pub seq: u64,
    /// UTC timestamp in nanoseconds
    pub t_utc_ns: u64,
    pub station_pressure: Pressure,
    pub sea_level_pressure: Pressure,
    pub altitude: Altitude,
    pub temperature: Temperature,
}

impl BarometerReading {
    /// Serialize to a single JSON line
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Current UTC time in nanoseconds
pub(crate) fn utc_now_ns() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
