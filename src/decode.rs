//! Raw register decoding and the physical conversion math.
//!
//! Output registers hold big-endian fixed-point values left-aligned in a
//! 24-bit window. Packing the burst into the top three bytes of a `u32`/`i32`
//! keeps the sign bit where two's complement expects it, so a single divide
//! recovers the value.
//!
//! Formats below are for the packed 32-bit word `MSB<<24 | CSB<<16 | LSB<<8`
//! (temperature: the 16-bit word `MSB<<8 | LSB`), so the fractional bit
//! count matches the divisor.
//!
//! | Quantity    | Format              | Decode                     |
//! |-------------|---------------------|----------------------------|
//! | Pressure    | unsigned Q18.14 Pa  | packed / 2^14              |
//! | Altitude    | signed Q16.16 m     | packed as `i32` / 2^16     |
//! | Temperature | signed Q8.8 °C      | MSB as `i8` + LSB / 2^8    |

pub const PA_PER_MBAR: f64 = 100.0;
pub const PA_PER_INHG: f64 = 3386.0;
pub const PA_PER_PSI: f64 = 6895.0;
pub const MBAR_PER_INHG: f64 = 33.864;
pub const MBAR_PER_PSI: f64 = 68.948;
pub const FEET_PER_METER: f64 = 3.281;
pub const KELVIN_OFFSET: f64 = 273.15;

/// Standard gravity, m/s²
pub const STANDARD_GRAVITY: f64 = 9.80665;
/// Specific gas constant for dry air, J/(kg·K)
pub const DRY_AIR_GAS_CONSTANT: f64 = 287.05;

const PRESSURE_DIVISOR: f64 = 16384.0;
const ALTITUDE_DIVISOR: f64 = 65536.0;
const TEMPERATURE_FRACTION: f64 = 256.0;

fn pack24(bytes: [u8; 3]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], 0])
}

/// Decode OUT_P_MSB..OUT_P_LSB in barometer mode to pascals
pub fn pressure_pa(bytes: [u8; 3]) -> f64 {
    pack24(bytes) as f64 / PRESSURE_DIVISOR
}

/// Decode OUT_P_MSB..OUT_P_LSB in altimeter mode to meters
pub fn altitude_m(bytes: [u8; 3]) -> f64 {
    pack24(bytes) as i32 as f64 / ALTITUDE_DIVISOR
}

/// Decode OUT_T_MSB..OUT_T_LSB to degrees Celsius
pub fn temperature_c(bytes: [u8; 2]) -> f64 {
    bytes[0] as i8 as f64 + bytes[1] as f64 / TEMPERATURE_FRACTION
}

/// Reduce station pressure to sea level with the hypsometric form of the
/// barometric formula: `P0 = P * exp(g*h / (Rd*T))`.
pub fn sea_level_pressure_mbar(station_mbar: f64, altitude_m: f64, temp_c: f64) -> f64 {
    let temp_k = temp_c + KELVIN_OFFSET;
    station_mbar * ((STANDARD_GRAVITY * altitude_m) / (DRY_AIR_GAS_CONSTANT * temp_k)).exp()
}

/// Largest sea-level reference BAR_IN can hold, in pascals
pub const BAR_IN_MAX_PA: u32 = 2 * u16::MAX as u32;

/// BAR_IN_MSB/LSB contents for a sea-level reference in pascals (2 Pa per LSB)
pub fn bar_in_bytes(pa: u32) -> Option<[u8; 2]> {
    if pa > BAR_IN_MAX_PA {
        return None;
    }
    Some(((pa / 2) as u16).to_be_bytes())
}
