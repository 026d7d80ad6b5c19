//! MPL3115A2 register map and control bit patterns.

use std::time::Duration;

// Register addresses
pub const STATUS: u8 = 0x00;
pub const OUT_P_MSB: u8 = 0x01;
pub const OUT_P_CSB: u8 = 0x02;
pub const OUT_P_LSB: u8 = 0x03;
pub const OUT_T_MSB: u8 = 0x04;
pub const OUT_T_LSB: u8 = 0x05;
pub const WHO_AM_I: u8 = 0x0C;
pub const PT_DATA_CFG: u8 = 0x13;
pub const BAR_IN_MSB: u8 = 0x14;
pub const BAR_IN_LSB: u8 = 0x15;
pub const CTRL_REG1: u8 = 0x26;

/// Value of `WHO_AM_I` on a genuine MPL3115A2
pub const DEVICE_ID: u8 = 0xC4;

/// Default 7-bit bus address
pub const DEFAULT_ADDRESS: u8 = 0x60;

// STATUS bits
/// Pressure/altitude or temperature data ready
pub const STATUS_PTDR: u8 = 0x08;
/// Pressure/altitude data ready, cleared by reading `OUT_P_MSB`
pub const STATUS_PDR: u8 = 0x04;
/// Temperature data ready, cleared by reading `OUT_T_MSB`
pub const STATUS_TDR: u8 = 0x02;

// PT_DATA_CFG: data ready event mode | pressure event flag | temperature event flag
pub const PT_DATA_CFG_ENABLE: u8 = 0x07;

// CTRL_REG1 bits
pub const CTRL_ALT: u8 = 0x80;
pub const CTRL_OS_SHIFT: u8 = 3;
pub const CTRL_OS_MASK: u8 = 0x38;
pub const CTRL_ACTIVE: u8 = 0x01;

/// Burst lengths starting at `OUT_P_MSB` / `OUT_T_MSB`
pub const PRESSURE_BURST: usize = 3;
pub const TEMPERATURE_BURST: usize = 2;
pub const PRESSURE_TEMPERATURE_BURST: usize = 5;

/// Operating mode selected through CTRL_REG1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Barometer,
    Altimeter,
    Standby,
}

impl Mode {
    /// CTRL_REG1 value for this mode at the given oversampling ratio
    pub fn control_byte(self, oversampling: Oversampling) -> u8 {
        let os = oversampling.register_bits();
        match self {
            Mode::Barometer => os | CTRL_ACTIVE,
            Mode::Altimeter => CTRL_ALT | os | CTRL_ACTIVE,
            Mode::Standby => os,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mode::Barometer => "barometer",
            Mode::Altimeter => "altimeter",
            Mode::Standby => "standby",
        };
        f.write_str(name)
    }
}

/// Oversampling ratio, CTRL_REG1 bits 5..3
///
/// Converts from the plain ratio (`1`, `2`, ... `128`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Oversampling {
    X1,
    X2,
    X4,
    X8,
    X16,
    X32,
    X64,
    #[default]
    X128,
}

impl Oversampling {
    pub fn register_bits(self) -> u8 {
        let code = match self {
            Oversampling::X1 => 0,
            Oversampling::X2 => 1,
            Oversampling::X4 => 2,
            Oversampling::X8 => 3,
            Oversampling::X16 => 4,
            Oversampling::X32 => 5,
            Oversampling::X64 => 6,
            Oversampling::X128 => 7,
        };
        (code << CTRL_OS_SHIFT) & CTRL_OS_MASK
    }

    pub fn ratio(self) -> u8 {
        1 << (self.register_bits() >> CTRL_OS_SHIFT)
    }

    /// Worst-case conversion time from the datasheet (Table 59)
    pub fn max_conversion_time(self) -> Duration {
        let ms = match self {
            Oversampling::X1 => 6,
            Oversampling::X2 => 10,
            Oversampling::X4 => 18,
            Oversampling::X8 => 34,
            Oversampling::X16 => 66,
            Oversampling::X32 => 130,
            Oversampling::X64 => 258,
            Oversampling::X128 => 512,
        };
        Duration::from_millis(ms)
    }
}

impl TryFrom<u8> for Oversampling {
    type Error = String;

    fn try_from(ratio: u8) -> Result<Self, Self::Error> {
        match ratio {
            1 => Ok(Oversampling::X1),
            2 => Ok(Oversampling::X2),
            4 => Ok(Oversampling::X4),
            8 => Ok(Oversampling::X8),
            16 => Ok(Oversampling::X16),
            32 => Ok(Oversampling::X32),
            64 => Ok(Oversampling::X64),
            128 => Ok(Oversampling::X128),
            other => Err(format!(
                "oversampling ratio must be a power of two up to 128, got {}",
                other
            )),
        }
    }
}
