#[cfg(target_os = "linux")]
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};
#[cfg(target_os = "linux")]
use i2cdev::core::I2CDevice;

use super::Bus;
use crate::errors::BusResult;
#[cfg(target_os = "linux")]
use crate::errors::BusError;

/// I2C bus error type - platform specific
#[cfg(target_os = "linux")]
pub type I2CError = LinuxI2CError;

#[cfg(not(target_os = "linux"))]
#[derive(Debug)]
pub struct I2CError(String);

#[cfg(not(target_os = "linux"))]
impl std::fmt::Display for I2CError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "I2C not supported on this platform: {}", self.0)
    }
}

#[cfg(not(target_os = "linux"))]
impl std::error::Error for I2CError {}

/// Linux i2c-dev bus, e.g. `/dev/i2c-1`
#[cfg(target_os = "linux")]
pub struct I2CBus {
    device: LinuxI2CDevice,
    current_address: Option<u8>,
}

#[cfg(not(target_os = "linux"))]
pub struct I2CBus {
    _phantom: std::marker::PhantomData<()>,
}

#[cfg(target_os = "linux")]
impl I2CBus {
    pub fn new(path: &str) -> Result<Self, I2CError> {
        let device = LinuxI2CDevice::new(path, 0)?;
        Ok(Self { device, current_address: None })
    }

    fn select(&mut self, address: u8) -> BusResult<()> {
        if self.current_address != Some(address) {
            self.device.set_slave_address(address as u16)?;
            self.current_address = Some(address);
        }
        Ok(())
    }
}

#[cfg(target_os = "linux")]
impl Bus for I2CBus {
    fn write_register(&mut self, address: u8, register: u8, value: u8) -> BusResult<()> {
        self.select(address)?;
        self.device.smbus_write_byte_data(register, value)?;
        Ok(())
    }

    fn read_register(&mut self, address: u8, register: u8, buf: &mut [u8]) -> BusResult<()> {
        self.select(address)?;

        if buf.len() == 1 {
            // Use SMBus read byte data for single byte reads
            buf[0] = self.device.smbus_read_byte_data(register)?;
        } else {
            // Use SMBus block read for multi-byte reads
            let data = self.device.smbus_read_i2c_block_data(register, buf.len() as u8)?;
            if data.len() != buf.len() {
                return Err(BusError::ShortRead { expected: buf.len(), actual: data.len() });
            }
            buf.copy_from_slice(&data);
        }

        Ok(())
    }

    fn raw_read(&mut self, address: u8, buf: &mut [u8]) -> BusResult<()> {
        self.select(address)?;
        self.device.read(buf)?;
        Ok(())
    }
}

#[cfg(not(target_os = "linux"))]
impl I2CBus {
    pub fn new(_path: &str) -> Result<Self, I2CError> {
        Err(I2CError("I2C is only supported on Linux".to_string()))
    }
}

#[cfg(not(target_os = "linux"))]
impl Bus for I2CBus {
    fn write_register(&mut self, _address: u8, _register: u8, _value: u8) -> BusResult<()> {
        Err(I2CError("I2C is only supported on Linux".to_string()).into())
    }

    fn read_register(&mut self, _address: u8, _register: u8, _buf: &mut [u8]) -> BusResult<()> {
        Err(I2CError("I2C is only supported on Linux".to_string()).into())
    }

    fn raw_read(&mut self, _address: u8, _buf: &mut [u8]) -> BusResult<()> {
        Err(I2CError("I2C is only supported on Linux".to_string()).into())
    }
}
