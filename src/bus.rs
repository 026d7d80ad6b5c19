pub mod i2c;

use crate::errors::BusResult;

/// Byte-level register transport to a device on a two-wire bus.
///
/// Implementations address the device on every call, so one transport can
/// be lent to a driver (`&mut I2CBus`) while the caller keeps ownership.
pub trait Bus {
    /// Write a single byte to `register` of the device at `address`
    fn write_register(&mut self, address: u8, register: u8, value: u8) -> BusResult<()>;

    /// Burst read `buf.len()` consecutive registers starting at `register`
    fn read_register(&mut self, address: u8, register: u8, buf: &mut [u8]) -> BusResult<()>;

    /// Plain read without a register pointer write, continuing from the
    /// device's current register pointer
    fn raw_read(&mut self, address: u8, buf: &mut [u8]) -> BusResult<()>;
}

impl<B: Bus + ?Sized> Bus for &mut B {
    fn write_register(&mut self, address: u8, register: u8, value: u8) -> BusResult<()> {
        (**self).write_register(address, register, value)
    }

    fn read_register(&mut self, address: u8, register: u8, buf: &mut [u8]) -> BusResult<()> {
        (**self).read_register(address, register, buf)
    }

    fn raw_read(&mut self, address: u8, buf: &mut [u8]) -> BusResult<()> {
        (**self).raw_read(address, buf)
    }
}
