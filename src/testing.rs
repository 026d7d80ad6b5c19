use std::collections::HashMap;

use crate::bus::Bus;
use crate::errors::{BusError, BusResult};
use crate::registers::{
    CTRL_ACTIVE, CTRL_ALT, CTRL_REG1, DEVICE_ID, OUT_P_MSB, OUT_T_MSB, STATUS, STATUS_PDR,
    STATUS_PTDR, STATUS_TDR, WHO_AM_I,
};

/// In-memory register file standing in for a real MPL3115A2.
///
/// Writing CTRL_REG1 with the ACTIVE bit starts a conversion that completes
/// on the STATUS read after `conversion_polls` not-ready reads. Completion
/// sets PDR and TDR and, when a sample is configured for the current mode,
/// loads it into the output registers. Reading `OUT_P_MSB` clears PDR and
/// reading `OUT_T_MSB` clears TDR, as on the device.
pub struct FakeBus {
    pub address: u8,
    regs: HashMap<u8, u8>,
    flags: u8,
    /// `None` never completes
    conversion_polls: Option<usize>,
    pending: Option<usize>,
    barometer_sample: Option<[u8; 5]>,
    altimeter_sample: Option<[u8; 3]>,
    pub writes: Vec<(u8, u8)>,
    pub reads: Vec<(u8, usize)>,
    pub status_reads: usize,
    fail_reads: HashMap<u8, usize>,
    fail_writes: usize,
    pointer: u8,
}

impl FakeBus {
    pub fn new(address: u8) -> Self {
        let mut regs = HashMap::new();
        regs.insert(WHO_AM_I, DEVICE_ID);
        Self {
            address,
            regs,
            flags: 0,
            conversion_polls: Some(0),
            pending: None,
            barometer_sample: None,
            altimeter_sample: None,
            writes: Vec::new(),
            reads: Vec::new(),
            status_reads: 0,
            fail_reads: HashMap::new(),
            fail_writes: 0,
            pointer: 0,
        }
    }

    /// Set consecutive registers starting at `start`
    pub fn with_registers(mut self, start: u8, bytes: &[u8]) -> Self {
        self.load(start, bytes);
        self
    }

    /// `OUT_P_MSB..=OUT_T_LSB` produced by each barometer conversion
    pub fn with_barometer_sample(mut self, sample: [u8; 5]) -> Self {
        self.barometer_sample = Some(sample);
        self
    }

    /// `OUT_P_MSB..=OUT_P_LSB` produced by each altimeter conversion
    pub fn with_altimeter_sample(mut self, sample: [u8; 3]) -> Self {
        self.altimeter_sample = Some(sample);
        self
    }

    /// Report not-ready for the first `n` STATUS polls of every conversion
    pub fn ready_after(mut self, n: usize) -> Self {
        self.conversion_polls = Some(n);
        self
    }

    pub fn never_ready(mut self) -> Self {
        self.conversion_polls = None;
        self
    }

    /// Fail the next `n` reads of `register` with a NACK
    pub fn failing_reads(mut self, register: u8, n: usize) -> Self {
        self.fail_reads.insert(register, n);
        self
    }

    /// Fail the next `n` register writes with a NACK
    pub fn failing_writes(mut self, n: usize) -> Self {
        self.fail_writes = n;
        self
    }

    pub fn register(&self, register: u8) -> Option<u8> {
        self.regs.get(&register).copied()
    }

    fn status(&mut self) -> u8 {
        match self.pending {
            Some(0) => {
                self.pending = None;
                self.complete_conversion();
            }
            Some(n) => self.pending = Some(n - 1),
            None => {}
        }

        if self.flags & (STATUS_PDR | STATUS_TDR) != 0 {
            self.flags | STATUS_PTDR
        } else {
            self.flags
        }
    }

    fn complete_conversion(&mut self) {
        let altimeter = self.register(CTRL_REG1).unwrap_or(0) & CTRL_ALT != 0;
        if altimeter {
            if let Some(sample) = self.altimeter_sample {
                self.load(OUT_P_MSB, &sample);
            }
        } else if let Some(sample) = self.barometer_sample {
            self.load(OUT_P_MSB, &sample);
        }
        self.flags |= STATUS_PDR | STATUS_TDR;
    }

    fn load(&mut self, start: u8, bytes: &[u8]) {
        for (i, b) in bytes.iter().enumerate() {
            self.regs.insert(start + i as u8, *b);
        }
    }

    /// Copy from the register file at the auto-incrementing pointer
    fn fill(&mut self, buf: &mut [u8]) {
        for b in buf.iter_mut() {
            match self.pointer {
                OUT_P_MSB => self.flags &= !STATUS_PDR,
                OUT_T_MSB => self.flags &= !STATUS_TDR,
                _ => {}
            }
            *b = self.regs.get(&self.pointer).copied().unwrap_or(0);
            self.pointer = self.pointer.wrapping_add(1);
        }
    }

    fn check_address(&self, address: u8) -> BusResult<()> {
        if address != self.address {
            return Err(BusError::Nack { address });
        }
        Ok(())
    }
}

impl Bus for FakeBus {
    fn write_register(&mut self, address: u8, register: u8, value: u8) -> BusResult<()> {
        self.check_address(address)?;
        if self.fail_writes > 0 {
            self.fail_writes -= 1;
            return Err(BusError::Nack { address });
        }
        self.writes.push((register, value));
        self.regs.insert(register, value);

        if register == CTRL_REG1 {
            // Entering active mode restarts the conversion, standby aborts it
            self.pending = if value & CTRL_ACTIVE != 0 {
                self.conversion_polls
            } else {
                None
            };
        }
        Ok(())
    }

    fn read_register(&mut self, address: u8, register: u8, buf: &mut [u8]) -> BusResult<()> {
        self.check_address(address)?;
        if let Some(remaining) = self.fail_reads.get_mut(&register) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(BusError::Nack { address });
            }
        }
        self.reads.push((register, buf.len()));

        if register == STATUS && buf.len() == 1 {
            self.status_reads += 1;
            buf[0] = self.status();
            self.pointer = STATUS + 1;
            return Ok(());
        }

        self.pointer = register;
        self.fill(buf);
        Ok(())
    }

    fn raw_read(&mut self, address: u8, buf: &mut [u8]) -> BusResult<()> {
        self.check_address(address)?;
        self.fill(buf);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: u8 = 0x60;

    fn status(bus: &mut FakeBus) -> u8 {
        let mut status = [0u8; 1];
        bus.read_register(ADDR, STATUS, &mut status).unwrap();
        status[0]
    }

    #[test]
    fn test_data_ready_flags_clear_on_output_read() {
        let mut bus = FakeBus::new(ADDR).with_barometer_sample([0x62, 0xF3, 0x40, 0x19, 0x00]);
        assert_eq!(status(&mut bus), 0x00);

        bus.write_register(ADDR, CTRL_REG1, 0x39).unwrap();
        assert_eq!(status(&mut bus), STATUS_PTDR | STATUS_PDR | STATUS_TDR);

        let mut temp = [0u8; 2];
        bus.read_register(ADDR, OUT_T_MSB, &mut temp).unwrap();
        assert_eq!(temp, [0x19, 0x00]);
        // Pressure still unread
        assert_eq!(status(&mut bus), STATUS_PTDR | STATUS_PDR);

        let mut pressure = [0u8; 3];
        bus.read_register(ADDR, OUT_P_MSB, &mut pressure).unwrap();
        assert_eq!(status(&mut bus), 0x00);
    }

    #[test]
    fn test_standby_aborts_pending_conversion() {
        let mut bus = FakeBus::new(ADDR).ready_after(1);
        bus.write_register(ADDR, CTRL_REG1, 0xB9).unwrap();
        assert_eq!(status(&mut bus), 0x00);

        bus.write_register(ADDR, CTRL_REG1, 0x38).unwrap();
        assert_eq!(status(&mut bus), 0x00);
        assert_eq!(status(&mut bus), 0x00);
    }
}
