//! Blocking driver for the NXP MPL3115A2 pressure / altitude / temperature sensor.
//!
//! Every acquisition drops to standby, discards any unread output, re-asserts
//! its own operating mode, waits for the STATUS data-ready flag with a
//! bounded poll, then burst-reads the output registers. The device mode is
//! never assumed to survive between calls.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::bus::Bus;
use crate::decode;
use crate::errors::{BusResult, IdentityFault, SensorError, SensorResult};
use crate::measurements::{utc_now_ns, Altitude, BarometerReading, Pressure, Temperature};
use crate::registers::{
    Mode, Oversampling, BAR_IN_LSB, BAR_IN_MSB, CTRL_REG1, DEVICE_ID, OUT_P_MSB, OUT_T_MSB,
    PRESSURE_BURST, PRESSURE_TEMPERATURE_BURST, PT_DATA_CFG, PT_DATA_CFG_ENABLE, STATUS,
    STATUS_PTDR, TEMPERATURE_BURST, WHO_AM_I,
};

/// Driver handle shared between threads; lock it for the whole acquisition
pub type SharedSensor<B> = Arc<Mutex<Mpl3115a2<B>>>;

/// Tunables for acquisition timing and bus error handling
#[derive(Debug, Clone, PartialEq)]
pub struct DriverConfig {
    pub oversampling: Oversampling,
    /// Sleep between STATUS polls
    pub poll_interval: Duration,
    /// Give up waiting for data-ready after this long
    pub acquisition_timeout: Duration,
    /// Extra attempts per bus transaction before surfacing the error
    pub bus_retries: u8,
}

impl Default for DriverConfig {
    fn default() -> Self {
        let oversampling = Oversampling::default();
        Self {
            oversampling,
            poll_interval: Duration::from_millis(10),
            // Worst-case conversion time with headroom
            acquisition_timeout: oversampling.max_conversion_time() * 3,
            bus_retries: 2,
        }
    }
}

impl DriverConfig {
    pub fn oversampling(mut self, oversampling: Oversampling) -> Self {
        self.oversampling = oversampling;

        self
    }

    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;

        self
    }

    pub fn acquisition_timeout(mut self, acquisition_timeout: Duration) -> Self {
        self.acquisition_timeout = acquisition_timeout;

        self
    }

    pub fn bus_retries(mut self, bus_retries: u8) -> Self {
        self.bus_retries = bus_retries;

        self
    }
}

pub struct Mpl3115a2<B> {
    bus: B,
    address: u8,
    config: DriverConfig,
}

impl<B: Bus> Mpl3115a2<B> {
    /// Verifies the device identity and returns a ready driver.
    ///
    /// Fails with [`SensorError::IdentityMismatch`] when `WHO_AM_I` does not
    /// read `0xC4` or cannot be read at all. No configuration is written.
    pub fn new(mut bus: B, address: u8, config: DriverConfig) -> SensorResult<Self> {
        let mut id = [0u8; 1];
        if let Err(e) = bus.read_register(address, WHO_AM_I, &mut id) {
            return Err(SensorError::IdentityMismatch {
                address,
                fault: IdentityFault::Bus(e),
            });
        }

        if id[0] != DEVICE_ID {
            return Err(SensorError::IdentityMismatch {
                address,
                fault: IdentityFault::WrongChipId { expected: DEVICE_ID, actual: id[0] },
            });
        }

        info!(
            "[mpl3115a2@{:#04x}] device verified (oversampling x{})",
            address,
            config.oversampling.ratio()
        );

        Ok(Self { bus, address, config })
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Give the transport back to the caller
    pub fn release(self) -> B {
        self.bus
    }

    /// Wrap the driver for use from several threads
    pub fn into_shared(self) -> SharedSensor<B> {
        Arc::new(Mutex::new(self))
    }

    /// Re-reads `WHO_AM_I`; `Ok(false)` means something else answered.
    pub fn is_connected(&mut self) -> SensorResult<bool> {
        let mut id = [0u8; 1];
        self.read_register(WHO_AM_I, &mut id)?;

        Ok(id[0] == DEVICE_ID)
    }

    /// Station pressure in barometer mode
    pub fn get_station_pressure(&mut self) -> SensorResult<Pressure> {
        let mut raw = [0u8; PRESSURE_BURST];
        self.acquire(Mode::Barometer, OUT_P_MSB, &mut raw)?;

        let pa = decode::pressure_pa(raw);
        debug!("[mpl3115a2@{:#04x}] station pressure {:.2} Pa", self.address, pa);

        Ok(Pressure::from_pascals(pa))
    }

    /// Altitude in altimeter mode, relative to the BAR_IN sea-level reference
    pub fn get_altitude(&mut self) -> SensorResult<Altitude> {
        let mut raw = [0u8; PRESSURE_BURST];
        self.acquire(Mode::Altimeter, OUT_P_MSB, &mut raw)?;

        let meters = decode::altitude_m(raw);
        debug!("[mpl3115a2@{:#04x}] altitude {:.4} m", self.address, meters);

        Ok(Altitude::from_meters(meters))
    }

    /// Die temperature, captured alongside a barometer conversion
    pub fn get_temp(&mut self) -> SensorResult<Temperature> {
        let mut raw = [0u8; TEMPERATURE_BURST];
        self.acquire(Mode::Barometer, OUT_T_MSB, &mut raw)?;

        let c = decode::temperature_c(raw);
        debug!("[mpl3115a2@{:#04x}] temperature {:.4} C", self.address, c);

        Ok(Temperature::from_celsius(c))
    }

    /// Station pressure and temperature from one barometer conversion
    pub fn get_pressure_and_temp(&mut self) -> SensorResult<(Pressure, Temperature)> {
        let mut raw = [0u8; PRESSURE_TEMPERATURE_BURST];
        self.acquire(Mode::Barometer, OUT_P_MSB, &mut raw)?;

        let pa = decode::pressure_pa([raw[0], raw[1], raw[2]]);
        let c = decode::temperature_c([raw[3], raw[4]]);
        debug!(
            "[mpl3115a2@{:#04x}] station pressure {:.2} Pa, temperature {:.4} C",
            self.address, pa, c
        );

        Ok((Pressure::from_pascals(pa), Temperature::from_celsius(c)))
    }

    /// Sea-level pressure.
    ///
    /// Runs two full acquisitions: a barometer conversion for pressure and
    /// temperature, then an altimeter conversion for station altitude.
    pub fn get_slp(&mut self) -> SensorResult<Pressure> {
        let (station, temperature) = self.get_pressure_and_temp()?;
        let altitude = self.get_altitude()?;

        Ok(sea_level_pressure(&station, &altitude, &temperature))
    }

    /// Station pressure, sea-level pressure, altitude and temperature.
    pub fn read_all(&mut self, sensor_id: &str, seq: u64) -> SensorResult<BarometerReading> {
        let (station, temperature) = self.get_pressure_and_temp()?;
        let altitude = self.get_altitude()?;

        Ok(BarometerReading {
            sensor_id: sensor_id.to_string(),
            seq,
            t_utc_ns: utc_now_ns(),
            station_pressure: station,
            sea_level_pressure: sea_level_pressure(&station, &altitude, &temperature),
            altitude,
            temperature,
        })
    }

    /// Stop conversions until the next acquisition
    pub fn standby(&mut self) -> SensorResult<()> {
        self.set_mode(Mode::Standby)
    }

    /// Program the sea-level reference (BAR_IN) used for altitude, in pascals.
    ///
    /// The register holds 2 Pa per LSB, so odd values are rounded down.
    pub fn set_sea_level_reference(&mut self, pa: u32) -> SensorResult<()> {
        let [msb, lsb] = decode::bar_in_bytes(pa).ok_or_else(|| SensorError::InvalidArgument {
            reason: format!(
                "sea-level reference {} Pa exceeds BAR_IN range (0..={})",
                pa,
                decode::BAR_IN_MAX_PA
            ),
        })?;

        self.write_register(BAR_IN_MSB, msb)?;
        self.write_register(BAR_IN_LSB, lsb)?;
        debug!("[mpl3115a2@{:#04x}] BAR_IN set to {} Pa", self.address, pa);

        Ok(())
    }

    fn set_mode(&mut self, mode: Mode) -> SensorResult<()> {
        let ctrl = mode.control_byte(self.config.oversampling);
        self.write_register(CTRL_REG1, ctrl)?;
        debug!("[mpl3115a2@{:#04x}] {} mode (CTRL_REG1={:#04x})", self.address, mode, ctrl);

        Ok(())
    }

    /// One acquisition cycle: standby, discard stale output, configure,
    /// wait for data-ready, burst read.
    ///
    /// PTDR stays set while either PDR or TDR is unread, so a previous
    /// temperature-only read would otherwise satisfy the next poll with the
    /// old pressure sample.
    fn acquire(&mut self, mode: Mode, register: u8, buf: &mut [u8]) -> SensorResult<()> {
        self.set_mode(Mode::Standby)?;
        self.discard_stale_output()?;
        self.write_register(PT_DATA_CFG, PT_DATA_CFG_ENABLE)?;
        self.set_mode(mode)?;
        self.wait_data_ready(mode)?;
        self.read_register(register, buf)?;

        Ok(())
    }

    /// Reads `OUT_P`..`OUT_T` once if data-ready is still latched, clearing
    /// PDR and TDR.
    fn discard_stale_output(&mut self) -> SensorResult<()> {
        let mut status = [0u8; 1];
        self.read_register(STATUS, &mut status)?;
        if status[0] & STATUS_PTDR == 0 {
            return Ok(());
        }

        let mut stale = [0u8; PRESSURE_TEMPERATURE_BURST];
        self.read_register(OUT_P_MSB, &mut stale)?;
        trace!(
            "[mpl3115a2@{:#04x}] discarded stale output (STATUS={:#04x})",
            self.address, status[0]
        );

        Ok(())
    }

    fn wait_data_ready(&mut self, mode: Mode) -> SensorResult<()> {
        let started = Instant::now();
        let mut polls = 0u32;

        loop {
            let mut status = [0u8; 1];
            self.read_register(STATUS, &mut status)?;
            polls += 1;
            trace!("[mpl3115a2@{:#04x}] poll {} STATUS={:#04x}", self.address, polls, status[0]);

            if status[0] & STATUS_PTDR != 0 {
                return Ok(());
            }

            let waited = started.elapsed();
            if waited >= self.config.acquisition_timeout {
                return Err(SensorError::AcquisitionTimeout {
                    address: self.address,
                    mode,
                    waited_ms: waited.as_millis() as u64,
                });
            }

            thread::sleep(self.config.poll_interval);
        }
    }

    fn write_register(&mut self, register: u8, value: u8) -> SensorResult<()> {
        let address = self.address;
        self.with_retries(|bus| bus.write_register(address, register, value))
    }

    fn read_register(&mut self, register: u8, buf: &mut [u8]) -> SensorResult<()> {
        let address = self.address;
        self.with_retries(|bus| bus.read_register(address, register, &mut *buf))
    }

    fn with_retries<F>(&mut self, mut op: F) -> SensorResult<()>
    where
        F: FnMut(&mut B) -> BusResult<()>,
    {
        let mut attempt = 0u8;
        loop {
            match op(&mut self.bus) {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.config.bus_retries => {
                    attempt += 1;
                    warn!(
                        "[mpl3115a2@{:#04x}] bus error, retry {}/{}: {}",
                        self.address, attempt, self.config.bus_retries, e
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn sea_level_pressure(
    station: &Pressure,
    altitude: &Altitude,
    temperature: &Temperature,
) -> Pressure {
    Pressure::from_mbar(decode::sea_level_pressure_mbar(
        station.mbar,
        altitude.meters,
        temperature.c,
    ))
}
