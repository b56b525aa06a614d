//! Driver for the ISL94208 4-6 cell battery analog front-end.
//!
//! Register and bit-field access goes through [`Isl94208`]. Cell voltages are
//! read by [`AnalogScan`], which routes each cell onto the chip's analog output
//! pin and samples it with a host ADC.
//!
//! Bus failures never abort an operation. They are OR-ed into an
//! [`ErrorFlags`] accumulator owned by the caller, which can be polled and
//! cleared whenever it suits the application.
#![cfg_attr(not(test), no_std)]

use core::slice;
use embedded_hal::i2c::{self, Error as _, ErrorKind};

#[cfg(feature = "embedded-hal-adc")]
mod hal_unproven;

#[cfg(feature = "embedded-hal-adc")]
pub use hal_unproven::*;

mod cells;
mod constants;
mod field;
mod scan;

pub use cells::CellVoltages;
pub use constants::*;
pub use field::{mask, Field};
pub use scan::{adc_to_millivolts, AdcChannel, AnalogInput, AnalogScan, VoltageOutput};


pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    Transport(ErrorFlags),
}

bitflags::bitflags! {
    /// Sticky record of failed transfers and conversions.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ErrorFlags: u8 {
        const BUS = 1 << 0;
        const ARBITRATION_LOSS = 1 << 1;
        const NO_ACKNOWLEDGE = 1 << 2;
        const OVERRUN = 1 << 3;
        const OTHER = 1 << 4;
        const CONVERSION = 1 << 5;
    }
}

impl ErrorFlags {
    pub fn from_i2c<E: i2c::Error>(err: &E) -> Self {
        match err.kind() {
            ErrorKind::Bus => Self::BUS,
            ErrorKind::ArbitrationLoss => Self::ARBITRATION_LOSS,
            ErrorKind::NoAcknowledge(_) => Self::NO_ACKNOWLEDGE,
            ErrorKind::Overrun => Self::OVERRUN,
            _ => Self::OTHER,
        }
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Transport(self))
        }
    }
}

impl Default for ErrorFlags {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ErrorFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ErrorFlags({=u8:#010b})", self.bits())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// 7-bit bus address.
    pub address: u8,
    /// Re-read every register after writing it so the cache mirrors the chip.
    pub readback: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEVICE_ADDRESS,
            readback: cfg!(debug_assertions),
        }
    }
}

pub struct Isl94208<I2C> {
    i2c_dev: I2C,
    config: Config,
    cache: [u8; REGISTER_COUNT],
}

impl<I2C: i2c::I2c> Isl94208<I2C> {
    #[inline]
    pub fn new(i2c_dev: I2C) -> Self {
        Self::new_with_config(i2c_dev, Config::default())
    }

    pub fn new_with_config(i2c_dev: I2C, config: Config) -> Self {
        Self {
            i2c_dev,
            config,
            cache: [0; REGISTER_COUNT],
        }
    }

    pub fn destroy(self) -> I2C {
        let Self { i2c_dev, .. } = self;
        i2c_dev
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Boot configuration: unlocks the feature set register, selects the
    /// wake-up polarity and locks the register again.
    ///
    /// Failures are accumulated into `errors` like any other transfer, and
    /// additionally reported for this sequence alone.
    pub fn init(&mut self, errors: &mut ErrorFlags) -> Result<()> {
        let mut flags = ErrorFlags::empty();

        self.set_flag(ENABLE_FEAT_SET_WRITES, true, &mut flags);
        self.set_flag(WKPOL, true, &mut flags);
        self.set_flag(ENABLE_FEAT_SET_WRITES, false, &mut flags);

        *errors |= flags;
        flags.into_result()
    }

    /// Value seen by the most recent read of `reg`.
    #[inline]
    pub fn cached(&self, reg: Register) -> u8 {
        self.cache[reg as usize]
    }

    /// Reads a whole register and refreshes its cache entry.
    ///
    /// On a failed transfer the previously cached value is returned.
    pub fn read_register(&mut self, reg: Register, errors: &mut ErrorFlags) -> u8 {
        let mut val = self.cache[reg as usize];

        match self.i2c_dev.write_read(
            self.config.address,
            slice::from_ref(&reg.addr()),
            slice::from_mut(&mut val),
        ) {
            Ok(()) => log::trace!("read {:?} = {:#04x}", reg, val),
            Err(e) => Self::record(errors, reg, &e),
        }

        self.cache[reg as usize] = val;
        val
    }

    pub fn write_register(&mut self, reg: Register, val: u8, errors: &mut ErrorFlags) {
        let transaction = [reg.addr(), val];

        match self.i2c_dev.write(self.config.address, &transaction) {
            Ok(()) => log::trace!("write {:?} = {:#04x}", reg, val),
            Err(e) => Self::record(errors, reg, &e),
        }

        if self.config.readback {
            let _ = self.read_register(reg, errors);
        }
    }

    /// Read-modify-write of a single field.
    ///
    /// `value` is truncated to the field width; neighbouring bits keep the
    /// value just read from the chip.
    pub fn set_field(&mut self, field: Field, value: u8, errors: &mut ErrorFlags) {
        let reg = field.register();
        let val = self.read_register(reg, errors);
        self.write_register(reg, field.insert(val, value), errors);
    }

    pub fn get_field(&mut self, field: Field, errors: &mut ErrorFlags) -> u8 {
        let val = self.read_register(field.register(), errors);
        field.extract(val)
    }

    #[inline]
    pub fn set_flag(&mut self, field: Field, on: bool, errors: &mut ErrorFlags) {
        self.set_field(field, on as u8, errors)
    }

    #[inline]
    pub fn get_flag(&mut self, field: Field, errors: &mut ErrorFlags) -> bool {
        self.get_field(field, errors) != 0
    }

    fn record(errors: &mut ErrorFlags, reg: Register, err: &I2C::Error) {
        let flags = ErrorFlags::from_i2c(err);
        log::warn!("transfer of {:?} failed: {:?}", reg, err);
        *errors |= flags;
    }
}
