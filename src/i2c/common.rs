// Licensed under the Apache-2.0 license

//! Common types and constants for the TM4C123 I2C driver modules.
//!
//! This module provides shared definitions for error handling, register fields,
//! and protocol utilities used across the I2C driver implementation.

use core::fmt;
use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
use fugit::HertzU32;

/// Clock periods of one SCL cycle as fixed by the controller (`SCL_LP` + `SCL_HP`).
pub const SCL_PERIODS_PER_CYCLE: u32 = 10;

/// Largest value the 7-bit `MTPR.TPR` field can hold.
pub const MAX_TIMER_PERIOD: u32 = 0x7F;

/// Default input clock: the precision internal oscillator.
pub const PIOSC_FREQUENCY: HertzU32 = HertzU32::from_raw(16_000_000);

/// Default number of status polls before a phase is declared stuck.
pub const DEFAULT_BUSY_POLL_LIMIT: u32 = 100_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum I2cSpeed {
    Standard = 100_000,
}

impl I2cSpeed {
    #[must_use]
    pub const fn frequency(self) -> HertzU32 {
        HertzU32::from_raw(self as u32)
    }
}

/// Errors reported while programming the controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigurationError {
    /// The computed `MTPR.TPR` value does not fit the 1..=127 range.
    PeriodOutOfRange { period: u32 },
    /// A clock domain never reported ready after being gated on.
    PeripheralNotReady,
    /// A pin table names a pin a GPIO port does not have.
    InvalidPin { pin: u8 },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PeriodOutOfRange { period } => {
                write!(f, "timer period {period} outside 1..={MAX_TIMER_PERIOD}")
            }
            Self::PeripheralNotReady => f.write_str("peripheral clock never became ready"),
            Self::InvalidPin { pin } => write!(f, "no pin {pin} on a GPIO port"),
        }
    }
}

/// Bus transaction error classification.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The slave did not acknowledge the address or a data byte.
    NoAcknowledge(NoAcknowledgeSource),
    /// Another master won ownership of the bus.
    ArbitrationLost,
    /// A phase did not complete within the configured poll limit, or the
    /// bus never went idle.
    BusTimeout,
    /// Slave address does not fit in seven bits.
    InvalidAddress,
    /// A transfer was requested with nothing to send or receive.
    ZeroLengthTransfer,
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> ErrorKind {
        match *self {
            Error::NoAcknowledge(source) => ErrorKind::NoAcknowledge(source),
            Error::ArbitrationLost => ErrorKind::ArbitrationLoss,
            Error::BusTimeout => ErrorKind::Bus,
            Error::InvalidAddress | Error::ZeroLengthTransfer => ErrorKind::Other,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoAcknowledge(NoAcknowledgeSource::Address) => f.write_str("address not acknowledged"),
            Error::NoAcknowledge(NoAcknowledgeSource::Data) => f.write_str("data not acknowledged"),
            Error::NoAcknowledge(NoAcknowledgeSource::Unknown) => f.write_str("not acknowledged"),
            Error::ArbitrationLost => f.write_str("arbitration lost"),
            Error::BusTimeout => f.write_str("bus timeout"),
            Error::InvalidAddress => f.write_str("invalid 7-bit address"),
            Error::ZeroLengthTransfer => f.write_str("zero-length transfer"),
        }
    }
}

pub struct I2cConfig {
    pub speed: I2cSpeed,
    pub input_clock: HertzU32,
    pub busy_poll_limit: u32,
}

impl I2cConfig {
    /// Value for `MTPR.TPR`: `input_clock / (2 * 10 * bus_frequency) - 1`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::PeriodOutOfRange`] when the input clock
    /// is too slow or too fast for the 7-bit period field.
    pub fn timer_period(&self) -> Result<u8, ConfigurationError> {
        let bus = self.speed.frequency().raw();
        let divisor = 2 * SCL_PERIODS_PER_CYCLE * bus;
        let period = (self.input_clock.raw() / divisor).saturating_sub(1);
        if period == 0 || period > MAX_TIMER_PERIOD {
            return Err(ConfigurationError::PeriodOutOfRange { period });
        }
        u8::try_from(period).map_err(|_| ConfigurationError::PeriodOutOfRange { period })
    }

    /// SCL frequency actually produced by [`Self::timer_period`].
    ///
    /// # Errors
    ///
    /// Propagates the period calculation error.
    pub fn effective_frequency(&self) -> Result<HertzU32, ConfigurationError> {
        let period = u32::from(self.timer_period()?);
        let divisor = 2 * SCL_PERIODS_PER_CYCLE * (period + 1);
        Ok(HertzU32::from_raw(self.input_clock.raw() / divisor))
    }
}

impl Default for I2cConfig {
    fn default() -> Self {
        I2cConfigBuilder::new().build()
    }
}

pub struct I2cConfigBuilder {
    speed: I2cSpeed,
    input_clock: Option<HertzU32>,
    busy_poll_limit: u32,
}

impl Default for I2cConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl I2cConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            speed: I2cSpeed::Standard,
            input_clock: None,
            busy_poll_limit: DEFAULT_BUSY_POLL_LIMIT,
        }
    }
    #[must_use]
    pub fn speed(mut self, speed: I2cSpeed) -> Self {
        self.speed = speed;
        self
    }
    #[must_use]
    pub fn input_clock(mut self, clock: HertzU32) -> Self {
        self.input_clock = Some(clock);
        self
    }
    /// A limit of zero is raised to one so every phase gets at least one poll.
    #[must_use]
    pub fn busy_poll_limit(mut self, polls: u32) -> Self {
        self.busy_poll_limit = polls.max(1);
        self
    }
    #[must_use]
    pub fn build(self) -> I2cConfig {
        I2cConfig {
            speed: self.speed,
            input_clock: self.input_clock.unwrap_or(PIOSC_FREQUENCY),
            busy_poll_limit: self.busy_poll_limit,
        }
    }
}
