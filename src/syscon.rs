// Licensed under the Apache-2.0 license

//! System control: run-mode clock gating for the peripherals this crate uses.
//!
//! Every gate has a matching bit in a peripheral-ready register. A peripheral
//! must not be touched until that bit is set, so [`SysCon::enable`] waits for
//! it with a bounded poll.

use crate::i2c::common::ConfigurationError;
use core::fmt;
use tm4c123x::SYSCTL;

/// Polls of a peripheral-ready register before giving up.
pub const READY_POLL_LIMIT: u32 = 10_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockId {
    I2c0,
    GpioA,
    GpioB,
    GpioF,
    Uart0,
    WideTimer0,
}

/// Gate register family a clock belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GateGroup {
    I2c,
    Gpio,
    Uart,
    WideTimer,
}

impl ClockId {
    #[must_use]
    pub const fn group(self) -> GateGroup {
        match self {
            ClockId::I2c0 => GateGroup::I2c,
            ClockId::GpioA | ClockId::GpioB | ClockId::GpioF => GateGroup::Gpio,
            ClockId::Uart0 => GateGroup::Uart,
            ClockId::WideTimer0 => GateGroup::WideTimer,
        }
    }

    /// Bit of this clock in its `RCGCx` and `PRx` registers.
    #[must_use]
    pub const fn mask(self) -> u32 {
        match self {
            ClockId::I2c0 | ClockId::GpioA | ClockId::Uart0 | ClockId::WideTimer0 => 1 << 0,
            ClockId::GpioB => 1 << 1,
            ClockId::GpioF => 1 << 5,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    NotReady(ClockId),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotReady(clock) => write!(f, "{clock:?} clock never became ready"),
        }
    }
}

impl From<Error> for ConfigurationError {
    fn from(_: Error) -> Self {
        ConfigurationError::PeripheralNotReady
    }
}

pub trait ClockControl {
    type Error;

    /// Gate `clock_id` on and wait until the peripheral can be accessed.
    ///
    /// # Errors
    ///
    /// Returns an error if the peripheral never reports ready.
    fn enable(&mut self, clock_id: &ClockId) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Implementation defined.
    fn disable(&mut self, clock_id: &ClockId) -> Result<(), Self::Error>;

    fn is_ready(&self, clock_id: &ClockId) -> bool;
}

pub struct SysCon {
    sysctl: SYSCTL,
    ready_poll_limit: u32,
}

impl SysCon {
    #[must_use]
    pub fn new(sysctl: SYSCTL) -> Self {
        Self {
            sysctl,
            ready_poll_limit: READY_POLL_LIMIT,
        }
    }

    pub fn free(self) -> SYSCTL {
        self.sysctl
    }

    fn set_gate(&mut self, clock_id: ClockId, on: bool) {
        let mask = clock_id.mask();
        let update = |bits: u32| if on { bits | mask } else { bits & !mask };
        match clock_id.group() {
            GateGroup::I2c => self
                .sysctl
                .rcgci2c
                .modify(|r, w| unsafe { w.bits(update(r.bits())) }),
            GateGroup::Gpio => self
                .sysctl
                .rcgcgpio
                .modify(|r, w| unsafe { w.bits(update(r.bits())) }),
            GateGroup::Uart => self
                .sysctl
                .rcgcuart
                .modify(|r, w| unsafe { w.bits(update(r.bits())) }),
            GateGroup::WideTimer => self
                .sysctl
                .rcgcwtimer
                .modify(|r, w| unsafe { w.bits(update(r.bits())) }),
        }
    }

    fn ready_bits(&self, group: GateGroup) -> u32 {
        match group {
            GateGroup::I2c => self.sysctl.pri2c.read().bits(),
            GateGroup::Gpio => self.sysctl.prgpio.read().bits(),
            GateGroup::Uart => self.sysctl.pruart.read().bits(),
            GateGroup::WideTimer => self.sysctl.prwtimer.read().bits(),
        }
    }
}

impl ClockControl for SysCon {
    type Error = Error;

    fn enable(&mut self, clock_id: &ClockId) -> Result<(), Self::Error> {
        self.set_gate(*clock_id, true);
        for _ in 0..self.ready_poll_limit {
            if self.is_ready(clock_id) {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        Err(Error::NotReady(*clock_id))
    }

    fn disable(&mut self, clock_id: &ClockId) -> Result<(), Self::Error> {
        self.set_gate(*clock_id, false);
        Ok(())
    }

    fn is_ready(&self, clock_id: &ClockId) -> bool {
        self.ready_bits(clock_id.group()) & clock_id.mask() != 0
    }
}
