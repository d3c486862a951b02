// Licensed under the Apache-2.0 license

//! Master control/status register encodings.
//!
//! `I2CMCS` is a split register: writes issue a [`MasterCommand`], reads
//! return a [`StatusSnapshot`]. Bit positions follow the TM4C123GH6PM data
//! sheet and must not be changed.

use crate::i2c::common::Error;
use core::ops::BitOr;
use embedded_hal::i2c::NoAcknowledgeSource;

/// Value written to the write side of `I2CMCS`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MasterCommand(u8);

impl MasterCommand {
    pub const RUN: Self = Self(0x01);
    pub const START: Self = Self(0x02);
    pub const STOP: Self = Self(0x04);
    pub const ACK: Self = Self(0x08);

    /// Start, transfer one byte and stop.
    pub const SINGLE: Self = Self(0x07);
    /// Start and transfer without releasing the bus.
    pub const BURST_START: Self = Self(0x03);
    /// Transfer the next byte of an open transaction.
    pub const BURST_CONTINUE: Self = Self(0x01);
    /// Transfer the last byte and stop. On receive the byte is not acknowledged.
    pub const BURST_FINISH: Self = Self(0x05);
    /// Repeated start in receive direction, acknowledging the byte.
    pub const RECEIVE_START_ACK: Self = Self(0x0B);
    /// Receive the next byte and acknowledge it.
    pub const RECEIVE_CONTINUE_ACK: Self = Self(0x09);
    /// Stop condition alone, used to release the bus after a failure.
    pub const STOP_ONLY: Self = Self(0x04);

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn starts(self) -> bool {
        self.contains(Self::START)
    }

    #[must_use]
    pub const fn stops(self) -> bool {
        self.contains(Self::STOP)
    }

    /// Command bits for one byte of a transfer.
    ///
    /// `start` marks the first byte after a (repeated) start, `stop` the
    /// final byte of the transaction and `ack` a received byte that is
    /// followed by more received bytes.
    #[must_use]
    pub const fn for_byte(start: bool, stop: bool, ack: bool) -> Self {
        let mut bits = Self::RUN.0;
        if start {
            bits |= Self::START.0;
        }
        if stop {
            bits |= Self::STOP.0;
        }
        if ack {
            bits |= Self::ACK.0;
        }
        Self(bits)
    }
}

impl BitOr for MasterCommand {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// One read of the status side of `I2CMCS`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusSnapshot(u8);

impl StatusSnapshot {
    pub const BUSY: u8 = 0x01;
    pub const ERROR: u8 = 0x02;
    pub const ADRACK: u8 = 0x04;
    pub const DATACK: u8 = 0x08;
    pub const ARBLST: u8 = 0x10;
    pub const IDLE: u8 = 0x20;
    pub const BUSBSY: u8 = 0x40;
    pub const CLKTO: u8 = 0x80;

    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Controller is still working on the last command.
    #[must_use]
    pub const fn busy(self) -> bool {
        self.0 & Self::BUSY != 0
    }

    /// Some master (possibly another one) currently owns the bus.
    #[must_use]
    pub const fn bus_busy(self) -> bool {
        self.0 & Self::BUSBSY != 0
    }

    #[must_use]
    pub const fn idle(self) -> bool {
        self.0 & Self::IDLE != 0
    }

    /// Classify the outcome of a completed phase.
    ///
    /// # Errors
    ///
    /// Returns the failure recorded by the controller for the last phase.
    /// ARBLST counts as a failure whether or not ERROR accompanies it.
    pub const fn check(self) -> Result<(), Error> {
        if self.0 & Self::CLKTO != 0 {
            return Err(Error::BusTimeout);
        }
        if self.0 & Self::ARBLST != 0 {
            return Err(Error::ArbitrationLost);
        }
        if self.0 & Self::ERROR == 0 {
            return Ok(());
        }
        if self.0 & Self::ADRACK != 0 {
            Err(Error::NoAcknowledge(NoAcknowledgeSource::Address))
        } else if self.0 & Self::DATACK != 0 {
            Err(Error::NoAcknowledge(NoAcknowledgeSource::Data))
        } else {
            Err(Error::NoAcknowledge(NoAcknowledgeSource::Unknown))
        }
    }
}
