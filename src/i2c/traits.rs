// Licensed under the Apache-2.0 license

//! # I2C Hardware Abstraction Traits
//!
//! The traits in this module split the driver at the point where register
//! pokes end and protocol sequencing begins:
//!
//! ```text
//! I2cHardwareCore (controller setup)
//!     └── I2cMasterPhases (one bus phase per call, no waiting)
//!
//! RegisterAccess (sub-addressed register reads and writes, implemented by
//!                 the bus handle and consumed by sensor drivers)
//! ```
//!
//! `I2cMasterPhases` never blocks and never interprets the status register.
//! The transaction engine owns the state machine: it issues a phase, polls
//! [`I2cMasterPhases::poll_status`] until the controller is no longer busy,
//! and classifies the result. A simulated controller implementing these
//! traits is enough to exercise the whole engine on the host.

use crate::i2c::common::{ConfigurationError, I2cConfig};
use crate::i2c::status::{MasterCommand, StatusSnapshot};
use embedded_hal::i2c::SevenBitAddress;

/// Controller-level setup shared by every hardware implementation.
pub trait I2cHardwareCore {
    /// Put the controller in master mode and program its clock period.
    ///
    /// Must be idempotent: calling it again re-applies the same register
    /// values.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be expressed in the
    /// controller's registers.
    fn init(&mut self, config: &I2cConfig) -> Result<(), ConfigurationError>;
}

/// Named master phases of the controller.
///
/// Every method that takes a [`MasterCommand`] writes it to the command
/// register as its last action; the command is expected to carry the RUN
/// bit. Implementations must not wait for the phase to finish.
pub trait I2cMasterPhases: I2cHardwareCore {
    /// Load `address` in write direction and `byte` as the first transmit
    /// byte, then issue `command` (which carries START).
    fn begin_write(&mut self, address: SevenBitAddress, byte: u8, command: MasterCommand);

    /// Load `address` in read direction and issue `command` (which carries
    /// START). When issued while the bus is still owned, this produces a
    /// repeated start.
    fn begin_read(&mut self, address: SevenBitAddress, command: MasterCommand);

    /// Continue an open transaction. `byte` is loaded into the data register
    /// first when transmitting, and is `None` when receiving.
    fn continue_transfer(&mut self, byte: Option<u8>, command: MasterCommand);

    /// Issue a lone STOP to release the bus after a failed phase.
    fn end_transfer(&mut self);

    /// Read the status side of the command register.
    fn poll_status(&mut self) -> StatusSnapshot;

    /// Read the byte received by the last completed receive phase.
    fn read_data(&mut self) -> u8;
}

/// Register-level access to a device behind a 7-bit address.
///
/// Sensor drivers are written against this trait so that they run equally
/// on the real bus handle and on test doubles.
///
/// # Examples
///
/// ```rust,ignore
/// use tiva_ddk::i2c::RegisterAccess;
///
/// fn who_am_i<R: RegisterAccess>(bus: &mut R) -> Result<u8, R::Error> {
///     bus.read_register(0x68, 0x75)
/// }
/// ```
pub trait RegisterAccess {
    /// Error type shared with the embedded-hal ecosystem.
    type Error: embedded_hal::i2c::Error + core::fmt::Debug + core::fmt::Display;

    /// Read one register.
    ///
    /// # Errors
    ///
    /// Returns an error if any phase of the transaction fails.
    fn read_register(&mut self, address: SevenBitAddress, register: u8) -> Result<u8, Self::Error>;

    /// Write one register.
    ///
    /// # Errors
    ///
    /// Returns an error if any phase of the transaction fails.
    fn write_register(
        &mut self,
        address: SevenBitAddress,
        register: u8,
        value: u8,
    ) -> Result<(), Self::Error>;

    /// Read `buffer.len()` consecutive registers starting at `register`.
    ///
    /// # Errors
    ///
    /// Returns an error if any phase of the transaction fails.
    fn read_registers(
        &mut self,
        address: SevenBitAddress,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), Self::Error>;

    /// Write `data` to consecutive registers starting at `register`.
    ///
    /// # Errors
    ///
    /// Returns an error if any phase of the transaction fails.
    fn write_registers(
        &mut self,
        address: SevenBitAddress,
        register: u8,
        data: &[u8],
    ) -> Result<(), Self::Error>;
}
