// Licensed under the Apache-2.0 license

//! Polled I2C master transaction engine.
//!
//! The engine drives an [`I2cMasterPhases`] implementation through the
//! phases of one transaction:
//!
//! ```text
//! Idle -> AddressPhase -> (RepeatedAddressPhase) -> DataPhase -> StopPhase -> Idle
//! ```
//!
//! After every command it polls the status register until the controller
//! clears BUSY, bounded by `busy_poll_limit`, then classifies the result.
//! Failures are returned as soon as they are seen; nothing is retried here.
//! Every exit leaves the bus released: a STOP is issued when the failed
//! command did not carry one, unless arbitration was lost (the bus then
//! belongs to the other master).
//!
//! A "write sub-address, then read" transaction switches direction with a
//! repeated start, never with STOP followed by START.

use crate::common::{Logger, NoOpLogger};
use crate::i2c::common::{Error, I2cConfig};
use crate::i2c::status::{MasterCommand, StatusSnapshot};
use crate::i2c::traits::I2cMasterPhases;
use core::slice;
use embedded_hal::i2c::{Operation, SevenBitAddress};

/// Highest valid 7-bit slave address.
pub const MAX_SEVEN_BIT_ADDRESS: SevenBitAddress = 0x7F;

/// Driver-visible transaction state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Idle,
    AddressPhase,
    RepeatedAddressPhase,
    DataPhase,
    StopPhase,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Write the sub-address, repeated start, read the payload.
    WriteRead,
    WriteOnly,
    ReadOnly,
}

pub enum Payload<'a> {
    Write(&'a [u8]),
    Read(&'a mut [u8]),
}

/// One call's worth of work for the engine.
pub struct Transaction<'a> {
    pub address: SevenBitAddress,
    pub sub_address: Option<u8>,
    pub payload: Payload<'a>,
}

impl<'a> Transaction<'a> {
    #[must_use]
    pub fn read_registers(address: SevenBitAddress, register: u8, buffer: &'a mut [u8]) -> Self {
        Self {
            address,
            sub_address: Some(register),
            payload: Payload::Read(buffer),
        }
    }

    #[must_use]
    pub fn write_registers(address: SevenBitAddress, register: u8, data: &'a [u8]) -> Self {
        Self {
            address,
            sub_address: Some(register),
            payload: Payload::Write(data),
        }
    }

    #[must_use]
    pub fn read(address: SevenBitAddress, buffer: &'a mut [u8]) -> Self {
        Self {
            address,
            sub_address: None,
            payload: Payload::Read(buffer),
        }
    }

    #[must_use]
    pub fn write(address: SevenBitAddress, data: &'a [u8]) -> Self {
        Self {
            address,
            sub_address: None,
            payload: Payload::Write(data),
        }
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        match (&self.payload, self.sub_address) {
            (Payload::Read(_), Some(_)) => Direction::WriteRead,
            (Payload::Read(_), None) => Direction::ReadOnly,
            (Payload::Write(_), _) => Direction::WriteOnly,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match &self.payload {
            Payload::Write(data) => data.len(),
            Payload::Read(buffer) => buffer.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct TransactionEngine<H: I2cMasterPhases, L: Logger = NoOpLogger> {
    hardware: H,
    busy_poll_limit: u32,
    phase: Phase,
    logger: L,
}

impl<H: I2cMasterPhases, L: Logger> TransactionEngine<H, L> {
    pub fn new(hardware: H, config: &I2cConfig, logger: L) -> Self {
        Self {
            hardware,
            busy_poll_limit: config.busy_poll_limit.max(1),
            phase: Phase::Idle,
            logger,
        }
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    pub fn logger_mut(&mut self) -> &mut L {
        &mut self.logger
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_busy_poll_limit(&mut self, polls: u32) {
        self.busy_poll_limit = polls.max(1);
    }

    pub fn into_parts(self) -> (H, L) {
        (self.hardware, self.logger)
    }

    /// Read one register: sub-address write, repeated start, single-byte read.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the first phase that did not complete.
    pub fn receive_register(
        &mut self,
        address: SevenBitAddress,
        register: u8,
    ) -> Result<u8, Error> {
        let mut value = [0u8; 1];
        self.execute(Transaction::read_registers(address, register, &mut value))?;
        let [value] = value;
        Ok(value)
    }

    /// Write one register: sub-address with START, data byte with STOP.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the first phase that did not complete.
    pub fn transmit_register(
        &mut self,
        address: SevenBitAddress,
        register: u8,
        value: u8,
    ) -> Result<(), Error> {
        self.execute(Transaction::write_registers(
            address,
            register,
            slice::from_ref(&value),
        ))
    }

    /// Read `buffer.len()` consecutive registers starting at `register`.
    ///
    /// Every byte but the last is acknowledged; the last one is received
    /// with STOP, which NACKs it and ends the transfer.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the first phase that did not complete.
    pub fn burst_receive(
        &mut self,
        address: SevenBitAddress,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), Error> {
        self.execute(Transaction::read_registers(address, register, buffer))
    }

    /// Write `data` to consecutive registers starting at `register`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the first phase that did not complete.
    pub fn burst_transmit(
        &mut self,
        address: SevenBitAddress,
        register: u8,
        data: &[u8],
    ) -> Result<(), Error> {
        self.execute(Transaction::write_registers(address, register, data))
    }

    /// Run one transaction from START to STOP.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidAddress`] / [`Error::ZeroLengthTransfer`] before
    ///   anything reaches the bus.
    /// * [`Error::BusTimeout`] if the bus never goes idle or a phase never
    ///   completes.
    /// * [`Error::NoAcknowledge`] / [`Error::ArbitrationLost`] as reported
    ///   by the controller.
    pub fn execute(&mut self, transaction: Transaction<'_>) -> Result<(), Error> {
        check_address(transaction.address)?;
        if transaction.is_empty() {
            return Err(Error::ZeroLengthTransfer);
        }
        self.logger.debug(format_args!(
            "i2c 0x{:02x} {:?} reg {:?} len {}",
            transaction.address,
            transaction.direction(),
            transaction.sub_address,
            transaction.len()
        ));

        let Transaction {
            address,
            sub_address,
            payload,
        } = transaction;
        let result = self.wait_for_bus_idle().and_then(|()| match (sub_address, payload) {
            (Some(register), Payload::Write(data)) => {
                self.write_bytes(address, slice::from_ref(&register), true, false)?;
                self.write_bytes(address, data, false, true)
            }
            (None, Payload::Write(data)) => self.write_bytes(address, data, true, true),
            (Some(register), Payload::Read(buffer)) => {
                self.write_bytes(address, slice::from_ref(&register), true, false)?;
                self.read_bytes(address, buffer, true, true, false)
            }
            (None, Payload::Read(buffer)) => self.read_bytes(address, buffer, true, true, false),
        });
        self.finish(address, result)
    }

    /// Run an embedded-hal operation list as one transaction.
    ///
    /// Adjacent operations of the same kind are merged without a restart;
    /// a change of direction produces a repeated start; STOP follows the
    /// last operation.
    ///
    /// # Errors
    ///
    /// Same classification as [`Self::execute`]. Zero-length operations are
    /// rejected with [`Error::ZeroLengthTransfer`].
    pub fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Error> {
        check_address(address)?;
        if operations.is_empty() {
            return Ok(());
        }
        let has_empty = operations.iter().any(|op| match op {
            Operation::Read(buffer) => buffer.is_empty(),
            Operation::Write(bytes) => bytes.is_empty(),
        });
        if has_empty {
            return Err(Error::ZeroLengthTransfer);
        }
        self.logger.debug(format_args!(
            "i2c 0x{:02x} transaction of {} operations",
            address,
            operations.len()
        ));

        let result = self.wait_for_bus_idle().and_then(|()| {
            let mut previous_was_read: Option<bool> = None;
            let mut operations = operations.iter_mut().peekable();
            while let Some(operation) = operations.next() {
                let next = operations.peek();
                let last = next.is_none();
                let next_is_read = matches!(next, Some(Operation::Read(_)));
                match operation {
                    Operation::Write(bytes) => {
                        let start = previous_was_read != Some(false);
                        self.write_bytes(address, *bytes, start, last)?;
                        previous_was_read = Some(false);
                    }
                    Operation::Read(buffer) => {
                        let start = previous_was_read != Some(true);
                        self.read_bytes(address, &mut **buffer, start, last, next_is_read)?;
                        previous_was_read = Some(true);
                    }
                }
            }
            Ok(())
        });
        self.finish(address, result)
    }

    fn finish(&mut self, address: SevenBitAddress, result: Result<(), Error>) -> Result<(), Error> {
        if let Err(error) = result {
            self.logger
                .error(format_args!("i2c 0x{address:02x} failed: {error}"));
        }
        self.phase = Phase::Idle;
        result
    }

    fn write_bytes(
        &mut self,
        address: SevenBitAddress,
        bytes: &[u8],
        start: bool,
        stop: bool,
    ) -> Result<(), Error> {
        let count = bytes.len();
        for (index, &byte) in bytes.iter().enumerate() {
            let first = start && index == 0;
            let last = stop && index + 1 == count;
            let command = MasterCommand::for_byte(first, last, false);
            if first {
                self.enter_address_phase();
                self.hardware.begin_write(address, byte, command);
            } else {
                self.enter_data_phase(command);
                self.hardware.continue_transfer(Some(byte), command);
            }
            self.complete(command)?;
        }
        Ok(())
    }

    /// `ack_last` keeps the final byte acknowledged because another read
    /// segment follows without a restart.
    fn read_bytes(
        &mut self,
        address: SevenBitAddress,
        buffer: &mut [u8],
        start: bool,
        stop: bool,
        ack_last: bool,
    ) -> Result<(), Error> {
        let count = buffer.len();
        for (index, slot) in buffer.iter_mut().enumerate() {
            let first = start && index == 0;
            let final_byte = index + 1 == count;
            let command = MasterCommand::for_byte(first, stop && final_byte, !final_byte || ack_last);
            if first {
                self.enter_address_phase();
                self.hardware.begin_read(address, command);
            } else {
                self.enter_data_phase(command);
                self.hardware.continue_transfer(None, command);
            }
            self.complete(command)?;
            *slot = self.hardware.read_data();
        }
        Ok(())
    }

    fn enter_address_phase(&mut self) {
        self.phase = if self.phase == Phase::Idle {
            Phase::AddressPhase
        } else {
            Phase::RepeatedAddressPhase
        };
    }

    fn enter_data_phase(&mut self, command: MasterCommand) {
        self.phase = if command.stops() {
            Phase::StopPhase
        } else {
            Phase::DataPhase
        };
    }

    /// Wait for the phase started by `command` and classify it.
    fn complete(&mut self, command: MasterCommand) -> Result<(), Error> {
        let status = match self.wait_while_busy() {
            Ok(status) => status,
            Err(error) => {
                // The controller is wedged; a STOP is all that is left to try.
                self.hardware.end_transfer();
                self.phase = Phase::Idle;
                return Err(error);
            }
        };
        if let Err(error) = status.check() {
            self.recover(command, error);
            return Err(error);
        }
        if command.stops() {
            self.phase = Phase::Idle;
        }
        Ok(())
    }

    fn recover(&mut self, command: MasterCommand, error: Error) {
        if !command.stops() && error != Error::ArbitrationLost {
            self.hardware.end_transfer();
            // The caller sees the first failure; a wedged STOP is only logged.
            if let Err(stop_error) = self.wait_while_busy() {
                self.logger.error(format_args!(
                    "i2c stop after {error} did not complete: {stop_error}"
                ));
            }
        }
        self.phase = Phase::Idle;
    }

    fn wait_while_busy(&mut self) -> Result<StatusSnapshot, Error> {
        for _ in 0..self.busy_poll_limit {
            let status = self.hardware.poll_status();
            if !status.busy() {
                return Ok(status);
            }
            core::hint::spin_loop();
        }
        Err(Error::BusTimeout)
    }

    fn wait_for_bus_idle(&mut self) -> Result<(), Error> {
        for _ in 0..self.busy_poll_limit {
            if !self.hardware.poll_status().bus_busy() {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        Err(Error::BusTimeout)
    }
}

fn check_address(address: SevenBitAddress) -> Result<(), Error> {
    if address > MAX_SEVEN_BIT_ADDRESS {
        Err(Error::InvalidAddress)
    } else {
        Ok(())
    }
}
