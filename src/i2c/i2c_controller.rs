// Licensed under the Apache-2.0 license

//! Bus handle for the TM4C123 I2C master.
//!
//! [`I2cController`] owns the hardware, the configuration it was programmed
//! with and the transaction engine. It exposes the register-access facade
//! used by sensor drivers and implements the embedded-hal `I2c` trait for
//! everything else.

use crate::common::{Logger, NoOpLogger};
use crate::i2c::common::{ConfigurationError, Error, I2cConfig};
use crate::i2c::engine::{Transaction, TransactionEngine};
use crate::i2c::traits::{I2cHardwareCore, I2cMasterPhases, RegisterAccess};
use embedded_hal::i2c::{Operation, SevenBitAddress};

pub struct I2cController<H: I2cMasterPhases, L: Logger = NoOpLogger> {
    engine: TransactionEngine<H, L>,
    config: I2cConfig,
}

impl<H: I2cMasterPhases, L: Logger> I2cController<H, L> {
    /// Wrap `hardware` without touching it. Call [`Self::configure`] before
    /// the first transaction.
    pub fn new(hardware: H, config: I2cConfig, logger: L) -> Self {
        Self {
            engine: TransactionEngine::new(hardware, &config, logger),
            config,
        }
    }

    /// Program master mode and the SCL period. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured clocks give no valid timer period.
    pub fn configure(&mut self) -> Result<(), ConfigurationError> {
        let result = I2cHardwareCore::init(self.engine.hardware_mut(), &self.config);
        match result {
            Ok(()) => self.engine.logger_mut().debug(format_args!(
                "i2c configured for {} Hz from {} Hz",
                self.config.speed.frequency().raw(),
                self.config.input_clock.raw()
            )),
            Err(error) => self
                .engine
                .logger_mut()
                .error(format_args!("i2c configuration failed: {error}")),
        }
        result
    }

    /// Replace the configuration and re-program the controller.
    ///
    /// # Errors
    ///
    /// Same as [`Self::configure`].
    pub fn reconfigure(&mut self, config: I2cConfig) -> Result<(), ConfigurationError> {
        self.engine.set_busy_poll_limit(config.busy_poll_limit);
        self.config = config;
        self.configure()
    }

    pub fn config(&self) -> &I2cConfig {
        &self.config
    }

    pub fn engine(&self) -> &TransactionEngine<H, L> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TransactionEngine<H, L> {
        &mut self.engine
    }

    pub fn logger_mut(&mut self) -> &mut L {
        self.engine.logger_mut()
    }

    pub fn release(self) -> (H, L) {
        self.engine.into_parts()
    }

    /// # Errors
    ///
    /// Returns the first phase failure of the transaction.
    pub fn read_register(&mut self, address: SevenBitAddress, register: u8) -> Result<u8, Error> {
        self.engine.receive_register(address, register)
    }

    /// # Errors
    ///
    /// Returns the first phase failure of the transaction.
    pub fn write_register(
        &mut self,
        address: SevenBitAddress,
        register: u8,
        value: u8,
    ) -> Result<(), Error> {
        self.engine.transmit_register(address, register, value)
    }

    /// # Errors
    ///
    /// Returns the first phase failure of the transaction.
    pub fn read_registers(
        &mut self,
        address: SevenBitAddress,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), Error> {
        self.engine.burst_receive(address, register, buffer)
    }

    /// # Errors
    ///
    /// Returns the first phase failure of the transaction.
    pub fn write_registers(
        &mut self,
        address: SevenBitAddress,
        register: u8,
        data: &[u8],
    ) -> Result<(), Error> {
        self.engine.burst_transmit(address, register, data)
    }
}

impl<H: I2cMasterPhases, L: Logger> RegisterAccess for I2cController<H, L> {
    type Error = Error;

    fn read_register(&mut self, address: SevenBitAddress, register: u8) -> Result<u8, Error> {
        I2cController::read_register(self, address, register)
    }

    fn write_register(
        &mut self,
        address: SevenBitAddress,
        register: u8,
        value: u8,
    ) -> Result<(), Error> {
        I2cController::write_register(self, address, register, value)
    }

    fn read_registers(
        &mut self,
        address: SevenBitAddress,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), Error> {
        I2cController::read_registers(self, address, register, buffer)
    }

    fn write_registers(
        &mut self,
        address: SevenBitAddress,
        register: u8,
        data: &[u8],
    ) -> Result<(), Error> {
        I2cController::write_registers(self, address, register, data)
    }
}

impl<H: I2cMasterPhases, L: Logger> embedded_hal::i2c::ErrorType for I2cController<H, L> {
    type Error = Error;
}

impl<H: I2cMasterPhases, L: Logger> embedded_hal::i2c::I2c for I2cController<H, L> {
    fn read(&mut self, addr: SevenBitAddress, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.engine.execute(Transaction::read(addr, buffer))
    }

    fn write(&mut self, addr: SevenBitAddress, bytes: &[u8]) -> Result<(), Self::Error> {
        self.engine.execute(Transaction::write(addr, bytes))
    }

    fn write_read(
        &mut self,
        addr: SevenBitAddress,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.engine
            .transaction(addr, &mut [Operation::Write(bytes), Operation::Read(buffer)])
    }

    fn transaction(
        &mut self,
        addr: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.engine.transaction(addr, operations)
    }
}
