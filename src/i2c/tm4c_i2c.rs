// Licensed under the Apache-2.0 license

//! TM4C123 I2C0 master registers behind [`I2cMasterPhases`].

use crate::i2c::common::{ConfigurationError, I2cConfig};
use crate::i2c::status::{MasterCommand, StatusSnapshot};
use crate::i2c::traits::{I2cHardwareCore, I2cMasterPhases};
use embedded_hal::i2c::SevenBitAddress;
use tm4c123x::I2C0;

/// `I2CMCR.MFE`: master function enable.
const MCR_MASTER_ENABLE: u32 = 0x10;
/// `I2CMSA.R/S`: receive when set.
const MSA_RECEIVE: u32 = 0x01;
/// The BUSY bit lags the command write by a few cycles.
const COMMAND_SETTLE_CYCLES: u32 = 4;

pub struct Tm4cI2c {
    regs: I2C0,
}

impl Tm4cI2c {
    /// The I2C0 and GPIO port B clocks must already be running; see
    /// [`crate::i2c::system_setup::I2cSystemSetup`].
    #[must_use]
    pub fn new(regs: I2C0) -> Self {
        Self { regs }
    }

    pub fn free(self) -> I2C0 {
        self.regs
    }

    fn load_address(&mut self, address: SevenBitAddress, receive: bool) {
        let mut bits = u32::from(address & 0x7F) << 1;
        if receive {
            bits |= MSA_RECEIVE;
        }
        self.regs.msa.write(|w| unsafe { w.bits(bits) });
    }

    fn issue(&mut self, command: MasterCommand) {
        self.regs
            .mcs
            .write(|w| unsafe { w.bits(u32::from(command.bits())) });
        cortex_m::asm::delay(COMMAND_SETTLE_CYCLES);
    }
}

impl I2cHardwareCore for Tm4cI2c {
    fn init(&mut self, config: &I2cConfig) -> Result<(), ConfigurationError> {
        let period = config.timer_period()?;
        self.regs.mcr.write(|w| unsafe { w.bits(MCR_MASTER_ENABLE) });
        self.regs
            .mtpr
            .write(|w| unsafe { w.bits(u32::from(period)) });
        Ok(())
    }
}

impl I2cMasterPhases for Tm4cI2c {
    fn begin_write(&mut self, address: SevenBitAddress, byte: u8, command: MasterCommand) {
        self.load_address(address, false);
        self.regs.mdr.write(|w| unsafe { w.bits(u32::from(byte)) });
        self.issue(command);
    }

    fn begin_read(&mut self, address: SevenBitAddress, command: MasterCommand) {
        self.load_address(address, true);
        self.issue(command);
    }

    fn continue_transfer(&mut self, byte: Option<u8>, command: MasterCommand) {
        if let Some(byte) = byte {
            self.regs.mdr.write(|w| unsafe { w.bits(u32::from(byte)) });
        }
        self.issue(command);
    }

    fn end_transfer(&mut self) {
        self.issue(MasterCommand::STOP_ONLY);
    }

    fn poll_status(&mut self) -> StatusSnapshot {
        let bits = self.regs.mcs.read().bits() & 0xFF;
        StatusSnapshot::from_bits(u8::try_from(bits).unwrap_or(StatusSnapshot::BUSY))
    }

    fn read_data(&mut self) -> u8 {
        u8::try_from(self.regs.mdr.read().bits() & 0xFF).unwrap_or_default()
    }
}
