// Licensed under the Apache-2.0 license

//! I2C System Setup Helper
//!
//! Everything the I2C0 controller needs from outside its own register block:
//! the run-mode clocks of the controller and of GPIO port B, and the PB2/PB3
//! alternate-function routing. Kept apart from the controller so the steps
//! can be checked against mock clock and pin controllers.

use crate::i2c::common::ConfigurationError;
use crate::pinctrl::{PinMux, PINCTRL_I2C0};
use crate::syscon::{ClockControl, ClockId};

/// Helper for I2C system control operations
pub struct I2cSystemSetup;

impl I2cSystemSetup {
    /// Gate on the I2C0 and GPIO port B clocks, wait until both are ready,
    /// then route PB2/PB3 to I2C0 with SDA open drain.
    ///
    /// Safe to call again; every step rewrites the same values.
    ///
    /// # Errors
    ///
    /// * [`ConfigurationError::PeripheralNotReady`] if a clock never reports
    ///   ready.
    /// * [`ConfigurationError::InvalidPin`] if the pin table is malformed.
    pub fn initialize_i2c_system<C, P>(clocks: &mut C, pins: &mut P) -> Result<(), ConfigurationError>
    where
        C: ClockControl,
        P: PinMux,
        ConfigurationError: From<C::Error> + From<P::Error>,
    {
        clocks.enable(&ClockId::I2c0)?;
        clocks.enable(&ClockId::GpioB)?;
        pins.apply(PINCTRL_I2C0)?;
        Ok(())
    }

    /// Gate the I2C0 clock off. The pins keep their routing.
    ///
    /// # Errors
    ///
    /// Propagates the clock controller's error.
    pub fn shutdown_i2c_system<C>(clocks: &mut C) -> Result<(), ConfigurationError>
    where
        C: ClockControl,
        ConfigurationError: From<C::Error>,
    {
        clocks.disable(&ClockId::I2c0)?;
        Ok(())
    }
}
