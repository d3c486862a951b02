// Licensed under the Apache-2.0 license

//! TM4C123 I2C master driver module.
//!
//! Layers, bottom up:
//!
//! * [`tm4c_i2c`] pokes the I2C0 registers one bus phase at a time.
//! * [`engine`] sequences phases into complete transactions with bounded
//!   busy-waiting and error classification.
//! * [`i2c_controller`] is the owned bus handle: configuration, the
//!   register-access facade and the embedded-hal `I2c` implementation.
//! * [`system_setup`] brings up the clocks and pins the controller needs.

pub mod common;
pub mod engine;
pub mod i2c_controller;
#[cfg(test)]
pub(crate) mod sim;
pub mod status;
pub mod system_setup;
pub mod tm4c_i2c;
pub mod traits;

pub use common::{ConfigurationError, Error, I2cConfig, I2cConfigBuilder, I2cSpeed};
pub use engine::{Transaction, TransactionEngine};
pub use i2c_controller::I2cController;
pub use tm4c_i2c::Tm4cI2c;
pub use traits::{I2cHardwareCore, I2cMasterPhases, RegisterAccess};
