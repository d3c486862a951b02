// Licensed under the Apache-2.0 license

//! Drivers for the devices on the board's I2C0 bus.
//!
//! Drivers hold only their slave address and borrow the bus for each call,
//! so several of them can share one [`RegisterAccess`] handle.
//!
//! [`RegisterAccess`]: crate::i2c::RegisterAccess

use core::fmt;

pub mod mpu6050;
pub mod tcs34727;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError<E> {
    /// The bus transaction failed.
    Bus(E),
    /// The identification register did not hold the expected value.
    UnexpectedId { expected: u8, found: u8 },
}

impl<E: fmt::Display> fmt::Display for SensorError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::Bus(error) => write!(f, "bus error: {error}"),
            SensorError::UnexpectedId { expected, found } => {
                write!(f, "id 0x{found:02x}, expected 0x{expected:02x}")
            }
        }
    }
}

/// Three-axis sample.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Axes<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}
