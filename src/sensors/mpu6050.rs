// Licensed under the Apache-2.0 license

//! MPU6050 accelerometer and gyroscope.
//!
//! Runs at the power-on full-scale ranges: ±2 g and ±250 °/s. Samples are
//! big-endian register pairs read in one burst per sensor.

use crate::i2c::RegisterAccess;
use crate::sensors::{Axes, SensorError};
use core::f32::consts::PI;
use libm::{atan2f, sqrtf};

pub const ADDRESS: u8 = 0x68;
pub const EXPECTED_ID: u8 = 0x68;

pub const REG_PWR_MGMT_1: u8 = 0x6B;
pub const REG_WHO_AM_I: u8 = 0x75;
pub const REG_ACCEL_XOUT_H: u8 = 0x3B;
pub const REG_GYRO_XOUT_H: u8 = 0x43;

pub const ACCEL_LSB_PER_G: f32 = 16_384.0;
pub const GYRO_LSB_PER_DPS: f32 = 131.0;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Motion {
    /// Acceleration in g.
    pub accel: Axes<f32>,
    /// Angular rate in degrees per second.
    pub gyro: Axes<f32>,
    /// Tilt of each axis from the gravity vector, in degrees.
    pub angle: Axes<f32>,
}

#[derive(Copy, Clone, Debug)]
pub struct Mpu6050 {
    address: u8,
}

impl Default for Mpu6050 {
    fn default() -> Self {
        Self::new(ADDRESS)
    }
}

impl Mpu6050 {
    #[must_use]
    pub const fn new(address: u8) -> Self {
        Self { address }
    }

    /// Check WHO_AM_I and clear the sleep bit.
    ///
    /// # Errors
    ///
    /// Bus failures, or [`SensorError::UnexpectedId`] when another device
    /// answers at the address.
    pub fn init<R: RegisterAccess>(&self, bus: &mut R) -> Result<(), SensorError<R::Error>> {
        let found = bus
            .read_register(self.address, REG_WHO_AM_I)
            .map_err(SensorError::Bus)?;
        if found != EXPECTED_ID {
            return Err(SensorError::UnexpectedId {
                expected: EXPECTED_ID,
                found,
            });
        }
        bus.write_register(self.address, REG_PWR_MGMT_1, 0x00)
            .map_err(SensorError::Bus)
    }

    /// # Errors
    ///
    /// Bus failures.
    pub fn raw_accel<R: RegisterAccess>(&self, bus: &mut R) -> Result<Axes<i16>, R::Error> {
        self.read_axes(bus, REG_ACCEL_XOUT_H)
    }

    /// # Errors
    ///
    /// Bus failures.
    pub fn raw_gyro<R: RegisterAccess>(&self, bus: &mut R) -> Result<Axes<i16>, R::Error> {
        self.read_axes(bus, REG_GYRO_XOUT_H)
    }

    /// Read and scale both sensors.
    ///
    /// # Errors
    ///
    /// Bus failures.
    pub fn motion<R: RegisterAccess>(&self, bus: &mut R) -> Result<Motion, R::Error> {
        let accel = accel_g(self.raw_accel(bus)?);
        let gyro = gyro_dps(self.raw_gyro(bus)?);
        Ok(Motion {
            accel,
            gyro,
            angle: tilt_angles(accel),
        })
    }

    fn read_axes<R: RegisterAccess>(&self, bus: &mut R, register: u8) -> Result<Axes<i16>, R::Error> {
        let mut raw = [0u8; 6];
        bus.read_registers(self.address, register, &mut raw)?;
        let [xh, xl, yh, yl, zh, zl] = raw;
        Ok(Axes {
            x: i16::from_be_bytes([xh, xl]),
            y: i16::from_be_bytes([yh, yl]),
            z: i16::from_be_bytes([zh, zl]),
        })
    }
}

#[must_use]
pub fn accel_g(raw: Axes<i16>) -> Axes<f32> {
    scale(raw, ACCEL_LSB_PER_G)
}

#[must_use]
pub fn gyro_dps(raw: Axes<i16>) -> Axes<f32> {
    scale(raw, GYRO_LSB_PER_DPS)
}

/// Static tilt from an accelerometer sample in g.
///
/// X and Y are roll and pitch against the horizontal plane; Z is the angle
/// between the Z axis and vertical. Only meaningful while the board is not
/// accelerating.
#[must_use]
pub fn tilt_angles(accel: Axes<f32>) -> Axes<f32> {
    let Axes { x, y, z } = accel;
    Axes {
        x: degrees(atan2f(y, sqrtf(x * x + z * z))),
        y: degrees(atan2f(-x, sqrtf(y * y + z * z))),
        z: degrees(atan2f(sqrtf(x * x + y * y), z)),
    }
}

fn degrees(radians: f32) -> f32 {
    radians * 180.0 / PI
}

fn scale(raw: Axes<i16>, lsb_per_unit: f32) -> Axes<f32> {
    Axes {
        x: f32::from(raw.x) / lsb_per_unit,
        y: f32::from(raw.y) / lsb_per_unit,
        z: f32::from(raw.z) / lsb_per_unit,
    }
}
