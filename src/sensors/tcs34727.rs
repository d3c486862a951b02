// Licensed under the Apache-2.0 license

//! TCS34727 RGB color sensor.
//!
//! Every register access goes through the command byte: bit 7 set, register
//! address in the low five bits, and type `01` in bits 6:5 for
//! auto-incrementing bursts.

use crate::i2c::RegisterAccess;
use crate::sensors::SensorError;
use embedded_hal::delay::DelayNs;

pub const ADDRESS: u8 = 0x29;
pub const EXPECTED_ID: u8 = 0x4D;

pub const COMMAND: u8 = 0x80;
pub const COMMAND_AUTO_INCREMENT: u8 = 0xA0;

pub const REG_ENABLE: u8 = 0x00;
pub const REG_ATIME: u8 = 0x01;
pub const REG_CONTROL: u8 = 0x0F;
pub const REG_ID: u8 = 0x12;
pub const REG_CDATAL: u8 = 0x14;

pub const ENABLE_PON: u8 = 0x01;
pub const ENABLE_AEN: u8 = 0x02;

/// 2.4 ms integration time: full-scale count of 1024.
pub const ATIME_2_4_MS: u8 = 0xFF;
/// Oscillator warm-up after PON before AEN may be set.
const POWER_ON_DELAY_US: u32 = 2_400;

/// Dominant channel must beat both others by this much on the 0..=255 scale.
pub const DOMINANCE_MARGIN: f32 = 25.0;
/// Clear counts below this are treated as no object in front of the sensor.
pub const MIN_CLEAR: u16 = 20;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawColor {
    pub clear: u16,
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

/// Channels scaled against the clear channel to 0..=255.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    Red,
    Green,
    Blue,
    Nothing,
}

impl Color {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Color::Red => "RED",
            Color::Green => "GREEN",
            Color::Blue => "BLUE",
            Color::Nothing => "NA",
        }
    }
}

impl RawColor {
    #[must_use]
    pub fn normalize(&self) -> Rgb {
        if self.clear == 0 {
            return Rgb::default();
        }
        let clear = f32::from(self.clear);
        let channel = |value: u16| (f32::from(value) / clear * 255.0).min(255.0);
        Rgb {
            r: channel(self.red),
            g: channel(self.green),
            b: channel(self.blue),
        }
    }

    #[must_use]
    pub fn classify(&self) -> Color {
        if self.clear < MIN_CLEAR {
            return Color::Nothing;
        }
        let Rgb { r, g, b } = self.normalize();
        if r > g + DOMINANCE_MARGIN && r > b + DOMINANCE_MARGIN {
            Color::Red
        } else if g > r + DOMINANCE_MARGIN && g > b + DOMINANCE_MARGIN {
            Color::Green
        } else if b > r + DOMINANCE_MARGIN && b > g + DOMINANCE_MARGIN {
            Color::Blue
        } else {
            Color::Nothing
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Tcs34727 {
    address: u8,
}

impl Default for Tcs34727 {
    fn default() -> Self {
        Self::new(ADDRESS)
    }
}

impl Tcs34727 {
    #[must_use]
    pub const fn new(address: u8) -> Self {
        Self { address }
    }

    /// # Errors
    ///
    /// Bus failures.
    pub fn read_id<R: RegisterAccess>(&self, bus: &mut R) -> Result<u8, R::Error> {
        bus.read_register(self.address, COMMAND | REG_ID)
    }

    /// Check the ID, power on, then enable the RGBC engine.
    ///
    /// # Errors
    ///
    /// Bus failures, or [`SensorError::UnexpectedId`].
    pub fn init<R: RegisterAccess, D: DelayNs>(
        &self,
        bus: &mut R,
        delay: &mut D,
    ) -> Result<(), SensorError<R::Error>> {
        let found = self.read_id(bus).map_err(SensorError::Bus)?;
        if found != EXPECTED_ID {
            return Err(SensorError::UnexpectedId {
                expected: EXPECTED_ID,
                found,
            });
        }
        bus.write_register(self.address, COMMAND | REG_ATIME, ATIME_2_4_MS)
            .map_err(SensorError::Bus)?;
        bus.write_register(self.address, COMMAND | REG_CONTROL, 0x00)
            .map_err(SensorError::Bus)?;
        bus.write_register(self.address, COMMAND | REG_ENABLE, ENABLE_PON)
            .map_err(SensorError::Bus)?;
        delay.delay_us(POWER_ON_DELAY_US);
        bus.write_register(self.address, COMMAND | REG_ENABLE, ENABLE_PON | ENABLE_AEN)
            .map_err(SensorError::Bus)
    }

    /// Read clear, red, green and blue in one burst so the four channels
    /// come from the same integration cycle.
    ///
    /// # Errors
    ///
    /// Bus failures.
    pub fn read_raw<R: RegisterAccess>(&self, bus: &mut R) -> Result<RawColor, R::Error> {
        let mut data = [0u8; 8];
        bus.read_registers(self.address, COMMAND_AUTO_INCREMENT | REG_CDATAL, &mut data)?;
        let [cl, ch, rl, rh, gl, gh, bl, bh] = data;
        Ok(RawColor {
            clear: u16::from_le_bytes([cl, ch]),
            red: u16::from_le_bytes([rl, rh]),
            green: u16::from_le_bytes([gl, gh]),
            blue: u16::from_le_bytes([bl, bh]),
        })
    }
}
