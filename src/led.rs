// Licensed under the Apache-2.0 license

//! LaunchPad RGB LED on port F: PF1 red, PF2 blue, PF3 green.

use crate::sensors::tcs34727::Color;
use tm4c123x::GPIO_PORTF;

/// PF1..PF3 in the port F data and direction registers.
pub const LED_PINS: u32 = 0x0E;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedColor {
    Dark,
    Red,
    Blue,
    Green,
}

impl LedColor {
    /// Port F data bits that light this color.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            LedColor::Dark => 0x00,
            LedColor::Red => 0x02,
            LedColor::Blue => 0x04,
            LedColor::Green => 0x08,
        }
    }
}

impl From<Color> for LedColor {
    fn from(color: Color) -> Self {
        match color {
            Color::Red => LedColor::Red,
            Color::Green => LedColor::Green,
            Color::Blue => LedColor::Blue,
            Color::Nothing => LedColor::Dark,
        }
    }
}

pub trait StatusLed {
    fn set(&mut self, color: LedColor);
}

/// Port F data value with the LED pins replaced and every other pin kept.
#[must_use]
pub const fn data_value(current: u32, color: LedColor) -> u32 {
    (current & !LED_PINS) | color.bits()
}

/// Port F must be clocked ([`ClockId::GpioF`]) before [`LaunchpadLed::init`].
///
/// [`ClockId::GpioF`]: crate::syscon::ClockId::GpioF
pub struct LaunchpadLed {
    port: GPIO_PORTF,
}

impl LaunchpadLed {
    #[must_use]
    pub fn new(port: GPIO_PORTF) -> Self {
        Self { port }
    }

    /// Make PF1..PF3 plain digital outputs and switch the LED off.
    pub fn init(&mut self) {
        let regs = &self.port;
        regs.amsel.modify(|r, w| unsafe { w.bits(r.bits() & !LED_PINS) });
        regs.afsel.modify(|r, w| unsafe { w.bits(r.bits() & !LED_PINS) });
        regs.dir.modify(|r, w| unsafe { w.bits(r.bits() | LED_PINS) });
        regs.den.modify(|r, w| unsafe { w.bits(r.bits() | LED_PINS) });
        self.set(LedColor::Dark);
    }

    pub fn free(self) -> GPIO_PORTF {
        self.port
    }
}

impl StatusLed for LaunchpadLed {
    fn set(&mut self, color: LedColor) {
        self.port
            .data
            .modify(|r, w| unsafe { w.bits(data_value(r.bits(), color)) });
    }
}
