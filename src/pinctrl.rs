// Licensed under the Apache-2.0 license

//! GPIO alternate-function routing.
//!
//! Pin groups are described as static tables and applied in one call, so a
//! peripheral's pins are always switched together.

use crate::i2c::common::ConfigurationError;
use core::fmt;
use tm4c123x::{gpio_porta, GPIO_PORTA, GPIO_PORTB};

/// Pins per GPIO port.
pub const PINS_PER_PORT: u8 = 8;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    A,
    B,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    pub port: Port,
    pub pin: u8,
    /// `GPIOPCTL` function number.
    pub function: u8,
    pub open_drain: bool,
}

/// I2C0: PB2 is SCL, PB3 is SDA. Only SDA is open drain; the controller
/// drives SCL itself.
pub const PINCTRL_I2C0: &[PinConfig] = &[
    PinConfig {
        port: Port::B,
        pin: 2,
        function: 3,
        open_drain: false,
    },
    PinConfig {
        port: Port::B,
        pin: 3,
        function: 3,
        open_drain: true,
    },
];

/// UART0: PA0 is RX, PA1 is TX.
pub const PINCTRL_UART0: &[PinConfig] = &[
    PinConfig {
        port: Port::A,
        pin: 0,
        function: 1,
        open_drain: false,
    },
    PinConfig {
        port: Port::A,
        pin: 1,
        function: 1,
        open_drain: false,
    },
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    InvalidPin { pin: u8 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPin { pin } => write!(f, "pin {pin} out of range"),
        }
    }
}

impl From<Error> for ConfigurationError {
    fn from(error: Error) -> Self {
        match error {
            Error::InvalidPin { pin } => ConfigurationError::InvalidPin { pin },
        }
    }
}

pub trait PinMux {
    type Error;

    /// Route every pin in `pins` to its alternate function.
    ///
    /// # Errors
    ///
    /// Returns an error if a pin does not exist; pins before it stay applied.
    fn apply(&mut self, pins: &[PinConfig]) -> Result<(), Self::Error>;
}

/// `GPIOPCTL` value with `function` placed in the nibble of `pin`.
///
/// # Errors
///
/// Returns [`Error::InvalidPin`] for pins past the end of the port.
pub fn pctl_value(current: u32, pin: u8, function: u8) -> Result<u32, Error> {
    if pin >= PINS_PER_PORT {
        return Err(Error::InvalidPin { pin });
    }
    let shift = u32::from(pin) * 4;
    Ok((current & !(0xF << shift)) | (u32::from(function & 0xF) << shift))
}

pub struct PinCtrl {
    porta: GPIO_PORTA,
    portb: GPIO_PORTB,
}

impl PinCtrl {
    #[must_use]
    pub fn new(porta: GPIO_PORTA, portb: GPIO_PORTB) -> Self {
        Self { porta, portb }
    }

    pub fn free(self) -> (GPIO_PORTA, GPIO_PORTB) {
        (self.porta, self.portb)
    }

    fn port(&self, port: Port) -> &gpio_porta::RegisterBlock {
        match port {
            Port::A => &self.porta,
            Port::B => &self.portb,
        }
    }
}

fn configure_pin(regs: &gpio_porta::RegisterBlock, config: &PinConfig) -> Result<(), Error> {
    let pctl = pctl_value(regs.pctl.read().bits(), config.pin, config.function)?;
    let bit = 1u32 << config.pin;

    regs.amsel.modify(|r, w| unsafe { w.bits(r.bits() & !bit) });
    regs.afsel.modify(|r, w| unsafe { w.bits(r.bits() | bit) });
    regs.odr.modify(|r, w| unsafe {
        w.bits(if config.open_drain {
            r.bits() | bit
        } else {
            r.bits() & !bit
        })
    });
    regs.pctl.write(|w| unsafe { w.bits(pctl) });
    regs.den.modify(|r, w| unsafe { w.bits(r.bits() | bit) });
    Ok(())
}

impl PinMux for PinCtrl {
    type Error = Error;

    fn apply(&mut self, pins: &[PinConfig]) -> Result<(), Self::Error> {
        for config in pins {
            configure_pin(self.port(config.port), config)?;
        }
        Ok(())
    }
}
