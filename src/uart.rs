// Licensed under the Apache-2.0 license

//! Blocking UART0 console.

use core::fmt;
use fugit::HertzU32;
use tm4c123x::UART0;

/// `UARTFR`: transmit FIFO full.
const FR_TXFF: u32 = 1 << 5;
/// `UARTFR`: receive FIFO empty.
const FR_RXFE: u32 = 1 << 4;
/// `UARTFR`: transmitter busy.
const FR_BUSY: u32 = 1 << 3;
/// `UARTCTL`: UARTEN | TXE | RXE.
const CTL_ENABLE: u32 = (1 << 0) | (1 << 8) | (1 << 9);
/// `UARTLCRH`: 8 data bits, FIFOs enabled.
const LCRH_8N1_FIFO: u32 = (0x3 << 5) | (1 << 4);
/// `UARTDR` receive error flags (OE, BE, PE, FE).
const DR_ERROR_MASK: u32 = 0xF00;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub baud_rate: u32,
    pub clock: HertzU32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            clock: HertzU32::from_raw(16_000_000),
        }
    }
}

impl Config {
    /// Integer and fractional baud divisors: `clock / (16 * baud)` with six
    /// fractional bits, rounded.
    #[must_use]
    pub fn divisors(&self) -> (u32, u32) {
        let denominator = 16 * u64::from(self.baud_rate.max(1));
        let scaled = (u64::from(self.clock.raw()) * 64 * 2 / denominator + 1) / 2;
        let integer = u32::try_from(scaled / 64).unwrap_or(u32::MAX);
        let fraction = u32::try_from(scaled % 64).unwrap_or(0);
        (integer, fraction)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    Overrun,
    Break,
    Parity,
    Framing,
}

impl Error {
    fn from_data(bits: u32) -> Option<Self> {
        if bits & (1 << 11) != 0 {
            Some(Error::Overrun)
        } else if bits & (1 << 10) != 0 {
            Some(Error::Break)
        } else if bits & (1 << 9) != 0 {
            Some(Error::Parity)
        } else if bits & (1 << 8) != 0 {
            Some(Error::Framing)
        } else {
            None
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Error::Overrun => "receive overrun",
            Error::Break => "break condition",
            Error::Parity => "parity error",
            Error::Framing => "framing error",
        };
        f.write_str(text)
    }
}

impl embedded_io::Error for Error {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            Error::Overrun => embedded_io::ErrorKind::OutOfMemory,
            Error::Break | Error::Parity | Error::Framing => embedded_io::ErrorKind::InvalidData,
        }
    }
}

pub struct UartController {
    uart: UART0,
}

impl UartController {
    /// The UART0 and GPIO port A clocks must be running and PA0/PA1 routed
    /// with [`crate::pinctrl::PINCTRL_UART0`].
    #[must_use]
    pub fn new(uart: UART0) -> Self {
        Self { uart }
    }

    pub fn init(&mut self, config: &Config) {
        let (integer, fraction) = config.divisors();
        self.uart.ctl.write(|w| unsafe { w.bits(0) });
        self.uart.ibrd.write(|w| unsafe { w.bits(integer) });
        self.uart.fbrd.write(|w| unsafe { w.bits(fraction) });
        self.uart.lcrh.write(|w| unsafe { w.bits(LCRH_8N1_FIFO) });
        // System clock as the baud source.
        self.uart.cc.write(|w| unsafe { w.bits(0) });
        self.uart.ctl.write(|w| unsafe { w.bits(CTL_ENABLE) });
    }

    pub fn free(self) -> UART0 {
        self.uart
    }

    fn flags(&self) -> u32 {
        self.uart.fr.read().bits()
    }

    #[must_use]
    pub fn is_tx_full(&self) -> bool {
        self.flags() & FR_TXFF != 0
    }

    #[must_use]
    pub fn is_data_ready(&self) -> bool {
        self.flags() & FR_RXFE == 0
    }

    pub fn write_byte(&mut self, byte: u8) {
        while self.is_tx_full() {}
        self.uart.dr.write(|w| unsafe { w.bits(u32::from(byte)) });
    }

    /// # Errors
    ///
    /// Returns the receive error flagged with the byte.
    pub fn read_byte(&mut self) -> Result<u8, Error> {
        while !self.is_data_ready() {}
        let bits = self.uart.dr.read().bits();
        if let Some(error) = Error::from_data(bits & DR_ERROR_MASK) {
            return Err(error);
        }
        Ok(u8::try_from(bits & 0xFF).unwrap_or_default())
    }
}

impl embedded_io::ErrorType for UartController {
    type Error = Error;
}

impl embedded_io::Write for UartController {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        for &byte in buf {
            self.write_byte(byte);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        while self.flags() & FR_BUSY != 0 {}
        Ok(())
    }
}

impl embedded_io::Read for UartController {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut count = 0;
        for slot in buf.iter_mut() {
            if count > 0 && !self.is_data_ready() {
                break;
            }
            *slot = self.read_byte()?;
            count += 1;
        }
        Ok(count)
    }
}
