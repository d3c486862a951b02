// Licensed under the Apache-2.0 license

//! Busy-wait delays on wide timer 0.
//!
//! The timer runs as a single 32-bit one-shot down-counter. Each delay loads
//! the count, starts the timer and polls the time-out raw interrupt flag.
//! Delays longer than one 32-bit load are split into several loads.

use embedded_hal::delay::DelayNs;
use fugit::HertzU32;
use tm4c123x::WTIMER0;

/// `GPTMCFG`: 32-bit timer on a wide timer.
const CFG_32_BIT: u32 = 0x04;
/// `GPTMTAMR`: one-shot, counting down.
const TAMR_ONE_SHOT: u32 = 0x01;
/// `GPTMCTL.TAEN`.
const CTL_TAEN: u32 = 0x01;
/// `GPTMRIS.TATORIS` / `GPTMICR.TATOCINT`.
const TIMEOUT_FLAG: u32 = 0x01;

/// Timer ticks needed for `ns` nanoseconds at `clock`, rounded up.
#[must_use]
pub fn ticks_for_ns(clock: HertzU32, ns: u32) -> u64 {
    let product = u64::from(clock.raw()) * u64::from(ns);
    product.div_ceil(1_000_000_000)
}

pub struct WideTimerDelay {
    timer: WTIMER0,
    clock: HertzU32,
}

impl WideTimerDelay {
    /// The WTIMER0 clock must already be gated on.
    #[must_use]
    pub fn new(timer: WTIMER0, clock: HertzU32) -> Self {
        let mut delay = Self { timer, clock };
        delay.init();
        delay
    }

    pub fn free(self) -> WTIMER0 {
        self.timer
    }

    fn init(&mut self) {
        self.timer.ctl.write(|w| unsafe { w.bits(0) });
        self.timer.cfg.write(|w| unsafe { w.bits(CFG_32_BIT) });
        self.timer.tamr.write(|w| unsafe { w.bits(TAMR_ONE_SHOT) });
    }

    fn run_once(&mut self, ticks: u32) {
        self.timer.ctl.write(|w| unsafe { w.bits(0) });
        self.timer.tailr.write(|w| unsafe { w.bits(ticks.saturating_sub(1)) });
        self.timer.icr.write(|w| unsafe { w.bits(TIMEOUT_FLAG) });
        self.timer.ctl.write(|w| unsafe { w.bits(CTL_TAEN) });
        while self.timer.ris.read().bits() & TIMEOUT_FLAG == 0 {}
        self.timer.icr.write(|w| unsafe { w.bits(TIMEOUT_FLAG) });
    }
}

impl DelayNs for WideTimerDelay {
    fn delay_ns(&mut self, ns: u32) {
        let mut remaining = ticks_for_ns(self.clock, ns);
        while remaining > 0 {
            let chunk = u32::try_from(remaining).unwrap_or(u32::MAX);
            self.run_once(chunk);
            remaining -= u64::from(chunk);
        }
    }
}
