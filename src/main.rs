// Licensed under the Apache-2.0 license

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use embedded_io::Write;
use panic_halt as _;

use tiva_ddk::common::RingLogger;
use tiva_ddk::i2c::common::PIOSC_FREQUENCY;
use tiva_ddk::i2c::system_setup::I2cSystemSetup;
use tiva_ddk::i2c::{I2cConfig, I2cController, Tm4cI2c};
use tiva_ddk::led::LaunchpadLed;
use tiva_ddk::pinctrl::{PinCtrl, PinMux, PINCTRL_UART0};
use tiva_ddk::syscon::{ClockControl, ClockId, SysCon};
use tiva_ddk::tests::functional::module_test::{
    prepare_module_test, run_module_test, Board, ModuleTest,
};
use tiva_ddk::timer::WideTimerDelay;
use tiva_ddk::uart::{self, UartController};

/// Routine run forever after bring-up.
const SELECTED_TEST: ModuleTest = ModuleTest::FullSystem;

fn halt() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}

#[entry]
fn main() -> ! {
    let Some(peripherals) = tm4c123x::Peripherals::take() else {
        halt();
    };

    let mut syscon = SysCon::new(peripherals.SYSCTL);
    let mut pins = PinCtrl::new(peripherals.GPIO_PORTA, peripherals.GPIO_PORTB);

    // Without a console there is nowhere to report anything else.
    let console_up = syscon.enable(&ClockId::Uart0).is_ok()
        && syscon.enable(&ClockId::GpioA).is_ok()
        && pins.apply(PINCTRL_UART0).is_ok();
    if !console_up {
        halt();
    }
    let mut console = UartController::new(peripherals.UART0);
    console.init(&uart::Config::default());
    let _ = write!(console, "\r\nTM4C123 module test\r\n");

    if syscon.enable(&ClockId::WideTimer0).is_err() {
        let _ = write!(console, "wide timer 0 clock not ready\r\n");
        halt();
    }
    let mut delay = WideTimerDelay::new(peripherals.WTIMER0, PIOSC_FREQUENCY);

    if syscon.enable(&ClockId::GpioF).is_err() {
        let _ = write!(console, "port F clock not ready\r\n");
        halt();
    }
    let mut led = LaunchpadLed::new(peripherals.GPIO_PORTF);
    led.init();

    if let Err(error) = I2cSystemSetup::initialize_i2c_system(&mut syscon, &mut pins) {
        let _ = write!(console, "i2c system setup failed: {error}\r\n");
        halt();
    }
    let mut bus = I2cController::new(
        Tm4cI2c::new(peripherals.I2C0),
        I2cConfig::default(),
        RingLogger::<8>::new(),
    );
    if let Err(error) = bus.configure() {
        let _ = write!(console, "i2c configuration failed: {error}\r\n");
        halt();
    }

    let mut board = Board {
        bus: &mut bus,
        delay: &mut delay,
        led: &mut led,
    };
    let _ = prepare_module_test(SELECTED_TEST, &mut console, &mut board);
    loop {
        let _ = run_module_test(SELECTED_TEST, &mut console, &mut board);
        let _ = board.bus.logger_mut().drain_to(&mut console);
    }
}
