// Licensed under the Apache-2.0 license

//! On-target bring-up routines, one per peripheral, printing to the console.
//!
//! Routines never panic on device failures: a classified bus error is
//! printed and the routine returns normally, so a missing sensor does not
//! stop the loop in `main`. Only console write failures are returned.

use crate::i2c::RegisterAccess;
use crate::led::{LedColor, StatusLed};
use crate::sensors::mpu6050::Mpu6050;
use crate::sensors::tcs34727::{self, Tcs34727};
use embedded_hal::delay::DelayNs;
use embedded_io::{Write, WriteFmtError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModuleTest {
    Delay,
    Uart,
    I2c,
    Mpu6050,
    Tcs34727,
    /// Motion, tilt and color in one pass, with the color shown on the LED.
    FullSystem,
}

impl ModuleTest {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ModuleTest::Delay => "delay",
            ModuleTest::Uart => "uart",
            ModuleTest::I2c => "i2c",
            ModuleTest::Mpu6050 => "mpu6050",
            ModuleTest::Tcs34727 => "tcs34727",
            ModuleTest::FullSystem => "full system",
        }
    }
}

type ConsoleResult<W> = Result<(), WriteFmtError<<W as embedded_io::ErrorType>::Error>>;

/// Board resources a routine may touch besides the console.
pub struct Board<'a, R, D, L> {
    pub bus: &'a mut R,
    pub delay: &'a mut D,
    pub led: &'a mut L,
}

/// One-time device setup for the routine `test` is about to run in a loop.
///
/// # Errors
///
/// Console write failures only.
pub fn prepare_module_test<W, R, D, L>(
    test: ModuleTest,
    console: &mut W,
    board: &mut Board<'_, R, D, L>,
) -> ConsoleResult<W>
where
    W: Write,
    R: RegisterAccess,
    D: DelayNs,
    L: StatusLed,
{
    write!(console, "\r\n=== {} module test ===\r\n", test.name())?;
    board.led.set(LedColor::Dark);
    match test {
        ModuleTest::Mpu6050 => init_mpu6050(console, board),
        ModuleTest::Tcs34727 => init_tcs34727(console, board),
        ModuleTest::FullSystem => {
            init_mpu6050(console, board)?;
            init_tcs34727(console, board)
        }
        ModuleTest::Delay | ModuleTest::Uart | ModuleTest::I2c => Ok(()),
    }
}

fn init_mpu6050<W, R, D, L>(console: &mut W, board: &mut Board<'_, R, D, L>) -> ConsoleResult<W>
where
    W: Write,
    R: RegisterAccess,
{
    match Mpu6050::default().init(board.bus) {
        Ok(()) => write!(console, "mpu6050 ready\r\n"),
        Err(error) => write!(console, "mpu6050 init failed: {error}\r\n"),
    }
}

fn init_tcs34727<W, R, D, L>(console: &mut W, board: &mut Board<'_, R, D, L>) -> ConsoleResult<W>
where
    W: Write,
    R: RegisterAccess,
    D: DelayNs,
{
    match Tcs34727::default().init(board.bus, board.delay) {
        Ok(()) => write!(console, "tcs34727 ready\r\n"),
        Err(error) => write!(console, "tcs34727 init failed: {error}\r\n"),
    }
}

/// Run one pass of `test`.
///
/// # Errors
///
/// Console write failures only.
pub fn run_module_test<W, R, D, L>(
    test: ModuleTest,
    console: &mut W,
    board: &mut Board<'_, R, D, L>,
) -> ConsoleResult<W>
where
    W: Write,
    R: RegisterAccess,
    D: DelayNs,
    L: StatusLed,
{
    match test {
        ModuleTest::Delay => test_delay(console, board),
        ModuleTest::Uart => test_uart(console, board.delay),
        ModuleTest::I2c => test_i2c(console, board.bus),
        ModuleTest::Mpu6050 => test_mpu6050(console, board),
        ModuleTest::Tcs34727 => test_tcs34727(console, board),
        ModuleTest::FullSystem => test_full_system(console, board),
    }
}

fn test_delay<W, R, D, L>(console: &mut W, board: &mut Board<'_, R, D, L>) -> ConsoleResult<W>
where
    W: Write,
    D: DelayNs,
    L: StatusLed,
{
    write!(console, "delay 500 ms... ")?;
    board.led.set(LedColor::Red);
    board.delay.delay_ms(500);
    board.led.set(LedColor::Dark);
    write!(console, "done\r\n")
}

fn test_uart<W: Write, D: DelayNs>(console: &mut W, delay: &mut D) -> ConsoleResult<W> {
    let integer = 42;
    let float = 3.14159_f32;
    write!(console, "hello world, Integer: {integer}, Float: {float:.6}\r\n")?;
    delay.delay_ms(1000);
    Ok(())
}

fn test_i2c<W: Write, R: RegisterAccess>(console: &mut W, bus: &mut R) -> ConsoleResult<W> {
    match Tcs34727::default().read_id(bus) {
        Ok(id) => write!(console, "TCS34727 id: 0x{id:02x}\r\n"),
        Err(error) => write!(
            console,
            "TCS34727 at 0x{:02x}: {}\r\n",
            tcs34727::ADDRESS,
            error
        ),
    }
}

fn test_mpu6050<W, R, D, L>(console: &mut W, board: &mut Board<'_, R, D, L>) -> ConsoleResult<W>
where
    W: Write,
    R: RegisterAccess,
    D: DelayNs,
{
    match Mpu6050::default().motion(board.bus) {
        Ok(m) => write!(
            console,
            "Accel: X={:.2} Y={:.2} Z={:.2}, Gyro: X={:.2} Y={:.2} Z={:.2}, \
             Angles: X={:.2} Y={:.2} Z={:.2}\r\n",
            m.accel.x, m.accel.y, m.accel.z, m.gyro.x, m.gyro.y, m.gyro.z, m.angle.x, m.angle.y,
            m.angle.z
        )?,
        Err(error) => write!(console, "MPU6050: {error}\r\n")?,
    }
    board.delay.delay_ms(50);
    Ok(())
}

fn test_tcs34727<W, R, D, L>(console: &mut W, board: &mut Board<'_, R, D, L>) -> ConsoleResult<W>
where
    W: Write,
    R: RegisterAccess,
    D: DelayNs,
    L: StatusLed,
{
    match Tcs34727::default().read_raw(board.bus) {
        Ok(raw) => {
            let rgb = raw.normalize();
            let color = raw.classify();
            board.led.set(color.into());
            write!(
                console,
                "R: {:.2}, G: {:.2}, B: {:.2}, Detected: {}\r\n",
                rgb.r,
                rgb.g,
                rgb.b,
                color.as_str()
            )?;
        }
        Err(error) => {
            board.led.set(LedColor::Dark);
            write!(console, "TCS34727: {error}\r\n")?;
        }
    }
    board.delay.delay_ms(10);
    Ok(())
}

fn test_full_system<W, R, D, L>(console: &mut W, board: &mut Board<'_, R, D, L>) -> ConsoleResult<W>
where
    W: Write,
    R: RegisterAccess,
    D: DelayNs,
    L: StatusLed,
{
    match Mpu6050::default().motion(board.bus) {
        Ok(m) => write!(
            console,
            "MPU6050 - Ax: {:.2}, Ay: {:.2}, Az: {:.2}, Gx: {:.2}, Gy: {:.2}, Gz: {:.2}, \
             AngleX: {:.2}\r\n",
            m.accel.x, m.accel.y, m.accel.z, m.gyro.x, m.gyro.y, m.gyro.z, m.angle.x
        )?,
        Err(error) => write!(console, "MPU6050: {error}\r\n")?,
    }

    match Tcs34727::default().read_raw(board.bus) {
        Ok(raw) => {
            let rgb = raw.normalize();
            let color = raw.classify();
            board.led.set(color.into());
            write!(
                console,
                "Color R: {:.2}, G: {:.2}, B: {:.2}, Detected: {}\r\n",
                rgb.r,
                rgb.g,
                rgb.b,
                color.as_str()
            )?;
        }
        Err(error) => {
            board.led.set(LedColor::Dark);
            write!(console, "TCS34727: {error}\r\n")?;
        }
    }
    board.delay.delay_ms(20);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::NoOpLogger;
    use crate::i2c::sim::{SimDevice, SimulatedBus};
    use crate::i2c::{I2cConfig, I2cController};
    use crate::sensors::{mpu6050, tcs34727};
    use std::string::String;
    use std::vec::Vec;

    #[derive(Default)]
    struct Console(Vec<u8>);

    impl Console {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0).into_owned()
        }
    }

    impl embedded_io::ErrorType for Console {
        type Error = core::convert::Infallible;
    }

    impl Write for Console {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingDelay {
        total_ns: u64,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    #[derive(Default)]
    struct RecordingLed(Vec<LedColor>);

    impl StatusLed for RecordingLed {
        fn set(&mut self, color: LedColor) {
            self.0.push(color);
        }
    }

    fn sim_bus() -> I2cController<SimulatedBus> {
        let mut color = SimDevice::new(tcs34727::ADDRESS)
            .with_registers(tcs34727::REG_ID, &[tcs34727::EXPECTED_ID])
            .with_registers(
                tcs34727::REG_CDATAL,
                &[0xE8, 0x03, 0xF4, 0x01, 0x64, 0x00, 0x32, 0x00],
            );
        color.register_mask = 0x1F;
        let imu = SimDevice::new(mpu6050::ADDRESS)
            .with_registers(mpu6050::REG_WHO_AM_I, &[mpu6050::EXPECTED_ID])
            .with_registers(mpu6050::REG_ACCEL_XOUT_H, &[0, 0, 0, 0, 0x40, 0]);
        I2cController::new(
            SimulatedBus::new().with_device(color).with_device(imu),
            I2cConfig::default(),
            NoOpLogger,
        )
    }

    fn empty_bus() -> I2cController<SimulatedBus> {
        I2cController::new(SimulatedBus::new(), I2cConfig::default(), NoOpLogger)
    }

    struct Outcome {
        text: String,
        waited_ns: u64,
        leds: Vec<LedColor>,
    }

    fn run(test: ModuleTest, bus: &mut I2cController<SimulatedBus>, prepare: bool) -> Outcome {
        let mut console = Console::default();
        let mut delay = RecordingDelay::default();
        let mut led = RecordingLed::default();
        let mut board = Board {
            bus,
            delay: &mut delay,
            led: &mut led,
        };
        if prepare {
            prepare_module_test(test, &mut console, &mut board).unwrap();
        }
        run_module_test(test, &mut console, &mut board).unwrap();
        Outcome {
            text: console.text(),
            waited_ns: delay.total_ns,
            leds: led.0,
        }
    }

    #[test]
    fn test_delay_routine_blinks_red() {
        let outcome = run(ModuleTest::Delay, &mut sim_bus(), false);
        assert_eq!(outcome.text, "delay 500 ms... done\r\n");
        assert_eq!(outcome.waited_ns, 500_000_000);
        assert_eq!(outcome.leds, [LedColor::Red, LedColor::Dark]);
    }

    #[test]
    fn test_uart_routine_formats_numbers() {
        let outcome = run(ModuleTest::Uart, &mut sim_bus(), false);
        assert_eq!(outcome.text, "hello world, Integer: 42, Float: 3.141590\r\n");
    }

    #[test]
    fn test_i2c_routine_prints_sensor_id() {
        let outcome = run(ModuleTest::I2c, &mut sim_bus(), false);
        assert_eq!(outcome.text, "TCS34727 id: 0x4d\r\n");
    }

    #[test]
    fn test_i2c_routine_reports_missing_sensor() {
        let outcome = run(ModuleTest::I2c, &mut empty_bus(), false);
        assert_eq!(outcome.text, "TCS34727 at 0x29: address not acknowledged\r\n");
    }

    #[test]
    fn test_mpu6050_routine_prints_angles() {
        let outcome = run(ModuleTest::Mpu6050, &mut sim_bus(), true);
        assert!(outcome.text.contains("mpu6050 ready"));
        assert!(outcome.text.contains("Accel: X=0.00 Y=0.00 Z=1.00"));
        assert!(outcome.text.contains(", Angles: X=0.00 "));
    }

    #[test]
    fn test_tcs34727_routine_classifies_and_lights_led() {
        let outcome = run(ModuleTest::Tcs34727, &mut sim_bus(), true);
        assert!(outcome.text.contains("tcs34727 ready"));
        assert!(outcome
            .text
            .contains("R: 127.50, G: 25.50, B: 12.75, Detected: RED"));
        assert_eq!(outcome.leds.last(), Some(&LedColor::Red));
    }

    #[test]
    fn test_tcs34727_failure_turns_led_off() {
        let outcome = run(ModuleTest::Tcs34727, &mut empty_bus(), false);
        assert_eq!(outcome.text, "TCS34727: address not acknowledged\r\n");
        assert_eq!(outcome.leds, [LedColor::Dark]);
    }

    #[test]
    fn test_full_system_routine() {
        let outcome = run(ModuleTest::FullSystem, &mut sim_bus(), true);
        assert!(outcome.text.contains("mpu6050 ready\r\ntcs34727 ready\r\n"));
        assert!(outcome.text.ends_with(
            "MPU6050 - Ax: 0.00, Ay: 0.00, Az: 1.00, Gx: 0.00, Gy: 0.00, Gz: 0.00, AngleX: 0.00\r\n\
             Color R: 127.50, G: 25.50, B: 12.75, Detected: RED\r\n"
        ));
        assert_eq!(outcome.leds, [LedColor::Dark, LedColor::Red]);
        assert!(outcome.waited_ns >= 20_000_000);
    }

    #[test]
    fn test_failed_init_is_reported_not_fatal() {
        let outcome = run(ModuleTest::Mpu6050, &mut empty_bus(), true);
        assert!(outcome
            .text
            .contains("mpu6050 init failed: bus error: address not acknowledged"));
        assert!(outcome.text.contains("MPU6050: address not acknowledged"));
    }
}
