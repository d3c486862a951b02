// Licensed under the Apache-2.0 license

//! Simulated I2C controller for host tests.
//!
//! Models the TM4C123 master command/status register together with any
//! number of register-file slaves. Every phase the engine issues is recorded
//! so tests can assert on the exact command sequence.

use crate::i2c::common::{ConfigurationError, I2cConfig};
use crate::i2c::status::{MasterCommand, StatusSnapshot};
use crate::i2c::traits::{I2cHardwareCore, I2cMasterPhases};
use std::vec::Vec;

/// A phase as seen on the command register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Issued {
    BeginWrite { address: u8, byte: u8, command: MasterCommand },
    BeginRead { address: u8, command: MasterCommand },
    Continue { byte: Option<u8>, command: MasterCommand },
    Stop,
}

impl Issued {
    pub fn command(&self) -> MasterCommand {
        match *self {
            Issued::BeginWrite { command, .. }
            | Issued::BeginRead { command, .. }
            | Issued::Continue { command, .. } => command,
            Issued::Stop => MasterCommand::STOP_ONLY,
        }
    }
}

/// Controller-level faults.
///
/// A fault fires on every phase after [`SimulatedBus::fault_after`] phases
/// have completed normally. Begin, continue and lone STOP phases all count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusFault {
    /// BUSY stays set forever.
    StuckBusy,
    /// Another master holds the bus: BUSBSY never clears.
    BusHeld,
    /// Arbitration is lost, reported as ERROR | ARBLST.
    ArbitrationLost,
    /// Arbitration is lost, reported through ARBLST alone.
    ArbitrationLostNoError,
    /// CLKTO is raised.
    ClockTimeout,
}

pub struct SimDevice {
    pub address: u8,
    pub registers: [u8; 256],
    /// Applied to the sub-address byte before it becomes the register pointer.
    pub register_mask: u8,
    /// Reject data bytes written after this many have been accepted.
    pub nack_data_after: Option<usize>,
    pointer: u8,
    accepted: usize,
}

impl SimDevice {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            registers: [0; 256],
            register_mask: 0xFF,
            nack_data_after: None,
            pointer: 0,
            accepted: 0,
        }
    }

    pub fn with_registers(mut self, start: u8, values: &[u8]) -> Self {
        for (offset, value) in values.iter().enumerate() {
            self.registers[usize::from(start.wrapping_add(offset as u8))] = *value;
        }
        self
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    /// Next transmit byte is the register pointer.
    WritePointer,
    WriteData,
    Read,
}

pub struct SimulatedBus {
    pub devices: Vec<SimDevice>,
    pub issued: Vec<Issued>,
    pub fault: Option<BusFault>,
    /// Phases that complete normally before `fault` fires.
    pub fault_after: usize,
    pub polls: usize,
    pub init_calls: usize,
    pub timer_period: Option<u8>,
    status: u8,
    data: u8,
    mode: Mode,
    selected: Option<usize>,
    phases: usize,
}

impl SimulatedBus {
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            issued: Vec::new(),
            fault: None,
            fault_after: 0,
            polls: 0,
            init_calls: 0,
            timer_period: None,
            status: StatusSnapshot::IDLE,
            data: 0,
            mode: Mode::Idle,
            selected: None,
            phases: 0,
        }
    }

    pub fn with_device(mut self, device: SimDevice) -> Self {
        self.devices.push(device);
        self
    }

    pub fn with_fault(mut self, fault: BusFault) -> Self {
        self.fault = Some(fault);
        self
    }

    pub fn with_fault_after(mut self, fault: BusFault, phases: usize) -> Self {
        self.fault = Some(fault);
        self.fault_after = phases;
        self
    }

    pub fn device(&self, address: u8) -> &SimDevice {
        self.devices
            .iter()
            .find(|d| d.address == address)
            .expect("no simulated device at address")
    }

    pub fn commands(&self) -> Vec<MasterCommand> {
        self.issued.iter().map(Issued::command).collect()
    }

    pub fn clear_log(&mut self) {
        self.issued.clear();
        self.polls = 0;
    }

    /// Count one phase and return the fault it runs into, if any.
    fn phase_fault(&mut self) -> Option<BusFault> {
        self.phases += 1;
        match self.fault {
            Some(BusFault::BusHeld) | None => None,
            Some(fault) if self.phases > self.fault_after => Some(fault),
            Some(_) => None,
        }
    }

    fn finish(&mut self, command: MasterCommand) {
        if command.stops() {
            self.mode = Mode::Idle;
            self.selected = None;
            self.status = StatusSnapshot::IDLE;
        } else {
            self.status = StatusSnapshot::BUSBSY;
        }
    }

    fn fail(&mut self, bits: u8, command: MasterCommand) {
        self.status = StatusSnapshot::ERROR | bits;
        if command.stops() {
            self.mode = Mode::Idle;
            self.selected = None;
        } else {
            self.status |= StatusSnapshot::BUSBSY;
        }
    }

    /// Applies the controller fault for this phase. Returns true when the
    /// phase was consumed by the fault.
    fn apply_fault(&mut self) -> bool {
        let Some(fault) = self.phase_fault() else {
            return false;
        };
        match fault {
            BusFault::StuckBusy => {
                self.status = StatusSnapshot::BUSY | StatusSnapshot::BUSBSY;
            }
            BusFault::ArbitrationLost => {
                self.status = StatusSnapshot::ERROR | StatusSnapshot::ARBLST;
                self.mode = Mode::Idle;
                self.selected = None;
            }
            BusFault::ArbitrationLostNoError => {
                self.status = StatusSnapshot::ARBLST | StatusSnapshot::IDLE;
                self.mode = Mode::Idle;
                self.selected = None;
            }
            BusFault::ClockTimeout => {
                self.status = StatusSnapshot::CLKTO | StatusSnapshot::BUSBSY;
            }
            BusFault::BusHeld => return false,
        }
        true
    }

    fn address(&mut self, address: u8, command: MasterCommand) -> Option<usize> {
        let found = self.devices.iter().position(|d| d.address == address);
        if found.is_none() {
            self.fail(StatusSnapshot::ADRACK, command);
        }
        self.selected = found;
        found
    }

    fn receive(&mut self, command: MasterCommand) {
        if let Some(index) = self.selected {
            let device = &mut self.devices[index];
            self.data = device.registers[usize::from(device.pointer)];
            device.pointer = device.pointer.wrapping_add(1);
        }
        self.finish(command);
    }

    fn transmit(&mut self, byte: u8, command: MasterCommand) {
        let Some(index) = self.selected else {
            self.fail(StatusSnapshot::DATACK, command);
            return;
        };
        let device = &mut self.devices[index];
        match self.mode {
            Mode::WritePointer => {
                device.pointer = byte & device.register_mask;
                self.mode = Mode::WriteData;
            }
            _ => {
                if device.nack_data_after.is_some_and(|limit| device.accepted >= limit) {
                    self.fail(StatusSnapshot::DATACK, command);
                    return;
                }
                device.registers[usize::from(device.pointer)] = byte;
                device.pointer = device.pointer.wrapping_add(1);
                device.accepted += 1;
            }
        }
        self.finish(command);
    }
}

impl I2cHardwareCore for SimulatedBus {
    fn init(&mut self, config: &I2cConfig) -> Result<(), ConfigurationError> {
        self.init_calls += 1;
        self.timer_period = Some(config.timer_period()?);
        Ok(())
    }
}

impl I2cMasterPhases for SimulatedBus {
    fn begin_write(&mut self, address: u8, byte: u8, command: MasterCommand) {
        self.issued.push(Issued::BeginWrite { address, byte, command });
        if self.apply_fault() {
            return;
        }
        if self.address(address, command).is_some() {
            self.mode = Mode::WritePointer;
            self.transmit(byte, command);
        }
    }

    fn begin_read(&mut self, address: u8, command: MasterCommand) {
        self.issued.push(Issued::BeginRead { address, command });
        if self.apply_fault() {
            return;
        }
        if self.address(address, command).is_some() {
            self.mode = Mode::Read;
            self.receive(command);
        }
    }

    fn continue_transfer(&mut self, byte: Option<u8>, command: MasterCommand) {
        self.issued.push(Issued::Continue { byte, command });
        if self.apply_fault() {
            return;
        }
        match byte {
            Some(byte) => self.transmit(byte, command),
            None => self.receive(command),
        }
    }

    fn end_transfer(&mut self) {
        self.issued.push(Issued::Stop);
        // A STOP still releases the bus after arbitration or clock faults.
        if self.phase_fault() == Some(BusFault::StuckBusy) {
            self.status = StatusSnapshot::BUSY | StatusSnapshot::BUSBSY;
            return;
        }
        self.mode = Mode::Idle;
        self.selected = None;
        self.status = StatusSnapshot::IDLE;
    }

    fn poll_status(&mut self) -> StatusSnapshot {
        self.polls += 1;
        let mut status = self.status;
        if self.fault == Some(BusFault::BusHeld) {
            status = (status | StatusSnapshot::BUSBSY) & !StatusSnapshot::IDLE;
        }
        StatusSnapshot::from_bits(status)
    }

    fn read_data(&mut self) -> u8 {
        self.data
    }
}
