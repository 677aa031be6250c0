#![allow(dead_code)]

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use rfid_gate::transceiver::Block;
use rfid_gate::{
    Gate, GateConfig, KeyType, MifareKey, RFIDError, RelayActuator, RelayTiming, RetainedRegion,
    Sleeper, Transceiver, Uid,
};
use ufmt::uWrite;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Pin(&'static str, bool),
    DelayMs(u32),
    Present,
    Serial,
    Auth(u8),
    Read(u8),
    Write(u8),
    Halt,
    StopCrypto,
    ArmWake(u32),
    Sleep,
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub struct RecordingPin {
    name: &'static str,
    log: EventLog,
}

impl RecordingPin {
    pub fn new(name: &'static str, log: &EventLog) -> Self {
        RecordingPin { name, log: log.clone() }
    }
}

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.log.borrow_mut().push(Event::Pin(self.name, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.log.borrow_mut().push(Event::Pin(self.name, true));
        Ok(())
    }
}

pub struct RecordingDelay {
    log: EventLog,
}

impl RecordingDelay {
    pub fn new(log: &EventLog) -> Self {
        RecordingDelay { log: log.clone() }
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(Event::DelayMs(ms));
    }
}

pub struct MockSleeper {
    log: EventLog,
    /// Longest period the fake timer counts in one go.
    pub max_period_us: u32,
}

impl MockSleeper {
    pub fn new(log: &EventLog) -> Self {
        MockSleeper { log: log.clone(), max_period_us: u32::MAX }
    }
}

impl Sleeper for MockSleeper {
    fn timer_period_us(&self, duration_us: u32) -> u32 {
        duration_us.min(self.max_period_us)
    }

    fn arm_wake_timer(&mut self, duration_us: u32) {
        self.log.borrow_mut().push(Event::ArmWake(duration_us));
    }

    fn enter_low_power_sleep(&mut self) {
        self.log.borrow_mut().push(Event::Sleep);
    }
}

/// Serial sink that keeps everything written to it.
#[derive(Default)]
pub struct Capture(pub String);

impl uWrite for Capture {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        self.0.push_str(s);
        Ok(())
    }
}

/// Scripted reader holding the memory of a single MIFARE Classic 1K tag.
pub struct MockReader {
    log: EventLog,
    pub card: Option<Uid>,
    pub serial_error: Option<RFIDError>,
    pub auth_error: Option<RFIDError>,
    pub read_error: Option<RFIDError>,
    pub write_error: Option<RFIDError>,
    pub memory: [Block; 64],
}

impl MockReader {
    pub fn new(log: &EventLog) -> Self {
        MockReader {
            log: log.clone(),
            card: None,
            serial_error: None,
            auth_error: None,
            read_error: None,
            write_error: None,
            memory: [[0u8; 16]; 64],
        }
    }

    pub fn with_card(log: &EventLog, block: u8, data: Block) -> Self {
        let mut reader = MockReader::new(log);
        reader.card = Some(Uid::new(&[0xDE, 0xAD, 0xBE, 0xEF], 0x08));
        reader.memory[block as usize] = data;
        reader
    }
}

impl Transceiver for MockReader {
    fn is_new_card_present(&mut self) -> bool {
        self.log.borrow_mut().push(Event::Present);
        self.card.is_some()
    }

    fn read_card_serial(&mut self) -> Result<Uid, RFIDError> {
        self.log.borrow_mut().push(Event::Serial);
        match (self.serial_error, self.card) {
            (Some(e), _) => Err(e),
            (None, Some(uid)) => Ok(uid),
            (None, None) => Err(RFIDError::Timeout),
        }
    }

    fn authenticate(
        &mut self,
        _key_type: KeyType,
        block: u8,
        _key: &MifareKey,
        _uid: &Uid,
    ) -> Result<(), RFIDError> {
        self.log.borrow_mut().push(Event::Auth(block));
        self.auth_error.map_or(Ok(()), Err)
    }

    fn read_block(&mut self, block: u8) -> Result<Block, RFIDError> {
        self.log.borrow_mut().push(Event::Read(block));
        match self.read_error {
            Some(e) => Err(e),
            None => Ok(self.memory[block as usize]),
        }
    }

    fn write_block(&mut self, block: u8, data: &Block) -> Result<(), RFIDError> {
        self.log.borrow_mut().push(Event::Write(block));
        if let Some(e) = self.write_error {
            return Err(e);
        }
        self.memory[block as usize] = *data;
        Ok(())
    }

    fn halt_card(&mut self) -> Result<(), RFIDError> {
        self.log.borrow_mut().push(Event::Halt);
        Ok(())
    }

    fn stop_crypto(&mut self) {
        self.log.borrow_mut().push(Event::StopCrypto);
    }
}

pub type TestRelay = RelayActuator<RecordingPin, RecordingPin, RecordingPin, RecordingDelay>;

pub fn relay(config: &GateConfig, log: &EventLog) -> TestRelay {
    RelayActuator::new(
        RecordingPin::new("relay", log),
        RecordingPin::new("power", log),
        RecordingPin::new("led", log),
        RecordingDelay::new(log),
        config.relay_idle_high,
        RelayTiming::from_config(config),
    )
}

pub type TestGate<'c, 'r> = Gate<'c, MockReader, TestRelay, &'r mut RetainedRegion, Capture>;

/// Gate over `reader` with a cleared event log, so tests only see what the
/// cycle itself does.
pub fn gate<'c, 'r>(
    config: &'c GateConfig,
    reader: MockReader,
    retained: &'r mut RetainedRegion,
    log: &EventLog,
) -> TestGate<'c, 'r> {
    let gate = Gate::new(config, reader, relay(config, log), retained, Capture::default());
    log.borrow_mut().clear();
    gate
}

pub fn events(log: &EventLog) -> Vec<Event> {
    log.borrow().clone()
}

pub fn pin_events(log: &EventLog) -> Vec<Event> {
    log.borrow()
        .iter()
        .copied()
        .filter(|e| matches!(e, Event::Pin(..)))
        .collect()
}

pub fn count(log: &EventLog, event: Event) -> usize {
    log.borrow().iter().filter(|e| **e == event).count()
}
