use ufmt::{uWrite, uwrite, uwriteln};

use crate::card_types::CardType;
use crate::config::GateConfig;
use crate::console::Console;
use crate::decision::decide;
use crate::errors::CycleError;
use crate::relay::Actuator;
use crate::retained::RetainedStore;
use crate::session::{CardSession, ProvisionReport};
use crate::sleep::Sleeper;
use crate::transceiver::{Block, KeyType, Transceiver, Uid, BLOCK_SIZE};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Decision {
    Granted,
    Denied,
}

/// Everything a completed scan produced.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ScanReport {
    pub uid: Uid,
    pub card_type: CardType,
    /// Block the decision was made on. Zeroed when the read failed.
    pub block: Block,
    pub read_error: Option<CycleError>,
    pub decision: Decision,
    pub provisioning: Option<ProvisionReport>,
    pub gate_entries: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CycleOutcome {
    /// Empty field or unreadable UID. The gate goes back to sleep.
    NoCard,
    AuthFailed { uid: Uid, error: CycleError },
    Scanned(ScanReport),
}

/// The access-control loop: one reader, one actuator, one retained counter.
pub struct Gate<'c, T, A, R, W> {
    config: &'c GateConfig,
    reader: T,
    actuator: A,
    retained: R,
    console: Console<W>,
}

impl<'c, T, A, R, W> Gate<'c, T, A, R, W>
where
    T: Transceiver,
    A: Actuator,
    R: RetainedStore,
    W: uWrite,
{
    pub fn new(config: &'c GateConfig, reader: T, actuator: A, retained: R, serial: W) -> Self {
        Gate {
            config,
            reader,
            actuator,
            retained,
            console: Console::new(serial, config.debug),
        }
    }

    /// Arms the wake source. Runs once per wake, before the first cycle.
    pub fn start<S: Sleeper>(&mut self, sleeper: &mut S) {
        sleeper.arm_wake_timer(self.config.wake_interval_us);
        let target = self.config.target;
        if !target.is_consistent() {
            uwriteln!(
                self.console,
                "Block {} is not protected by trailer {} of sector {}",
                target.data_block,
                target.trailer_block,
                target.sector
            )
            .ok();
        }
        let entries = self.retained.load().gate_entries;
        uwriteln!(self.console, "Gate entries so far: {}", entries).ok();
    }

    /// One cycle, then sleep if no card was found.
    pub fn poll<S: Sleeper>(&mut self, sleeper: &mut S) -> CycleOutcome {
        let outcome = self.run_cycle();
        if outcome == CycleOutcome::NoCard {
            uwriteln!(self.console, "Going to deep sleep").ok();
            self.sleep_for(sleeper, self.config.wake_interval_us, true);
        }
        outcome
    }

    /// Sleeps through the part of the last wake interval the timer could not
    /// cover in one period. Returns false when nothing was left over.
    pub fn resume_sleep<S: Sleeper>(&mut self, sleeper: &mut S) -> bool {
        let pending = self.retained.load().sleep_remaining_us;
        if pending == 0 {
            return false;
        }
        self.sleep_for(sleeper, pending, false);
        true
    }

    pub fn run<S: Sleeper>(&mut self, sleeper: &mut S) -> ! {
        self.start(sleeper);
        loop {
            if !self.resume_sleep(sleeper) {
                self.poll(sleeper);
            }
        }
    }

    /// `armed` says the timer already holds `duration_us`.
    fn sleep_for<S: Sleeper>(&mut self, sleeper: &mut S, duration_us: u32, armed: bool) {
        let period = match sleeper.timer_period_us(duration_us) {
            0 => duration_us,
            p => p.min(duration_us),
        };
        let remaining = duration_us - period;

        let mut state = self.retained.load();
        if state.sleep_remaining_us != remaining {
            state.sleep_remaining_us = remaining;
            self.retained.store(&state);
        }
        if !armed || period != duration_us {
            sleeper.arm_wake_timer(period);
        }
        sleeper.enter_low_power_sleep();
    }

    /// Detect, authenticate, read, decide, actuate, optionally provision,
    /// and close the card session.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        let config = self.config;
        let target = config.target;
        let console = &mut self.console;

        let mut session = match CardSession::open(&mut self.reader) {
            Ok(session) => session,
            Err(_) => return CycleOutcome::NoCard,
        };

        let uid = *session.uid();
        let card_type = uid.card_type();
        console.write_str("Card UID: ").ok();
        console.hex(uid.as_bytes());
        uwriteln!(console, "").ok();
        uwriteln!(console, "PICC type: {}", card_type.name()).ok();
        if !card_type.is_mifare_classic() {
            let advisory = CycleError::IncompatibleCardType(card_type);
            uwriteln!(console, "Not a MIFARE Classic card, continuing: {:?}", advisory).ok();
        }

        uwriteln!(console, "Authenticating using key A...").ok();
        if let Err(error) = session.authenticate(KeyType::A, target.trailer_block, &config.key) {
            uwriteln!(console, "Authentication failed: {:?}", error).ok();
            session.end_session();
            return CycleOutcome::AuthFailed { uid, error };
        }

        if console.is_enabled() {
            uwriteln!(console, "Current data in sector:").ok();
            session.dump_sector(target.sector, &config.key, console);
        }

        uwriteln!(console, "Reading data from block {} ...", target.data_block).ok();
        let (block, read_error) = match session.read_block(target.data_block) {
            Ok(block) => (block, None),
            Err(error) => {
                uwriteln!(console, "Read failed: {:?}", error).ok();
                ([0u8; BLOCK_SIZE], Some(error))
            }
        };

        let decision = if decide(&block, &config.reference) {
            self.actuator.activate();
            let entries = self.retained.increment_entries();
            uwriteln!(console, "Relay has been switched on, entry {}", entries).ok();
            Decision::Granted
        } else {
            self.actuator.indicate_rejection();
            uwriteln!(console, "Relay has not been switched on").ok();
            uwrite!(console, "buffer   : ").ok();
            console.hex(&block);
            uwriteln!(console, "").ok();
            uwrite!(console, "validblk : ").ok();
            console.hex(&config.reference);
            uwriteln!(console, "").ok();
            Decision::Denied
        };

        // Runs whatever the decision was
        let provisioning = if config.write_enable {
            uwriteln!(console, "Writing data into block {} ...", target.data_block).ok();
            console.hex(&config.reference);
            uwriteln!(console, "").ok();

            let report = session.provision(target.data_block, &config.reference);
            if let Err(e) = report.write {
                uwriteln!(console, "Write failed: {}", e.name()).ok();
            }
            match report.read_back {
                Ok(data) => {
                    uwrite!(console, "Data in block {}: ", target.data_block).ok();
                    console.hex(&data);
                    uwriteln!(console, "").ok();
                }
                Err(e) => {
                    uwriteln!(console, "Read back failed: {}", e.name()).ok();
                }
            }
            uwriteln!(console, "Number of bytes that match = {}", report.matched).ok();
            // The match count alone decides; a write error was logged above
            if report.verified() {
                uwriteln!(console, "Success").ok();
            } else {
                let mismatch = CycleError::VerifyMismatch { matched: report.matched };
                uwriteln!(console, "Failure: {:?}", mismatch).ok();
            }

            if console.is_enabled() {
                uwriteln!(console, "Current data in sector:").ok();
                session.dump_sector(target.sector, &config.key, console);
            }
            Some(report)
        } else {
            None
        };

        session.end_session();

        CycleOutcome::Scanned(ScanReport {
            uid,
            card_type,
            block,
            read_error,
            decision,
            provisioning,
            gate_entries: self.retained.load().gate_entries,
        })
    }

    pub fn config(&self) -> &GateConfig {
        self.config
    }

    pub fn reader(&self) -> &T {
        &self.reader
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn retained(&self) -> &R {
        &self.retained
    }

    pub fn serial(&self) -> &W {
        self.console.serial()
    }
}
