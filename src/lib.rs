#![no_std]
// src/lib.rs
//
// MIFARE Classic access gate: poll an MFRC522 for a tag, check one block
// against a reference pattern and pulse a relay when it matches.

pub mod card_types;
pub mod commands;
pub mod config;
pub mod console;
pub mod cs_pin_wrapper;
pub mod decision;
pub mod errors;
pub mod gate;
pub mod registers;
pub mod relay;
pub mod retained;
pub mod rfid_rc522;
pub mod session;
pub mod sleep;
pub mod transceiver;

pub use config::{GateConfig, TargetLocation};
pub use errors::{CycleError, RFIDError};
pub use gate::{CycleOutcome, Decision, Gate, ScanReport};
pub use relay::{Actuator, RelayActuator, RelayTiming};
pub use retained::{RetainedRegion, RetainedState, RetainedStore};
pub use rfid_rc522::RfidRc522;
pub use sleep::Sleeper;
pub use transceiver::{KeyType, MifareKey, Transceiver, Uid};
