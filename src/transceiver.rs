//! The reader capability the gate drives.
//!
//! [`RfidRc522`](crate::RfidRc522) implements it over SPI; tests substitute
//! scripted doubles.

use crate::card_types::CardType;
use crate::errors::RFIDError;

pub const BLOCK_SIZE: usize = 16;
pub const MAX_UID_LEN: usize = 10;

pub type Block = [u8; BLOCK_SIZE];

/// A 6 byte Crypto1 sector key.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MifareKey(pub [u8; 6]);

impl MifareKey {
    /// Transport key programmed at the factory.
    pub const FACTORY: MifareKey = MifareKey([0xFF; 6]);

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyType {
    A,
    B,
}

/// UID and SAK of the selected PICC.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Uid {
    bytes: [u8; MAX_UID_LEN],
    len: u8,
    pub sak: u8,
}

impl Uid {
    /// Builds a UID from 4, 7 or 10 bytes. Longer input is truncated.
    pub fn new(uid: &[u8], sak: u8) -> Self {
        let len = uid.len().min(MAX_UID_LEN);
        let mut bytes = [0u8; MAX_UID_LEN];
        bytes[..len].copy_from_slice(&uid[..len]);
        Uid { bytes, len: len as u8, sak }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Bytes fed into MIFARE authentication: the last four of the UID.
    pub fn auth_bytes(&self) -> [u8; 4] {
        let mut out = [0u8; 4];
        let len = self.len as usize;
        if len >= 4 {
            out.copy_from_slice(&self.bytes[len - 4..len]);
        }
        out
    }

    pub fn card_type(&self) -> CardType {
        CardType::from_sak(self.sak)
    }
}

pub trait Transceiver {
    /// True when a PICC in IDLE state answers REQA.
    fn is_new_card_present(&mut self) -> bool;

    /// Runs anticollision and select on every cascade level.
    fn read_card_serial(&mut self) -> Result<Uid, RFIDError>;

    fn authenticate(
        &mut self,
        key_type: KeyType,
        block: u8,
        key: &MifareKey,
        uid: &Uid,
    ) -> Result<(), RFIDError>;

    fn read_block(&mut self, block: u8) -> Result<Block, RFIDError>;

    fn write_block(&mut self, block: u8, data: &Block) -> Result<(), RFIDError>;

    /// Puts the PICC into HALT so it ignores REQA until it leaves the field.
    fn halt_card(&mut self) -> Result<(), RFIDError>;

    /// Leaves the authenticated state on the reader side.
    fn stop_crypto(&mut self);
}
