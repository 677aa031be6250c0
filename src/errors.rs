use core::fmt::{Debug, Formatter, Result};
use ufmt::{uDebug, uWrite};

use crate::card_types::CardType;

/// Status of a single exchange between the MFRC522 and a PICC.
#[derive(PartialEq, Eq, Clone, Copy)]
pub enum RFIDError {
    CommunicationError,
    Timeout,
    InvalidResponse,
    Error,
    CrcError,
    NoRoom,
    Collision,
    MifareNack,
    BufferOverflow,
}

impl RFIDError {
    pub fn name(&self) -> &'static str {
        match self {
            RFIDError::CommunicationError => "Communication error",
            RFIDError::Timeout => "Timeout in communication",
            RFIDError::InvalidResponse => "Invalid response",
            RFIDError::Error => "Error in communication",
            RFIDError::CrcError => "The CRC_A does not match",
            RFIDError::NoRoom => "A buffer is not big enough",
            RFIDError::Collision => "Collision detected",
            RFIDError::MifareNack => "A MIFARE PICC responded with NAK",
            RFIDError::BufferOverflow => "FIFO buffer overflow",
        }
    }
}

impl Debug for RFIDError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.name())
    }
}

impl uDebug for RFIDError {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        f.write_str(self.name())
    }
}

/// Reasons a scan cycle stopped short of, or deviated from, the happy path.
///
/// None of these are fatal: the gate logs them and keeps polling.
#[derive(PartialEq, Eq, Clone, Copy)]
pub enum CycleError {
    /// Idle condition, routes straight to sleep.
    NoCardPresent,
    AuthenticationFailure(RFIDError),
    /// The decision sees a zeroed buffer and rejects.
    ReadFailure(RFIDError),
    WriteFailure(RFIDError),
    VerifyMismatch { matched: u8 },
    /// Advisory only.
    IncompatibleCardType(CardType),
}

impl Debug for CycleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            CycleError::NoCardPresent => write!(f, "NoCardPresent"),
            CycleError::AuthenticationFailure(e) => write!(f, "AuthenticationFailure({:?})", e),
            CycleError::ReadFailure(e) => write!(f, "ReadFailure({:?})", e),
            CycleError::WriteFailure(e) => write!(f, "WriteFailure({:?})", e),
            CycleError::VerifyMismatch { matched } => write!(f, "VerifyMismatch({}/16)", matched),
            CycleError::IncompatibleCardType(t) => write!(f, "IncompatibleCardType({:?})", t),
        }
    }
}

impl uDebug for CycleError {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match self {
            CycleError::NoCardPresent => f.write_str("NoCardPresent"),
            CycleError::AuthenticationFailure(e) => ufmt::uwrite!(f, "AuthenticationFailure({:?})", e),
            CycleError::ReadFailure(e) => ufmt::uwrite!(f, "ReadFailure({:?})", e),
            CycleError::WriteFailure(e) => ufmt::uwrite!(f, "WriteFailure({:?})", e),
            CycleError::VerifyMismatch { matched } => ufmt::uwrite!(f, "VerifyMismatch({}/16)", *matched),
            CycleError::IncompatibleCardType(t) => ufmt::uwrite!(f, "IncompatibleCardType({:?})", t),
        }
    }
}
