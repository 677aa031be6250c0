use ufmt::uWrite;

use crate::console::write_hex;
use crate::decision::count_matches;
use crate::errors::{CycleError, RFIDError};
use crate::transceiver::{Block, KeyType, MifareKey, Transceiver, Uid, BLOCK_SIZE};

/// Outcome of writing the reference pattern back to a tag.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ProvisionReport {
    pub write: Result<(), RFIDError>,
    pub read_back: Result<Block, RFIDError>,
    /// Bytes of the read-back block equal to what was written, 0 to 16.
    pub matched: u8,
}

impl ProvisionReport {
    pub fn verified(&self) -> bool {
        self.matched as usize == BLOCK_SIZE
    }

    /// The write error if there was one, otherwise a mismatch when fewer
    /// than 16 bytes read back equal.
    pub fn check(&self) -> Result<(), CycleError> {
        self.write.map_err(CycleError::WriteFailure)?;
        if !self.verified() {
            return Err(CycleError::VerifyMismatch { matched: self.matched });
        }
        Ok(())
    }
}

/// Sectors on a MIFARE Classic 4K, the largest Classic layout.
pub const MAX_SECTORS: u8 = 40;

/// First block and block count of a MIFARE Classic sector.
///
/// Sectors 0..32 hold 4 blocks; the 4K layout adds 8 sectors of 16 blocks.
pub fn sector_blocks(sector: u8) -> (u8, u8) {
    if sector < 32 {
        (sector * 4, 4)
    } else {
        (128 + (sector - 32) * 16, 16)
    }
}

/// A selected PICC. Dropping the session without
/// [`end_session`](CardSession::end_session) leaves the card active, so the
/// gate ends every session it opens exactly once.
pub struct CardSession<'r, T: Transceiver> {
    reader: &'r mut T,
    uid: Uid,
}

impl<'r, T: Transceiver> CardSession<'r, T> {
    /// Polls for a new card and selects it. An empty field and an
    /// unreadable UID both count as no card.
    pub fn open(reader: &'r mut T) -> Result<Self, CycleError> {
        if !reader.is_new_card_present() {
            return Err(CycleError::NoCardPresent);
        }
        let uid = reader
            .read_card_serial()
            .map_err(|_| CycleError::NoCardPresent)?;
        Ok(CardSession { reader, uid })
    }

    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    pub fn authenticate(
        &mut self,
        key_type: KeyType,
        trailer_block: u8,
        key: &MifareKey,
    ) -> Result<(), CycleError> {
        self.reader
            .authenticate(key_type, trailer_block, key, &self.uid)
            .map_err(CycleError::AuthenticationFailure)
    }

    pub fn read_block(&mut self, block: u8) -> Result<Block, CycleError> {
        self.reader.read_block(block).map_err(CycleError::ReadFailure)
    }

    /// Writes `pattern`, reads the block again and counts matching bytes.
    /// The re-read runs even when the write failed.
    pub fn provision(&mut self, block: u8, pattern: &Block) -> ProvisionReport {
        let write = self.reader.write_block(block, pattern);
        let read_back = self.reader.read_block(block);
        let matched = count_matches(read_back.as_ref().unwrap_or(&[0u8; BLOCK_SIZE]), pattern);
        ProvisionReport { write, read_back, matched }
    }

    /// Authenticates the sector trailer with key A and writes every block of
    /// `sector` to `out`, one line per block.
    pub fn dump_sector<W: uWrite + ?Sized>(&mut self, sector: u8, key: &MifareKey, out: &mut W) {
        if sector >= MAX_SECTORS {
            ufmt::uwriteln!(out, "Sector {} does not exist", sector).ok();
            return;
        }
        let (first, count) = sector_blocks(sector);
        let trailer = first + count - 1;

        if let Err(e) = self.reader.authenticate(KeyType::A, trailer, key, &self.uid) {
            ufmt::uwriteln!(out, "Sector {}: authentication failed: {}", sector, e.name()).ok();
            return;
        }

        for block in first..=trailer {
            ufmt::uwrite!(out, "  {} {}: ", sector, block).ok();
            match self.reader.read_block(block) {
                Ok(data) => write_hex(out, &data),
                Err(e) => {
                    out.write_str(e.name()).ok();
                }
            }
            ufmt::uwriteln!(out, "").ok();
        }
    }

    /// HLTA followed by Crypto1 stop.
    pub fn end_session(self) {
        // A PICC that already left the field cannot be halted; nothing to do then
        self.reader.halt_card().ok();
        self.reader.stop_crypto();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sector_layout_covers_1k_and_4k() {
        assert_eq!(sector_blocks(0), (0, 4));
        assert_eq!(sector_blocks(2), (8, 4));
        assert_eq!(sector_blocks(31), (124, 4));
        assert_eq!(sector_blocks(32), (128, 16));
        assert_eq!(sector_blocks(39), (240, 16));
    }

    #[test]
    fn report_check_orders_write_failure_first() {
        let report = ProvisionReport {
            write: Err(RFIDError::MifareNack),
            read_back: Ok([0; 16]),
            matched: 0,
        };
        assert_eq!(report.check(), Err(CycleError::WriteFailure(RFIDError::MifareNack)));

        let report = ProvisionReport { write: Ok(()), read_back: Ok([0; 16]), matched: 15 };
        assert_eq!(report.check(), Err(CycleError::VerifyMismatch { matched: 15 }));
        assert!(!report.verified());
    }
}
