use core::fmt::{Debug, Formatter, Result};
use ufmt::{uDebug, uWrite};

/// PICC family, derived from the SAK byte returned by the final select.
#[derive(PartialEq, Eq, Clone, Copy)]
pub enum CardType {
    NotComplete,
    MifareMini,
    Mifare1K,
    Mifare4K,
    MifareUltralight,
    MifarePlus,
    Tnp3xxx,
    Iso14443_4,
    Iso18092,
    Unknown,
}

impl CardType {
    pub fn from_sak(sak: u8) -> Self {
        // Bit 7 of SAK is RFU
        match sak & 0x7F {
            0x04 => CardType::NotComplete,
            0x09 => CardType::MifareMini,
            0x08 => CardType::Mifare1K,
            0x18 => CardType::Mifare4K,
            0x00 => CardType::MifareUltralight,
            0x10 | 0x11 => CardType::MifarePlus,
            0x01 => CardType::Tnp3xxx,
            0x20 => CardType::Iso14443_4,
            0x40 => CardType::Iso18092,
            _ => CardType::Unknown,
        }
    }

    /// Only MIFARE Classic cards carry the sector/trailer layout the gate reads.
    pub fn is_mifare_classic(&self) -> bool {
        matches!(self, CardType::MifareMini | CardType::Mifare1K | CardType::Mifare4K)
    }

    pub fn name(&self) -> &'static str {
        match self {
            CardType::NotComplete => "SAK indicates UID is not complete.",
            CardType::MifareMini => "MIFARE Mini, 320 bytes",
            CardType::Mifare1K => "MIFARE 1KB",
            CardType::Mifare4K => "MIFARE 4KB",
            CardType::MifareUltralight => "MIFARE Ultralight or Ultralight C",
            CardType::MifarePlus => "MIFARE Plus",
            CardType::Tnp3xxx => "MIFARE TNP3XXX",
            CardType::Iso14443_4 => "PICC compliant with ISO/IEC 14443-4",
            CardType::Iso18092 => "PICC compliant with ISO/IEC 18092 (NFC)",
            CardType::Unknown => "Unknown type",
        }
    }
}

impl Debug for CardType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.name())
    }
}

impl uDebug for CardType {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        f.write_str(self.name())
    }
}
