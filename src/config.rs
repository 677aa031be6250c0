//! Compile-time defaults and the per-device configuration built from them.

use crate::transceiver::{Block, MifareKey};

pub const SERIAL_BAUD: u32 = 115_200;

/// Interval between polls while no card is in the field.
pub const WAKE_INTERVAL_US: u32 = 3_000_000;

// Relay sequencing
pub const RELAY_SETTLE_MS: u32 = 1;
pub const RELAY_SUPPLY_MS: u32 = 5;
pub const RELAY_PULSE_MS: u32 = 100;
pub const INDICATOR_PULSE_MS: u32 = 50;

pub const VALID_BLOCK: Block = [
    0x01, 0x02, 0x03, 0x04,
    0x05, 0x06, 0x07, 0x08,
    0x09, 0x0a, 0xff, 0x0b,
    0x0c, 0x0d, 0x0e, 0xcd,
];

/// Sector, data block and sector trailer the gate reads.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TargetLocation {
    pub sector: u8,
    pub data_block: u8,
    pub trailer_block: u8,
}

impl TargetLocation {
    /// Location of `data_block` on a MIFARE Classic 1K, with the trailer of
    /// its own sector.
    pub const fn classic_1k(data_block: u8) -> Self {
        let sector = data_block / 4;
        TargetLocation {
            sector,
            data_block,
            trailer_block: sector * 4 + 3,
        }
    }

    /// The data block sits inside the sector its trailer protects and is not
    /// the trailer itself.
    pub fn is_consistent(&self) -> bool {
        self.data_block / 4 == self.sector
            && self.trailer_block == self.sector * 4 + 3
            && self.data_block != self.trailer_block
    }
}

pub const TARGET: TargetLocation = TargetLocation::classic_1k(9);

#[derive(Clone, Debug)]
pub struct GateConfig {
    /// Used as key A; key B holds the same value.
    pub key: MifareKey,
    pub target: TargetLocation,
    pub reference: Block,
    /// Write `reference` back to the tag after every decision.
    pub write_enable: bool,
    /// Serial diagnostics only. Never changes what the gate does.
    pub debug: bool,
    pub relay_idle_high: bool,
    pub wake_interval_us: u32,
    pub relay_settle_ms: u32,
    pub relay_supply_ms: u32,
    pub relay_pulse_ms: u32,
    pub indicator_pulse_ms: u32,
}

impl Default for GateConfig {
    fn default() -> Self {
        GateConfig {
            key: MifareKey::FACTORY,
            target: TARGET,
            reference: VALID_BLOCK,
            write_enable: false,
            debug: true,
            relay_idle_high: false,
            wake_interval_us: WAKE_INTERVAL_US,
            relay_settle_ms: RELAY_SETTLE_MS,
            relay_supply_ms: RELAY_SUPPLY_MS,
            relay_pulse_ms: RELAY_PULSE_MS,
            indicator_pulse_ms: INDICATOR_PULSE_MS,
        }
    }
}

impl GateConfig {
    pub fn with_key(mut self, key: MifareKey) -> Self {
        self.key = key;
        self
    }

    pub fn with_target(mut self, target: TargetLocation) -> Self {
        self.target = target;
        self
    }

    pub fn with_reference(mut self, reference: Block) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_write_enable(mut self, write_enable: bool) -> Self {
        self.write_enable = write_enable;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_relay_idle_high(mut self, idle_high: bool) -> Self {
        self.relay_idle_high = idle_high;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_target_reads_block_nine_of_sector_two() {
        assert_eq!(TARGET.sector, 2);
        assert_eq!(TARGET.data_block, 9);
        assert_eq!(TARGET.trailer_block, 11);
        assert!(TARGET.is_consistent());
    }

    #[test]
    fn trailer_from_another_sector_is_inconsistent() {
        let target = TargetLocation { sector: 2, data_block: 9, trailer_block: 7 };
        assert!(!target.is_consistent());
        assert!(!TargetLocation::classic_1k(11).is_consistent());
    }

    #[test]
    fn defaults_use_factory_key_and_3s_wake() {
        let config = GateConfig::default();
        assert_eq!(config.key.as_bytes(), &[0xFF; 6]);
        assert_eq!(config.wake_interval_us, 3_000_000);
        assert!(!config.write_enable);
        assert_eq!(config.reference[15], 0xcd);
    }
}
