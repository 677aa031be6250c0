//! Access decision for a scanned block.
//!
//! Only four byte positions take part in the comparison. A tag with the right
//! bytes at those offsets is accepted whatever the rest of the block holds.

use crate::transceiver::Block;

/// Byte offsets that must equal the reference for the gate to open.
pub const COMPARED_OFFSETS: [usize; 4] = [0, 5, 6, 11];

pub fn decide(buffer: &Block, reference: &Block) -> bool {
    COMPARED_OFFSETS.iter().all(|&i| buffer[i] == reference[i])
}

/// Number of positions where `read_back` equals `written`, 0 to 16.
pub fn count_matches(read_back: &Block, written: &Block) -> u8 {
    read_back
        .iter()
        .zip(written.iter())
        .filter(|(a, b)| a == b)
        .count() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VALID_BLOCK;

    #[test]
    fn sparse_match_ignores_other_positions() {
        let mut buffer = [0u8; 16];
        buffer[0] = 0x01;
        buffer[5] = 0x06;
        buffer[6] = 0x07;
        buffer[11] = 0x0b;
        assert!(decide(&buffer, &VALID_BLOCK));
    }

    #[test]
    fn single_mismatch_rejects() {
        let mut buffer = VALID_BLOCK;
        buffer[6] = 0x00;
        assert!(!decide(&buffer, &VALID_BLOCK));
    }

    #[test]
    fn zeroed_buffer_rejects() {
        assert!(!decide(&[0u8; 16], &VALID_BLOCK));
    }

    #[test]
    fn count_matches_counts_equal_bytes() {
        assert_eq!(count_matches(&VALID_BLOCK, &VALID_BLOCK), 16);
        let mut partial = VALID_BLOCK;
        partial[3] = 0xEE;
        partial[15] = 0x00;
        assert_eq!(count_matches(&partial, &VALID_BLOCK), 14);
    }
}
