use proptest::prelude::*;
use rfid_gate::config::VALID_BLOCK;
use rfid_gate::decision::{count_matches, decide, COMPARED_OFFSETS};

proptest! {
    #[test]
    fn decision_matches_the_four_offset_rule(
        buffer in prop::array::uniform16(any::<u8>()),
        reference in prop::array::uniform16(any::<u8>()),
    ) {
        let expected = buffer[0] == reference[0]
            && buffer[5] == reference[5]
            && buffer[6] == reference[6]
            && buffer[11] == reference[11];
        prop_assert_eq!(decide(&buffer, &reference), expected);
    }

    #[test]
    fn uncompared_bytes_never_matter(
        reference in prop::array::uniform16(any::<u8>()),
        noise in prop::array::uniform16(any::<u8>()),
    ) {
        let mut buffer = noise;
        for &i in COMPARED_OFFSETS.iter() {
            buffer[i] = reference[i];
        }
        prop_assert!(decide(&buffer, &reference));
    }

    #[test]
    fn match_count_is_bounded(
        a in prop::array::uniform16(any::<u8>()),
        b in prop::array::uniform16(any::<u8>()),
    ) {
        let n = count_matches(&a, &b);
        prop_assert!(n <= 16);
        prop_assert_eq!(n == 16, a == b);
    }
}

#[test]
fn reference_scenario_one_is_accepted() {
    let buffer = [
        0x01, 0x00, 0x00, 0x00, 0x00, 0x06, 0x07, 0x00,
        0x00, 0x00, 0x00, 0x0b, 0x00, 0x00, 0x00, 0x00,
    ];
    assert!(decide(&buffer, &VALID_BLOCK));
}
