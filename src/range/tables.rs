//! Lookup tables shared by every range-algorithm kernel.
//!
//! Legal UTF-8 byte sequences (Unicode Table 3-7):
//!
//! | Code points        | 1st    | 2nd    | 3rd    | 4th    |
//! |--------------------|--------|--------|--------|--------|
//! | U+0000..U+007F     | 00..7F |        |        |        |
//! | U+0080..U+07FF     | C2..DF | 80..BF |        |        |
//! | U+0800..U+0FFF     | E0     | A0..BF | 80..BF |        |
//! | U+1000..U+CFFF     | E1..EC | 80..BF | 80..BF |        |
//! | U+D000..U+D7FF     | ED     | 80..9F | 80..BF |        |
//! | U+E000..U+FFFF     | EE..EF | 80..BF | 80..BF |        |
//! | U+10000..U+3FFFF   | F0     | 90..BF | 80..BF | 80..BF |
//! | U+40000..U+FFFFF   | F1..F3 | 80..BF | 80..BF | 80..BF |
//! | U+100000..U+10FFFF | F4     | 80..8F | 80..BF | 80..BF |
//!
//! Every byte is assigned a *range index*. The index selects a `[min, max]`
//! pair from [`RANGE_MIN`] / [`RANGE_MAX`], and the byte is legal iff it lies
//! inside that pair.

/// High nibble of a first byte to sequence length minus one.
///
/// - `0x0..=0xB` → 0 (ASCII, or a continuation byte that starts nothing)
/// - `0xC..=0xD` → 1
/// - `0xE` → 2
/// - `0xF` → 3
pub(crate) static FIRST_LEN: [u8; 16] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 2, 3];

/// High nibble of a first byte to its own range index: 8 for `0xC0..=0xFF`.
pub(crate) static FIRST_RANGE: [u8; 16] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 8, 8, 8, 8];

/// Minimum legal value per range index.
///
/// | Index | Bytes  | Meaning                          |
/// |-------|--------|----------------------------------|
/// | 0     | 00..7F | ASCII first byte                 |
/// | 1,2,3 | 80..BF | 2nd, 3rd or 4th byte             |
/// | 4     | A0..BF | 2nd byte after E0                |
/// | 5     | 80..9F | 2nd byte after ED                |
/// | 6     | 90..BF | 2nd byte after F0                |
/// | 7     | 80..8F | 2nd byte after F4                |
/// | 8     | C2..F4 | non-ASCII first byte             |
/// | 9..15 | -      | overlapping sequences, never legal |
#[rustfmt::skip]
pub(crate) static RANGE_MIN: [u8; 16] = [
    0x00, 0x80, 0x80, 0x80, 0xA0, 0x80, 0x90, 0x80,
    0xC2, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
];

/// Maximum legal value per range index. See [`RANGE_MIN`].
#[rustfmt::skip]
pub(crate) static RANGE_MAX: [u8; 16] = [
    0x7F, 0xBF, 0xBF, 0xBF, 0xBF, 0x9F, 0xBF, 0x8F,
    0xF4, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Range index adjustment for the byte following E0, ED, F0 or F4.
///
/// Indexed by `previous_byte.wrapping_sub(0xE0)`; indices outside `0..32`
/// adjust by zero.
///
/// | First byte | Range before | Adjustment | Range after |
/// |------------|--------------|------------|-------------|
/// | E0         | 2            | +2         | 4           |
/// | ED         | 2            | +3         | 5           |
/// | F0         | 3            | +3         | 6           |
/// | F4         | 3            | +4         | 7           |
///
/// If the following byte is itself a first byte its range is already 8 or
/// more, and the adjustment pushes it into the illegal 9..15 band.
pub(crate) static RANGE_ADJUST: [u8; 32] = {
    let mut table = [0u8; 32];
    table[(0xE0 - 0xE0) as usize] = 2;
    table[(0xED - 0xE0) as usize] = 3;
    table[(0xF0 - 0xE0) as usize] = 3;
    table[(0xF4 - 0xE0) as usize] = 4;
    table
};

/// Sequence width by lead byte for the scalar validator; 0 means the byte can
/// never start a sequence (continuation bytes, C0, C1, F5..FF).
pub(crate) static UTF8_WIDTH: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut byte = 0usize;
    while byte < 256 {
        table[byte] = match byte {
            0x00..=0x7F => 1,
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => 0,
        };
        byte += 1;
    }
    table
};

/// Check if a byte is a UTF-8 continuation byte (0x80-0xBF).
#[inline(always)]
pub(crate) const fn is_continuation_byte(byte: u8) -> bool {
    (byte & 0xC0) == 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Range index the algorithm assigns to the second byte of a sequence
    /// started by `lead`.
    fn second_byte_range(lead: u8) -> usize {
        let first_len = FIRST_LEN[(lead >> 4) as usize];
        let adjust = RANGE_ADJUST
            .get(lead.wrapping_sub(0xE0) as usize)
            .copied()
            .unwrap_or(0);
        (first_len + adjust) as usize
    }

    #[test]
    fn second_byte_bounds_follow_table_3_7() {
        let cases: &[(u8, u8, u8)] = &[
            (0xC2, 0x80, 0xBF),
            (0xDF, 0x80, 0xBF),
            (0xE0, 0xA0, 0xBF),
            (0xE1, 0x80, 0xBF),
            (0xEC, 0x80, 0xBF),
            (0xED, 0x80, 0x9F),
            (0xEE, 0x80, 0xBF),
            (0xF0, 0x90, 0xBF),
            (0xF3, 0x80, 0xBF),
            (0xF4, 0x80, 0x8F),
        ];
        for &(lead, min, max) in cases {
            let r = second_byte_range(lead);
            assert_eq!(RANGE_MIN[r], min, "min after 0x{:02X}", lead);
            assert_eq!(RANGE_MAX[r], max, "max after 0x{:02X}", lead);
        }
    }

    #[test]
    fn illegal_ranges_reject_every_byte() {
        for r in 9..16 {
            for byte in 0..=255u8 {
                assert!(byte < RANGE_MIN[r] || byte > RANGE_MAX[r]);
            }
        }
    }

    #[test]
    fn first_byte_range_excludes_c0_c1_and_f5_up() {
        let r = FIRST_RANGE[0xC] as usize;
        assert_eq!((RANGE_MIN[r], RANGE_MAX[r]), (0xC2, 0xF4));
    }

    #[test]
    fn width_table_matches_first_byte_bounds() {
        for byte in 0..=255u8 {
            let legal_first = byte <= 0x7F || (0xC2..=0xF4).contains(&byte);
            assert_eq!(UTF8_WIDTH[byte as usize] != 0, legal_first, "0x{:02X}", byte);
        }
    }

    #[test]
    fn continuation_bytes() {
        for byte in 0..=255u8 {
            assert_eq!(is_continuation_byte(byte), (0x80..=0xBF).contains(&byte));
        }
    }
}
