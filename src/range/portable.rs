//! Portable rendition of the range algorithm.
//!
//! Processes 16-byte blocks exactly like the SSE4.1 and NEON kernels, one
//! lane at a time over plain arrays. It compiles on every target, which makes
//! it the reference for checking the vector kernels' table logic.

use super::tables::{FIRST_LEN, FIRST_RANGE, RANGE_ADJUST, RANGE_MAX, RANGE_MIN};

/// Block width in bytes.
pub const WIDTH: usize = 16;

type Block = [u8; WIDTH];

/// Returns `true` if `data` is well-formed UTF-8.
pub fn is_valid(data: &[u8]) -> bool {
    match validate_blocks(data) {
        Some(processed) => super::finish(data, processed),
        None => false,
    }
}

/// Validate all whole blocks of `data`.
///
/// Returns the number of bytes covered, or `None` if an error was found in
/// them.
fn validate_blocks(data: &[u8]) -> Option<usize> {
    let mut prev_input: Block = [0; WIDTH];
    let mut prev_first_len: Block = [0; WIDTH];
    let mut error = 0u8;

    let mut chunks = data.chunks_exact(WIDTH);
    for chunk in &mut chunks {
        let mut input: Block = [0; WIDTH];
        input.copy_from_slice(chunk);

        let mut first_len: Block = [0; WIDTH];
        let mut range: Block = [0; WIDTH];
        for i in 0..WIDTH {
            let high = (input[i] >> 4) as usize;
            first_len[i] = FIRST_LEN[high];
            range[i] = FIRST_RANGE[high];
        }

        for i in 0..WIDTH {
            range[i] |= shift(&first_len, &prev_first_len, i, 1);
            range[i] |= shift(&first_len, &prev_first_len, i, 2).saturating_sub(1);
            range[i] |= shift(&first_len, &prev_first_len, i, 3).saturating_sub(2);

            let prev_byte = shift(&input, &prev_input, i, 1);
            range[i] += lookup(&RANGE_ADJUST, prev_byte.wrapping_sub(0xE0));

            let min = lookup(&RANGE_MIN, range[i]);
            let max = lookup(&RANGE_MAX, range[i]);
            error |= (input[i] < min) as u8 | (input[i] > max) as u8;
        }

        prev_input = input;
        prev_first_len = first_len;
    }

    if error != 0 {
        None
    } else {
        Some(data.len() - chunks.remainder().len())
    }
}

/// Lane `i` of the concatenation `prev ++ cur` shifted right by `n` lanes.
#[inline(always)]
fn shift(cur: &Block, prev: &Block, i: usize, n: usize) -> u8 {
    if i >= n {
        cur[i - n]
    } else {
        prev[WIDTH + i - n]
    }
}

/// Table lookup with `tbl` semantics: out-of-range indices yield 0.
#[inline(always)]
fn lookup(table: &[u8], index: u8) -> u8 {
    table.get(index as usize).copied().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_uses_naive() {
        assert!(is_valid("日本".as_bytes()));
        assert!(!is_valid(&[0xC0, 0x80]));
    }

    #[test]
    fn single_block() {
        assert!(is_valid(b"0123456789abcdef"));
        assert!(is_valid("0123456789abc日".as_bytes()));
        let mut bad = *b"0123456789abcdef";
        bad[7] = 0xFF;
        assert!(!is_valid(&bad));
    }

    #[test]
    fn sequence_split_across_blocks() {
        for offset in 10..20 {
            let mut input = vec![b'x'; offset];
            input.extend_from_slice("🎉".as_bytes());
            input.extend_from_slice(&[b'y'; 20]);
            assert!(is_valid(&input), "emoji at {}", offset);
        }
    }

    #[test]
    fn truncated_sequence_at_block_end() {
        let mut input = vec![b'x'; 15];
        input.push(0xE2);
        assert!(!is_valid(&input));
        input.push(0x82);
        assert!(!is_valid(&input));
        input.push(0xAC); // U+20AC completes
        assert!(is_valid(&input));
    }

    #[test]
    fn overlapping_sequences_rejected() {
        // F1 80 C2 90: a new lead inside a 4-byte sequence
        let mut input = vec![b'x'; 14];
        input.extend_from_slice(&[0xF1, 0x80, 0xC2, 0x90]);
        input.extend_from_slice(&[b'x'; 16]);
        assert!(!is_valid(&input));
    }

    #[test]
    fn surrogates_and_overlongs_in_blocks() {
        for bad in [
            &[0xED, 0xA0, 0x80][..],
            &[0xE0, 0x9F, 0xBF],
            &[0xF0, 0x8F, 0xBF, 0xBF],
            &[0xF4, 0x90, 0x80, 0x80],
            &[0xC1, 0xBF],
        ] {
            for offset in 0..WIDTH {
                let mut input = vec![b'a'; offset];
                input.extend_from_slice(bad);
                input.extend_from_slice(&[b'b'; 2 * WIDTH]);
                assert!(!is_valid(&input), "{:02X?} at {}", bad, offset);
            }
        }
    }
}
