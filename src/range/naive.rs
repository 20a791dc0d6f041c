//! Naive byte-by-byte UTF-8 validation.
//!
//! This is the reference every vector kernel must agree with, and the tail
//! fallback they all share once fewer than one vector of input remains.

use super::tables::{is_continuation_byte, UTF8_WIDTH};

// use truncation to fit u64 into usize
const NONASCII_MASK: usize = 0x8080_8080_8080_8080u64 as usize;
const WORD_BYTES: usize = core::mem::size_of::<usize>();

/// Returns `true` if `data` is well-formed UTF-8.
///
/// # Examples
///
/// ```
/// use utf8range::range::naive;
///
/// assert!(naive::is_valid("héllo 🎉".as_bytes()));
/// assert!(!naive::is_valid(&[0xED, 0xA0, 0x80])); // U+D800
/// ```
#[inline]
pub fn is_valid(data: &[u8]) -> bool {
    valid_up_to(data) == data.len()
}

/// Length of the longest prefix of `data` made of complete, well-formed
/// sequences.
///
/// The byte at the returned offset (if any) starts the first ill-formed or
/// truncated sequence.
pub fn valid_up_to(data: &[u8]) -> usize {
    let len = data.len();
    let mut pos = 0;

    while pos < len {
        let lead = data[pos];

        if lead < 0x80 {
            pos += 1;
            // Skip ASCII a word at a time
            while pos + WORD_BYTES <= len {
                let mut word = [0u8; WORD_BYTES];
                word.copy_from_slice(&data[pos..pos + WORD_BYTES]);
                if usize::from_ne_bytes(word) & NONASCII_MASK != 0 {
                    break;
                }
                pos += WORD_BYTES;
            }
            continue;
        }

        let width = UTF8_WIDTH[lead as usize] as usize;
        if width == 0 || pos + width > len {
            return pos;
        }

        let second = data[pos + 1];
        let second_ok = match lead {
            0xE0 => (0xA0..=0xBF).contains(&second),
            0xED => (0x80..=0x9F).contains(&second),
            0xF0 => (0x90..=0xBF).contains(&second),
            0xF4 => (0x80..=0x8F).contains(&second),
            _ => is_continuation_byte(second),
        };
        if !second_ok {
            return pos;
        }

        for &byte in &data[pos + 2..pos + width] {
            if !is_continuation_byte(byte) {
                return pos;
            }
        }

        pos += width;
    }

    pos
}
