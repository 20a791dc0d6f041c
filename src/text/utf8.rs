//! UTF-8 validation with detailed error reporting.
//!
//! [`validate_utf8`] runs the dispatched range kernel first. Only when that
//! fails does it pay for a byte-by-byte diagnosis, which reports:
//! - The exact byte offset of the error
//! - The line number (1-indexed)
//! - The column number (1-indexed, in bytes)
//! - The specific type of UTF-8 violation
//!
//! ## UTF-8 Encoding Rules
//!
//! | Bytes | First byte    | Continuation bytes | Code point range     |
//! |-------|---------------|--------------------|----------------------|
//! | 1     | `0xxxxxxx`    | -                  | U+0000 - U+007F      |
//! | 2     | `110xxxxx`    | `10xxxxxx`         | U+0080 - U+07FF      |
//! | 3     | `1110xxxx`    | `10xxxxxx` × 2     | U+0800 - U+FFFF      |
//! | 4     | `11110xxx`    | `10xxxxxx` × 3     | U+10000 - U+10FFFF   |
//!
//! ## Validation Checks
//!
//! 1. **Invalid lead bytes**: 0x80-0xBF or 0xF8-0xFF where a lead byte is expected
//! 2. **Invalid continuation bytes**: Non-continuation bytes where continuation expected
//! 3. **Overlong encodings**: Using more bytes than necessary
//! 4. **Surrogate code points**: U+D800-U+DFFF (reserved for UTF-16)
//! 5. **Out of range**: Code points above U+10FFFF
//! 6. **Truncated sequences**: Multi-byte sequence cut off at end of input

use crate::range::tables::is_continuation_byte;
use crate::range::{self, naive};

/// Error information for UTF-8 validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utf8Error {
    /// The byte offset where the error occurred (0-indexed).
    pub offset: usize,
    /// The line number where the error occurred (1-indexed).
    pub line: usize,
    /// The column (byte position within the line, 1-indexed).
    pub column: usize,
    /// The kind of UTF-8 error.
    pub kind: Utf8ErrorKind,
}

impl core::fmt::Display for Utf8Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} at byte {}, line {}, column {}",
            self.kind, self.offset, self.line, self.column
        )
    }
}

#[cfg(any(test, feature = "std"))]
impl std::error::Error for Utf8Error {}

/// The specific type of UTF-8 validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8ErrorKind {
    /// A byte in 0x80-0xBF or 0xF8-0xFF appeared where a lead byte was expected.
    InvalidLeadByte,

    /// A byte outside 0x80-0xBF appeared where a continuation byte was expected.
    InvalidContinuationByte,

    /// A character was encoded using more bytes than necessary,
    /// e.g. `C0 81` for U+0041.
    OverlongEncoding,

    /// A surrogate code point (U+D800-U+DFFF) was encoded.
    SurrogateCodepoint,

    /// A code point above U+10FFFF was encoded.
    OutOfRangeCodepoint,

    /// A multi-byte sequence was truncated at the end of input.
    TruncatedSequence,
}

impl core::fmt::Display for Utf8ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidLeadByte => write!(f, "invalid UTF-8 lead byte"),
            Self::InvalidContinuationByte => write!(f, "invalid UTF-8 continuation byte"),
            Self::OverlongEncoding => write!(f, "overlong UTF-8 encoding"),
            Self::SurrogateCodepoint => write!(f, "surrogate code point in UTF-8"),
            Self::OutOfRangeCodepoint => write!(f, "code point above U+10FFFF"),
            Self::TruncatedSequence => write!(f, "truncated UTF-8 sequence"),
        }
    }
}

/// Validate that the input is valid UTF-8.
///
/// Returns `Ok(())` if the input is valid UTF-8, or an `Err(Utf8Error)` with
/// detailed information about the first validation error. The result is
/// always identical to [`validate_utf8_scalar`]; valid input never leaves
/// the vector kernel.
///
/// # Examples
///
/// ```
/// use utf8range::text::utf8::{validate_utf8, Utf8ErrorKind};
///
/// assert!(validate_utf8("émoji: 🎉".as_bytes()).is_ok());
///
/// let err = validate_utf8(b"line 1\nline \xED\xA0\x80").unwrap_err();
/// assert_eq!(err.kind, Utf8ErrorKind::SurrogateCodepoint);
/// assert_eq!((err.offset, err.line, err.column), (12, 2, 6));
/// ```
#[inline]
pub fn validate_utf8(input: &[u8]) -> Result<(), Utf8Error> {
    if range::is_valid(input) {
        return Ok(());
    }
    diagnose(input)
}

/// Locate and classify the first error in `input`.
///
/// Skips the well-formed prefix with the naive validator and only scans from
/// the first bad sequence onwards.
pub(crate) fn diagnose(input: &[u8]) -> Result<(), Utf8Error> {
    let start = naive::valid_up_to(input);
    let prefix = &input[..start];
    let cursor = Cursor {
        pos: start,
        line: 1 + prefix.iter().filter(|&&b| b == b'\n').count(),
        line_start: prefix
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |nl| nl + 1),
    };
    cursor.scan(input)
}

/// Validate UTF-8 using a scalar (byte-by-byte) algorithm.
///
/// This is a portable implementation that works on all platforms.
/// It provides detailed error information including the exact byte offset,
/// line number, and column position of any error.
pub fn validate_utf8_scalar(input: &[u8]) -> Result<(), Utf8Error> {
    Cursor {
        pos: 0,
        line: 1,
        line_start: 0,
    }
    .scan(input)
}

/// Scan position with line tracking.
struct Cursor {
    pos: usize,
    line: usize,
    line_start: usize,
}

impl Cursor {
    fn error(&self, at: usize, kind: Utf8ErrorKind) -> Utf8Error {
        Utf8Error {
            offset: at,
            line: self.line,
            column: at - self.line_start + 1,
            kind,
        }
    }

    fn scan(mut self, input: &[u8]) -> Result<(), Utf8Error> {
        let len = input.len();

        while self.pos < len {
            let pos = self.pos;
            let byte = input[pos];

            let seq_len = match byte {
                0x00..=0x7F => {
                    if byte == b'\n' {
                        self.line += 1;
                        self.line_start = pos + 1;
                    }
                    self.pos += 1;
                    continue;
                }
                0x80..=0xBF | 0xF8..=0xFF => {
                    return Err(self.error(pos, Utf8ErrorKind::InvalidLeadByte));
                }
                0xC0..=0xDF => 2,
                0xE0..=0xEF => 3,
                0xF0..=0xF7 => 4,
            };

            if pos + seq_len > len {
                return Err(self.error(pos, Utf8ErrorKind::TruncatedSequence));
            }

            // Continuation bytes are checked before the decoded value, so a
            // bad byte is reported at its own offset.
            for k in 1..seq_len {
                if !is_continuation_byte(input[pos + k]) {
                    return Err(self.error(pos + k, Utf8ErrorKind::InvalidContinuationByte));
                }
            }

            let cp = decode_unchecked(&input[pos..pos + seq_len]);
            let kind = match seq_len {
                2 if cp < 0x80 => Some(Utf8ErrorKind::OverlongEncoding),
                3 if cp < 0x800 => Some(Utf8ErrorKind::OverlongEncoding),
                3 if (0xD800..=0xDFFF).contains(&cp) => Some(Utf8ErrorKind::SurrogateCodepoint),
                4 if cp < 0x10000 => Some(Utf8ErrorKind::OverlongEncoding),
                4 if cp > 0x10FFFF => Some(Utf8ErrorKind::OutOfRangeCodepoint),
                _ => None,
            };
            if let Some(kind) = kind {
                return Err(self.error(pos, kind));
            }

            self.pos += seq_len;
        }

        Ok(())
    }
}

/// Decode a sequence whose structure (lead + continuation bytes) has already
/// been checked. Value ranges are not checked.
#[inline]
fn decode_unchecked(seq: &[u8]) -> u32 {
    let lead = seq[0] as u32;
    let cont = |i: usize| seq[i] as u32 & 0x3F;
    match seq.len() {
        1 => lead,
        2 => ((lead & 0x1F) << 6) | cont(1),
        3 => ((lead & 0x0F) << 12) | (cont(1) << 6) | cont(2),
        _ => ((lead & 0x07) << 18) | (cont(1) << 12) | (cont(2) << 6) | cont(3),
    }
}
