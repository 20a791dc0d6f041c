//! UTF-8 validation using the range algorithm.
//!
//! Each byte is classified into a *range index* from its high nibble and from
//! the nibbles of up to three preceding bytes. The index selects a legal
//! `[min, max]` pair, and the block is valid iff every byte is inside its
//! pair. See [`tables`](self) for the exact tables.
//!
//! ## Kernels
//!
//! | Kernel                 | Width | Availability                         |
//! |------------------------|-------|--------------------------------------|
//! | [`Kernel::Naive`]      | 1     | everywhere                           |
//! | [`Kernel::Portable`]   | 16    | everywhere                           |
//! | [`Kernel::Sse41`]      | 16    | x86_64 with SSE4.1                   |
//! | [`Kernel::Avx2`]       | 32    | x86_64 with AVX2                     |
//! | [`Kernel::Neon`]       | 16    | aarch64                              |
//!
//! Vector kernels process whole blocks, then apply the *lookahead fixup*:
//! the cursor is rewound to the start of any sequence that the last block
//! might have cut short, and the [`naive`] validator finishes the remainder.
//!
//! ```
//! use utf8range::range::{self, Kernel};
//!
//! assert!(range::is_valid("Grüße, 世界! 🎉".as_bytes()));
//! assert!(!range::is_valid(&[0xF4, 0x90, 0x80, 0x80]));
//!
//! // Every machine has the naive kernel
//! assert_eq!(range::is_valid_with(Kernel::Naive, b"abc"), Ok(true));
//! ```

mod dispatch;
pub mod naive;
pub mod portable;
pub(crate) mod tables;

#[cfg(target_arch = "x86_64")]
pub mod x86;

#[cfg(target_arch = "aarch64")]
pub mod neon;

pub use dispatch::{
    is_valid, is_valid_with, selected_kernel, Kernel, ParseKernelError, UnsupportedKernel,
    ALL_KERNELS,
};

use tables::is_continuation_byte;

/// Number of bytes to rewind from the end of the vector region so that the
/// scalar tail starts on a sequence boundary.
///
/// Looks at the last three bytes of `processed`: rewinds to the last
/// non-continuation byte among them, or not at all if all three are
/// continuation bytes (a four-byte sequence ending exactly at the boundary,
/// or an error the vector kernel has already reported).
#[inline]
pub(crate) fn lookahead(processed: &[u8]) -> usize {
    let len = processed.len();
    for back in 1..=3 {
        if back > len {
            break;
        }
        if !is_continuation_byte(processed[len - back]) {
            return back;
        }
    }
    0
}

/// Finish validation after the vector kernel covered `data[..processed]`
/// without error.
#[inline]
pub(crate) fn finish(data: &[u8], processed: usize) -> bool {
    let start = processed - lookahead(&data[..processed]);
    naive::is_valid(&data[start..])
}
