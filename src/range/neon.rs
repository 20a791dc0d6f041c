//! ARM NEON range-algorithm kernel (16 bytes per block).
//!
//! NEON has native unsigned byte comparisons and a two-register table lookup,
//! so the 32-entry range adjustment is a single `tbl` and the bounds check
//! is a direct `cmhi`/`cmhs` pair.

use core::arch::aarch64::*;

use super::tables::{FIRST_LEN, FIRST_RANGE, RANGE_ADJUST, RANGE_MAX, RANGE_MIN};

/// NEON block width in bytes.
pub const WIDTH: usize = 16;

/// Validate `data` with the NEON kernel.
///
/// # Safety
///
/// CPU must support NEON. This always holds on aarch64 targets.
#[target_feature(enable = "neon")]
pub unsafe fn is_valid_neon(data: &[u8]) -> bool {
    unsafe {
        match validate_blocks(data) {
            Some(processed) => super::finish(data, processed),
            None => false,
        }
    }
}

/// Validate all whole 16-byte blocks. Returns the bytes covered, or `None`
/// on error.
#[target_feature(enable = "neon")]
unsafe fn validate_blocks(data: &[u8]) -> Option<usize> {
    unsafe {
        let first_len_tbl = vld1q_u8(FIRST_LEN.as_ptr());
        let first_range_tbl = vld1q_u8(FIRST_RANGE.as_ptr());
        let range_min_tbl = vld1q_u8(RANGE_MIN.as_ptr());
        let range_max_tbl = vld1q_u8(RANGE_MAX.as_ptr());
        let adjust_tbl = uint8x16x2_t(
            vld1q_u8(RANGE_ADJUST.as_ptr()),
            vld1q_u8(RANGE_ADJUST.as_ptr().add(16)),
        );

        let one = vdupq_n_u8(1);
        let two = vdupq_n_u8(2);
        let e0 = vdupq_n_u8(0xE0);

        let mut prev_input = vdupq_n_u8(0);
        let mut prev_first_len = vdupq_n_u8(0);
        let mut error = vdupq_n_u8(0);

        let blocks = data.len() / WIDTH;
        let ptr = data.as_ptr();

        for i in 0..blocks {
            let input = vld1q_u8(ptr.add(i * WIDTH));
            let high_nibbles = vshrq_n_u8::<4>(input);

            let first_len = vqtbl1q_u8(first_len_tbl, high_nibbles);
            let mut range = vqtbl1q_u8(first_range_tbl, high_nibbles);

            // Second byte: first_len of the byte before
            range = vorrq_u8(range, vextq_u8::<15>(prev_first_len, first_len));

            // Third byte: first_len - 1 of the byte two before
            let cur = vqsubq_u8(first_len, one);
            let prev = vqsubq_u8(prev_first_len, one);
            range = vorrq_u8(range, vextq_u8::<14>(prev, cur));

            // Fourth byte: first_len - 2 of the byte three before
            let cur = vqsubq_u8(first_len, two);
            let prev = vqsubq_u8(prev_first_len, two);
            range = vorrq_u8(range, vextq_u8::<13>(prev, cur));

            // Special second bytes after E0, ED, F0, F4; indices >= 32 read 0
            let shift1 = vextq_u8::<15>(prev_input, input);
            let adjust = vqtbl2q_u8(adjust_tbl, vsubq_u8(shift1, e0));
            range = vaddq_u8(range, adjust);

            let minv = vqtbl1q_u8(range_min_tbl, range);
            let maxv = vqtbl1q_u8(range_max_tbl, range);

            error = vorrq_u8(error, vcltq_u8(input, minv));
            error = vorrq_u8(error, vcgtq_u8(input, maxv));

            prev_input = input;
            prev_first_len = first_len;
        }

        if vmaxvq_u8(error) != 0 {
            None
        } else {
            Some(blocks * WIDTH)
        }
    }
}
