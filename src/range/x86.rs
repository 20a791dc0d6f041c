//! x86_64 range-algorithm kernels.
//!
//! - SSE4.1 processes 16 bytes per block (`pshufb`, `palignr`, `ptest`).
//! - AVX2 processes 32 bytes per block. `vpshufb` and `vpalignr` work within
//!   128-bit lanes, so the shifts that carry bytes across the lane boundary
//!   go through `vperm2i128` first.
//!
//! Bounds are checked with unsigned saturating subtraction: a byte is out of
//! range iff `min -| byte` or `byte -| max` is non-zero.

use core::arch::x86_64::*;

use super::tables::{FIRST_LEN, FIRST_RANGE, RANGE_ADJUST, RANGE_MAX, RANGE_MIN};

/// SSE4.1 block width in bytes.
pub const SSE41_WIDTH: usize = 16;

/// AVX2 block width in bytes.
pub const AVX2_WIDTH: usize = 32;

/// Validate `data` with the SSE4.1 kernel.
///
/// # Safety
///
/// CPU must support SSE4.1 (caller should check).
#[target_feature(enable = "sse4.1")]
pub unsafe fn is_valid_sse41(data: &[u8]) -> bool {
    unsafe {
        match validate_blocks_sse41(data) {
            Some(processed) => super::finish(data, processed),
            None => false,
        }
    }
}

/// Validate `data` with the AVX2 kernel.
///
/// # Safety
///
/// CPU must support AVX2 (caller should check).
#[target_feature(enable = "avx2")]
pub unsafe fn is_valid_avx2(data: &[u8]) -> bool {
    unsafe {
        match validate_blocks_avx2(data) {
            Some(processed) => super::finish(data, processed),
            None => false,
        }
    }
}

// =============================================================================
// SSE4.1
// =============================================================================

/// Lookup tables loaded into SSE registers once per call.
struct Sse41Tables {
    first_len: __m128i,
    first_range: __m128i,
    range_min: __m128i,
    range_max: __m128i,
    adjust_lo: __m128i,
    adjust_hi: __m128i,
}

impl Sse41Tables {
    #[target_feature(enable = "sse4.1")]
    #[inline]
    unsafe fn load() -> Self {
        unsafe {
            Self {
                first_len: load_table(&FIRST_LEN),
                first_range: load_table(&FIRST_RANGE),
                range_min: load_table(&RANGE_MIN),
                range_max: load_table(&RANGE_MAX),
                adjust_lo: load_table(&RANGE_ADJUST[..16]),
                adjust_hi: load_table(&RANGE_ADJUST[16..]),
            }
        }
    }
}

#[target_feature(enable = "sse4.1")]
#[inline]
unsafe fn load_table(table: &[u8]) -> __m128i {
    debug_assert_eq!(table.len(), 16);
    unsafe { _mm_loadu_si128(table.as_ptr() as *const __m128i) }
}

/// Validate all whole 16-byte blocks. Returns the bytes covered, or `None`
/// on error.
#[target_feature(enable = "sse4.1")]
unsafe fn validate_blocks_sse41(data: &[u8]) -> Option<usize> {
    unsafe {
        let t = Sse41Tables::load();
        let mut prev_input = _mm_setzero_si128();
        let mut prev_first_len = _mm_setzero_si128();
        let mut error = _mm_setzero_si128();

        let blocks = data.len() / SSE41_WIDTH;
        let ptr = data.as_ptr() as *const __m128i;

        for i in 0..blocks {
            let input = _mm_loadu_si128(ptr.add(i));
            let (block_error, first_len) = check_block_sse41(input, prev_input, prev_first_len, &t);
            error = _mm_or_si128(error, block_error);
            prev_input = input;
            prev_first_len = first_len;
        }

        if _mm_testz_si128(error, error) == 0 {
            None
        } else {
            Some(blocks * SSE41_WIDTH)
        }
    }
}

/// Range check of one 16-byte block. Returns `(error, first_len)`.
#[target_feature(enable = "sse4.1")]
#[inline]
unsafe fn check_block_sse41(
    input: __m128i,
    prev_input: __m128i,
    prev_first_len: __m128i,
    t: &Sse41Tables,
) -> (__m128i, __m128i) {
    unsafe {
        let high_nibbles = _mm_and_si128(_mm_srli_epi16(input, 4), _mm_set1_epi8(0x0F));

        let first_len = _mm_shuffle_epi8(t.first_len, high_nibbles);
        let mut range = _mm_shuffle_epi8(t.first_range, high_nibbles);

        // Second byte: first_len of the byte before
        range = _mm_or_si128(range, _mm_alignr_epi8(first_len, prev_first_len, 15));

        // Third byte: first_len - 1 of the byte two before
        let one = _mm_set1_epi8(1);
        let cur = _mm_subs_epu8(first_len, one);
        let prev = _mm_subs_epu8(prev_first_len, one);
        range = _mm_or_si128(range, _mm_alignr_epi8(cur, prev, 14));

        // Fourth byte: first_len - 2 of the byte three before
        let two = _mm_set1_epi8(2);
        let cur = _mm_subs_epu8(first_len, two);
        let prev = _mm_subs_epu8(prev_first_len, two);
        range = _mm_or_si128(range, _mm_alignr_epi8(cur, prev, 13));

        // Special second bytes after E0, ED, F0, F4
        let shift1 = _mm_alignr_epi8(input, prev_input, 15);
        range = _mm_add_epi8(range, adjust_sse41(shift1, t));

        let minv = _mm_shuffle_epi8(t.range_min, range);
        let maxv = _mm_shuffle_epi8(t.range_max, range);

        let below = _mm_subs_epu8(minv, input);
        let above = _mm_subs_epu8(input, maxv);

        (_mm_or_si128(below, above), first_len)
    }
}

/// 32-entry adjustment lookup as two 16-entry `pshufb`s.
///
/// `idx -| ... +| 0x70` maps 0..15 to 0x70..0x7F (low nibble kept) and
/// everything else to a value with the high bit set, which `pshufb` turns
/// into 0.
#[target_feature(enable = "sse4.1")]
#[inline]
unsafe fn adjust_sse41(shift1: __m128i, t: &Sse41Tables) -> __m128i {
    unsafe {
        let bias = _mm_set1_epi8(0x70);
        let lo_idx = _mm_adds_epu8(_mm_sub_epi8(shift1, _mm_set1_epi8(0xE0u8 as i8)), bias);
        let hi_idx = _mm_adds_epu8(_mm_sub_epi8(shift1, _mm_set1_epi8(0xF0u8 as i8)), bias);
        _mm_add_epi8(
            _mm_shuffle_epi8(t.adjust_lo, lo_idx),
            _mm_shuffle_epi8(t.adjust_hi, hi_idx),
        )
    }
}

// =============================================================================
// AVX2
// =============================================================================

/// Lookup tables broadcast to both 128-bit lanes.
struct Avx2Tables {
    first_len: __m256i,
    first_range: __m256i,
    range_min: __m256i,
    range_max: __m256i,
    adjust_lo: __m256i,
    adjust_hi: __m256i,
}

impl Avx2Tables {
    #[target_feature(enable = "avx2")]
    #[inline]
    unsafe fn load() -> Self {
        unsafe {
            Self {
                first_len: broadcast_table(&FIRST_LEN),
                first_range: broadcast_table(&FIRST_RANGE),
                range_min: broadcast_table(&RANGE_MIN),
                range_max: broadcast_table(&RANGE_MAX),
                adjust_lo: broadcast_table(&RANGE_ADJUST[..16]),
                adjust_hi: broadcast_table(&RANGE_ADJUST[16..]),
            }
        }
    }
}

#[target_feature(enable = "avx2")]
#[inline]
unsafe fn broadcast_table(table: &[u8]) -> __m256i {
    debug_assert_eq!(table.len(), 16);
    unsafe { _mm256_broadcastsi128_si256(_mm_loadu_si128(table.as_ptr() as *const __m128i)) }
}

/// Validate all whole 32-byte blocks. Returns the bytes covered, or `None`
/// on error.
#[target_feature(enable = "avx2")]
unsafe fn validate_blocks_avx2(data: &[u8]) -> Option<usize> {
    unsafe {
        let t = Avx2Tables::load();
        let mut prev_input = _mm256_setzero_si256();
        let mut prev_first_len = _mm256_setzero_si256();
        let mut error = _mm256_setzero_si256();

        let blocks = data.len() / AVX2_WIDTH;
        let ptr = data.as_ptr() as *const __m256i;

        for i in 0..blocks {
            let input = _mm256_loadu_si256(ptr.add(i));
            let (block_error, first_len) = check_block_avx2(input, prev_input, prev_first_len, &t);
            error = _mm256_or_si256(error, block_error);
            prev_input = input;
            prev_first_len = first_len;
        }

        if _mm256_testz_si256(error, error) == 0 {
            None
        } else {
            Some(blocks * AVX2_WIDTH)
        }
    }
}

/// Shift the 32-byte stream `prev ++ input` right by 1 byte, bringing
/// `prev[31]` to position 0.
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn shift_right_1(input: __m256i, prev: __m256i) -> __m256i {
    unsafe {
        // [prev_high, input_low]
        let prev_high_input_low = _mm256_permute2x128_si256(prev, input, 0x21);
        _mm256_alignr_epi8(input, prev_high_input_low, 15)
    }
}

/// Shift right by 2 bytes: `result[0..2] = prev[30..32]`.
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn shift_right_2(input: __m256i, prev: __m256i) -> __m256i {
    unsafe {
        let prev_high_input_low = _mm256_permute2x128_si256(prev, input, 0x21);
        _mm256_alignr_epi8(input, prev_high_input_low, 14)
    }
}

/// Shift right by 3 bytes: `result[0..3] = prev[29..32]`.
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn shift_right_3(input: __m256i, prev: __m256i) -> __m256i {
    unsafe {
        let prev_high_input_low = _mm256_permute2x128_si256(prev, input, 0x21);
        _mm256_alignr_epi8(input, prev_high_input_low, 13)
    }
}

/// Range check of one 32-byte block. Returns `(error, first_len)`.
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn check_block_avx2(
    input: __m256i,
    prev_input: __m256i,
    prev_first_len: __m256i,
    t: &Avx2Tables,
) -> (__m256i, __m256i) {
    unsafe {
        let high_nibbles = _mm256_and_si256(_mm256_srli_epi16(input, 4), _mm256_set1_epi8(0x0F));

        let first_len = _mm256_shuffle_epi8(t.first_len, high_nibbles);
        let mut range = _mm256_shuffle_epi8(t.first_range, high_nibbles);

        range = _mm256_or_si256(range, shift_right_1(first_len, prev_first_len));

        let one = _mm256_set1_epi8(1);
        let cur = _mm256_subs_epu8(first_len, one);
        let prev = _mm256_subs_epu8(prev_first_len, one);
        range = _mm256_or_si256(range, shift_right_2(cur, prev));

        let two = _mm256_set1_epi8(2);
        let cur = _mm256_subs_epu8(first_len, two);
        let prev = _mm256_subs_epu8(prev_first_len, two);
        range = _mm256_or_si256(range, shift_right_3(cur, prev));

        let shift1 = shift_right_1(input, prev_input);
        let bias = _mm256_set1_epi8(0x70);
        let lo_idx = _mm256_adds_epu8(_mm256_sub_epi8(shift1, _mm256_set1_epi8(0xE0u8 as i8)), bias);
        let hi_idx = _mm256_adds_epu8(_mm256_sub_epi8(shift1, _mm256_set1_epi8(0xF0u8 as i8)), bias);
        let adjust = _mm256_add_epi8(
            _mm256_shuffle_epi8(t.adjust_lo, lo_idx),
            _mm256_shuffle_epi8(t.adjust_hi, hi_idx),
        );
        range = _mm256_add_epi8(range, adjust);

        let minv = _mm256_shuffle_epi8(t.range_min, range);
        let maxv = _mm256_shuffle_epi8(t.range_max, range);

        let below = _mm256_subs_epu8(minv, input);
        let above = _mm256_subs_epu8(input, maxv);

        (_mm256_or_si256(below, above), first_len)
    }
}
