//! Multi-megabyte differential tests (enable with `--features large-tests`).

#![cfg(feature = "large-tests")]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use utf8range::range::{self, Kernel};
use utf8range::text::utf8::validate_utf8;

const SIZE: usize = 16 * 1024 * 1024;

fn random_text(rng: &mut ChaCha8Rng, size: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(size + 4);
    let mut buf = [0u8; 4];
    while out.len() < size {
        let cp = match rng.gen_range(0..8) {
            0..=3 => rng.gen_range(0x20..0x80),
            4 => rng.gen_range(0x80..0x800),
            5 | 6 => rng.gen_range(0x800..0x10000),
            _ => rng.gen_range(0x10000..0x110000),
        };
        if let Some(ch) = char::from_u32(cp) {
            out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        }
    }
    out
}

#[test]
fn test_large_valid_text() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5EED);
    let text = random_text(&mut rng, SIZE);
    for kernel in Kernel::available() {
        assert_eq!(range::is_valid_with(kernel, &text), Ok(true), "{}", kernel);
    }
}

#[test]
fn test_large_text_with_single_error() {
    let mut rng = ChaCha8Rng::seed_from_u64(0xBAD);
    let clean = random_text(&mut rng, SIZE);

    for _ in 0..32 {
        let mut text = clean.clone();
        let i = rng.gen_range(0..text.len());
        text[i] = rng.gen();

        let expected = core::str::from_utf8(&text).is_ok();
        for kernel in Kernel::available() {
            assert_eq!(range::is_valid_with(kernel, &text), Ok(expected), "{}", kernel);
        }
        if let Err(e) = core::str::from_utf8(&text) {
            let err = validate_utf8(&text).unwrap_err();
            assert!(err.offset >= e.valid_up_to() && err.offset < e.valid_up_to() + 4);
        }
    }
}
