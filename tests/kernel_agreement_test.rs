//! Differential tests: every available kernel, the dispatched entry point
//! and the diagnosing validator must agree with `core::str::from_utf8` on
//! arbitrary input.

use proptest::prelude::*;
use utf8range::range::{self, naive, Kernel};
use utf8range::text::utf8::{validate_utf8, validate_utf8_scalar};
use utf8range::Validator;

fn check_all(data: &[u8]) -> Result<(), TestCaseError> {
    let expected = core::str::from_utf8(data).is_ok();

    for kernel in Kernel::available() {
        prop_assert_eq!(
            range::is_valid_with(kernel, data),
            Ok(expected),
            "kernel {} on {:02X?}",
            kernel,
            data
        );
    }
    prop_assert_eq!(range::is_valid(data), expected);

    let diagnosed = validate_utf8(data);
    prop_assert_eq!(diagnosed.is_ok(), expected);
    prop_assert_eq!(&diagnosed, &validate_utf8_scalar(data));

    match core::str::from_utf8(data) {
        Ok(_) => prop_assert_eq!(naive::valid_up_to(data), data.len()),
        Err(e) => {
            prop_assert_eq!(naive::valid_up_to(data), e.valid_up_to());
            let err = diagnosed.unwrap_err();
            // std points past the valid prefix; bad continuation bytes are
            // reported at the byte itself
            prop_assert!(err.offset >= e.valid_up_to());
            prop_assert!(err.offset < e.valid_up_to() + 4);
        }
    }
    Ok(())
}

/// Valid text with a few bytes overwritten.
fn mutated_text() -> impl Strategy<Value = Vec<u8>> {
    (
        "\\PC{0,120}",
        prop::collection::vec((any::<prop::sample::Index>(), any::<u8>()), 1..4),
    )
        .prop_map(|(text, edits)| {
            let mut bytes = text.into_bytes();
            if !bytes.is_empty() {
                for (idx, byte) in edits {
                    let i = idx.index(bytes.len());
                    bytes[i] = byte;
                }
            }
            bytes
        })
}

/// Bytes drawn only from the values the range tables treat specially.
fn interesting_bytes() -> impl Strategy<Value = Vec<u8>> {
    let special = prop::sample::select(vec![
        0x00, 0x41, 0x7F, 0x80, 0x8F, 0x90, 0x9F, 0xA0, 0xBF, 0xC0, 0xC1, 0xC2, 0xDF, 0xE0,
        0xE1, 0xEC, 0xED, 0xEE, 0xEF, 0xF0, 0xF1, 0xF3, 0xF4, 0xF5, 0xF7, 0xF8, 0xFF,
    ]);
    prop::collection::vec(special, 0..80)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_valid_strings_accepted(text in "\\PC{0,200}") {
        check_all(text.as_bytes())?;
        prop_assert!(range::is_valid(text.as_bytes()));
    }

    #[test]
    fn prop_arbitrary_bytes(data in prop::collection::vec(any::<u8>(), 0..100)) {
        check_all(&data)?;
    }

    #[test]
    fn prop_mutated_text(data in mutated_text()) {
        check_all(&data)?;
    }

    #[test]
    fn prop_interesting_bytes(data in interesting_bytes()) {
        check_all(&data)?;
    }

    #[test]
    fn prop_pinned_validator_matches_std(
        text in "\\PC{0,64}",
        pad in 0usize..40,
        bad in prop::sample::select(vec![0x80u8, 0xC0, 0xE0, 0xED, 0xF4, 0xF5, 0xFF]),
    ) {
        let mut data = vec![b'.'; pad];
        data.extend_from_slice(text.as_bytes());
        data.push(bad);
        let expected = core::str::from_utf8(&data).is_ok();
        for kernel in Kernel::available() {
            let v = Validator::with_kernel(kernel).unwrap();
            prop_assert_eq!(v.is_valid(&data), expected);
            prop_assert_eq!(v.validate(&data), validate_utf8_scalar(&data));
        }
    }
}

#[test]
fn test_every_two_and_three_byte_prefix_after_padding() {
    // Padding of 13 puts the sequence across the first 16-byte block edge
    for a in 0x80..=0xFFu8 {
        for b in (0x00..=0xFFu8).step_by(5) {
            for c in [0x00, 0x7F, 0x80, 0x9F, 0xA0, 0xBF, 0xC0] {
                let mut data = vec![b'x'; 13];
                data.extend_from_slice(&[a, b, c, 0x80]);
                data.extend_from_slice(&[b'y'; 20]);
                check_all(&data).unwrap();
            }
        }
    }
}
