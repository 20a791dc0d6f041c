//! Text processing utilities.
//!
//! ## UTF-8 Validation
//!
//! The [`utf8`] module reports where input stops being valid UTF-8: byte
//! offset, line number, column position and the kind of violation. Valid
//! input is accepted by the dispatched [`range`](crate::range) kernel
//! without a byte-by-byte scan.
//!
//! ```
//! use utf8range::text::utf8::{validate_utf8, Utf8ErrorKind};
//!
//! // Valid UTF-8
//! assert!(validate_utf8(b"Hello, world!").is_ok());
//! assert!(validate_utf8("日本語".as_bytes()).is_ok());
//!
//! // Invalid UTF-8 (bare continuation byte)
//! let err = validate_utf8(&[b'a', 0x80]).unwrap_err();
//! assert_eq!(err.kind, Utf8ErrorKind::InvalidLeadByte);
//! assert_eq!(err.offset, 1);
//! ```

pub mod utf8;

pub use utf8::{validate_utf8, Utf8Error, Utf8ErrorKind};
