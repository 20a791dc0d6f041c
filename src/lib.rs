//! # utf8range
//!
//! Fast UTF-8 validation with the *range* algorithm, vectorized for x86_64
//! (SSE4.1, AVX2) and ARM (NEON), with runtime kernel selection.
//!
//! ## Module Organization
//!
//! - [`range`] - Validation kernels, lookup tables and dispatch
//! - [`text`] - Validation with error location (offset, line, column)
//!
//! ## Quick Start
//!
//! ```
//! use utf8range::{is_valid, Kernel, Validator};
//!
//! // Dispatched to the best kernel for this CPU on first call
//! assert!(is_valid("naïve café 🎉".as_bytes()));
//! assert!(!is_valid(&[0xED, 0xA0, 0x80])); // surrogate
//!
//! // Pin a kernel
//! let v = Validator::with_kernel(Kernel::Naive).unwrap();
//! assert!(v.is_valid(b"plain ascii"));
//!
//! // Locate the error
//! let err = v.validate(b"ok\n\xC0\xAF").unwrap_err();
//! assert_eq!((err.line, err.column), (2, 1));
//! ```
//!
//! ## Features
//!
//! - `std` (default) - Runtime CPU feature detection. Without it, vector
//!   kernels are only chosen when enabled at compile time.
//! - `portable-range` - Prefer the portable kernel over intrinsics (for
//!   benchmarking and testing the portable code path)
//! - `serde` - Enable serialization of [`Config`] and [`Kernel`]
//! - `cli` - Build the `utf8range` command-line tool

// Use no_std unless std feature is enabled or we're in test mode
#![cfg_attr(not(any(test, feature = "std")), no_std)]

// When using no_std, we need to explicitly link the alloc crate
#[cfg(not(any(test, feature = "std")))]
extern crate alloc;

// When using std, re-export alloc types from std for compatibility
#[cfg(any(test, feature = "std"))]
extern crate std as alloc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Range-algorithm validation kernels and dispatch.
pub mod range;

/// Text validation with error location.
pub mod text;

mod validator;

pub use range::{is_valid, selected_kernel, Kernel, ParseKernelError, UnsupportedKernel};
pub use text::{validate_utf8, Utf8Error, Utf8ErrorKind};
pub use validator::Validator;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for building a [`Validator`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Kernel to use. `None` selects the best available (default).
    #[cfg_attr(feature = "serde", serde(default))]
    pub kernel: Option<Kernel>,
}
