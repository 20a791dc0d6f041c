//! Configured validator.

use crate::range::{self, naive, Kernel, UnsupportedKernel};
use crate::text::utf8::{self, Utf8Error};
use crate::Config;

/// A UTF-8 validator bound to one kernel.
///
/// [`Validator::new`] follows the process-wide dispatch; the other
/// constructors pin a kernel after checking it can run here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Validator {
    kernel: Kernel,
    pinned: bool,
}

impl Validator {
    /// Validator using the best kernel for this CPU.
    pub fn new() -> Self {
        Self {
            kernel: range::selected_kernel(),
            pinned: false,
        }
    }

    /// Validator from a [`Config`].
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedKernel`] if the configured kernel is not
    /// available on this CPU.
    pub fn with_config(config: Config) -> Result<Self, UnsupportedKernel> {
        match config.kernel {
            Some(kernel) => Self::with_kernel(kernel),
            None => Ok(Self::new()),
        }
    }

    /// Validator pinned to `kernel`.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedKernel`] if `kernel` is not available on this CPU.
    pub fn with_kernel(kernel: Kernel) -> Result<Self, UnsupportedKernel> {
        if !kernel.is_available() {
            return Err(UnsupportedKernel(kernel));
        }
        Ok(Self {
            kernel,
            pinned: true,
        })
    }

    /// The kernel this validator runs.
    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// Returns `true` if `data` is well-formed UTF-8.
    #[inline]
    pub fn is_valid(&self, data: &[u8]) -> bool {
        if !self.pinned {
            return range::is_valid(data);
        }
        // Availability was checked on construction
        range::is_valid_with(self.kernel, data).unwrap_or_else(|_| naive::is_valid(data))
    }

    /// Validate `data`, locating the first error on failure.
    ///
    /// The error is the same whichever kernel runs.
    pub fn validate(&self, data: &[u8]) -> Result<(), Utf8Error> {
        if self.is_valid(data) {
            Ok(())
        } else {
            utf8::diagnose(data)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::utf8::Utf8ErrorKind;

    #[test]
    fn default_follows_dispatch() {
        let v = Validator::default();
        assert_eq!(v.kernel(), range::selected_kernel());
        assert!(v.is_valid("Grüße 🎉".as_bytes()));
    }

    #[test]
    fn default_config_is_auto() {
        let v = Validator::with_config(Config::default()).unwrap();
        assert_eq!(v, Validator::new());
    }

    #[test]
    fn pinned_kernels() {
        for kernel in Kernel::available() {
            let v = Validator::with_config(Config {
                kernel: Some(kernel),
            })
            .unwrap();
            assert_eq!(v.kernel(), kernel);

            let text = "Привет, 世界! ".repeat(10);
            assert!(v.is_valid(text.as_bytes()));
            assert!(!v.is_valid(&[0xF4, 0x90, 0x80, 0x80]));
        }
    }

    #[test]
    fn unavailable_kernel_rejected() {
        for kernel in range::ALL_KERNELS {
            if !kernel.is_available() {
                assert_eq!(
                    Validator::with_kernel(kernel),
                    Err(UnsupportedKernel(kernel))
                );
            }
        }
    }

    #[test]
    fn validate_reports_same_error_for_every_kernel() {
        let mut input = "line one\nline two ✓\n".repeat(4).into_bytes();
        let bad_at = input.len() + 3;
        input.extend_from_slice(b"abc\xE0\x80\x80 tail tail tail tail");

        for kernel in Kernel::available() {
            let err = Validator::with_kernel(kernel)
                .unwrap()
                .validate(&input)
                .unwrap_err();
            assert_eq!(err.kind, Utf8ErrorKind::OverlongEncoding, "{}", kernel);
            assert_eq!(err.offset, bad_at);
            assert_eq!(err.line, 9);
            assert_eq!(err.column, 4);
        }
    }

    #[cfg(feature = "serde")]
    mod serde_config {
        use super::*;

        #[test]
        fn config_from_json() {
            let config: Config = serde_json::from_str(r#"{"kernel":"portable"}"#).unwrap();
            assert_eq!(config.kernel, Some(Kernel::Portable));

            let config: Config = serde_json::from_str("{}").unwrap();
            assert_eq!(config, Config::default());
        }

        #[test]
        fn config_to_json() {
            let json = serde_json::to_string(&Config {
                kernel: Some(Kernel::Sse41),
            })
            .unwrap();
            assert_eq!(json, r#"{"kernel":"sse41"}"#);
        }
    }
}
