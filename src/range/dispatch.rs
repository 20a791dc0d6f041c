//! Runtime kernel selection.
//!
//! The first call to [`is_valid`] goes through a resolver that detects the
//! best kernel, stores its entry point, and forwards the call. Every later
//! call is one relaxed load and an indirect call, the same shape as an ELF
//! IFUNC.

use core::fmt;
use core::str::FromStr;
use core::sync::atomic::{AtomicPtr, AtomicU8, Ordering};

#[cfg(not(any(test, feature = "std")))]
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::naive;
use super::portable;

/// A UTF-8 validation kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum Kernel {
    /// Byte-by-byte reference validator.
    Naive = 1,
    /// Range algorithm on plain arrays, 16 bytes per block.
    Portable = 2,
    /// Range algorithm with SSE4.1, 16 bytes per block.
    Sse41 = 3,
    /// Range algorithm with AVX2, 32 bytes per block.
    Avx2 = 4,
    /// Range algorithm with NEON, 16 bytes per block.
    Neon = 5,
}

/// All kernels, in ascending order of preference.
pub const ALL_KERNELS: [Kernel; 5] = [
    Kernel::Naive,
    Kernel::Portable,
    Kernel::Sse41,
    Kernel::Avx2,
    Kernel::Neon,
];

impl Kernel {
    /// Short lowercase name, as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Naive => "naive",
            Self::Portable => "portable",
            Self::Sse41 => "sse41",
            Self::Avx2 => "avx2",
            Self::Neon => "neon",
        }
    }

    /// Bytes per vector block (1 for the naive kernel).
    pub const fn width(self) -> usize {
        match self {
            Self::Naive => 1,
            Self::Portable | Self::Sse41 | Self::Neon => 16,
            Self::Avx2 => 32,
        }
    }

    /// Whether this kernel can run on the current CPU.
    ///
    /// With `std`, x86 features are detected at runtime. Without it, only
    /// features enabled at compile time (`-C target-feature`) count.
    pub fn is_available(self) -> bool {
        match self {
            Self::Naive | Self::Portable => true,
            Self::Sse41 => has_sse41(),
            Self::Avx2 => has_avx2(),
            Self::Neon => cfg!(target_arch = "aarch64"),
        }
    }

    /// The best kernel for the current CPU.
    ///
    /// Preference: AVX2, then SSE4.1 on x86_64; NEON on aarch64; naive
    /// elsewhere. The `portable-range` feature forces [`Kernel::Portable`].
    pub fn detect() -> Kernel {
        if cfg!(feature = "portable-range") {
            return Kernel::Portable;
        }
        if Kernel::Avx2.is_available() {
            Kernel::Avx2
        } else if Kernel::Sse41.is_available() {
            Kernel::Sse41
        } else if Kernel::Neon.is_available() {
            Kernel::Neon
        } else {
            Kernel::Naive
        }
    }

    /// All kernels usable on this machine.
    pub fn available() -> Vec<Kernel> {
        ALL_KERNELS
            .iter()
            .copied()
            .filter(|k| k.is_available())
            .collect()
    }

    fn from_u8(value: u8) -> Option<Kernel> {
        ALL_KERNELS.iter().copied().find(|k| *k as u8 == value)
    }

    /// Entry point for this kernel, if it exists on this target.
    fn entry(self) -> Option<ValidateFn> {
        match self {
            Self::Naive => Some(naive_entry as ValidateFn),
            Self::Portable => Some(portable_entry as ValidateFn),
            #[cfg(target_arch = "x86_64")]
            Self::Sse41 => Some(super::x86::is_valid_sse41 as ValidateFn),
            #[cfg(target_arch = "x86_64")]
            Self::Avx2 => Some(super::x86::is_valid_avx2 as ValidateFn),
            #[cfg(target_arch = "aarch64")]
            Self::Neon => Some(super::neon::is_valid_neon as ValidateFn),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kernel {
    type Err = ParseKernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        ALL_KERNELS
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(name))
            .or_else(|| name.eq_ignore_ascii_case("sse4.1").then_some(Kernel::Sse41))
            .ok_or(ParseKernelError)
    }
}

/// Error returned when parsing an unknown kernel name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseKernelError;

impl fmt::Display for ParseKernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown kernel (expected one of: naive, portable, sse41, avx2, neon)"
        )
    }
}

/// Error returned when a requested kernel cannot run on this CPU or target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedKernel(pub Kernel);

impl fmt::Display for UnsupportedKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kernel '{}' is not supported on this CPU", self.0)
    }
}

#[cfg(any(test, feature = "std"))]
impl std::error::Error for ParseKernelError {}

#[cfg(any(test, feature = "std"))]
impl std::error::Error for UnsupportedKernel {}

// =============================================================================
// Feature detection
// =============================================================================

#[cfg(all(target_arch = "x86_64", any(test, feature = "std")))]
fn has_sse41() -> bool {
    is_x86_feature_detected!("sse4.1")
}

#[cfg(all(target_arch = "x86_64", any(test, feature = "std")))]
fn has_avx2() -> bool {
    is_x86_feature_detected!("avx2")
}

#[cfg(all(target_arch = "x86_64", not(any(test, feature = "std"))))]
fn has_sse41() -> bool {
    cfg!(target_feature = "sse4.1")
}

#[cfg(all(target_arch = "x86_64", not(any(test, feature = "std"))))]
fn has_avx2() -> bool {
    cfg!(target_feature = "avx2")
}

#[cfg(not(target_arch = "x86_64"))]
fn has_sse41() -> bool {
    false
}

#[cfg(not(target_arch = "x86_64"))]
fn has_avx2() -> bool {
    false
}

// =============================================================================
// Dispatch
// =============================================================================

/// Kernel entry point. Unsafe because vector kernels require CPU features;
/// only pointers to available kernels are ever called.
type ValidateFn = unsafe fn(&[u8]) -> bool;
type FnRaw = *mut ();

/// Current entry point; starts out pointing at the resolver.
static ENTRY: AtomicPtr<()> = AtomicPtr::new(resolve as FnRaw);

/// Kernel behind [`ENTRY`], 0 until resolved.
static SELECTED: AtomicU8 = AtomicU8::new(0);

unsafe fn naive_entry(data: &[u8]) -> bool {
    naive::is_valid(data)
}

unsafe fn portable_entry(data: &[u8]) -> bool {
    portable::is_valid(data)
}

/// Resolve the best kernel, install it, and validate `data` with it.
unsafe fn resolve(data: &[u8]) -> bool {
    let kernel = install();
    match kernel.entry() {
        // SAFETY: `install` only selects available kernels.
        Some(f) => unsafe { f(data) },
        None => naive::is_valid(data),
    }
}

fn install() -> Kernel {
    let kernel = Kernel::detect();
    let entry = kernel.entry().unwrap_or(naive_entry as ValidateFn);
    SELECTED.store(kernel as u8, Ordering::Relaxed);
    ENTRY.store(entry as FnRaw, Ordering::Relaxed);
    kernel
}

/// The kernel [`is_valid`] dispatches to, resolving it if needed.
///
/// # Examples
///
/// ```
/// use utf8range::range::selected_kernel;
///
/// let kernel = selected_kernel();
/// assert!(kernel.is_available());
/// ```
pub fn selected_kernel() -> Kernel {
    match Kernel::from_u8(SELECTED.load(Ordering::Relaxed)) {
        Some(kernel) => kernel,
        None => install(),
    }
}

/// Returns `true` if `data` is well-formed UTF-8, using the best kernel for
/// this CPU.
///
/// The verdict is identical to `core::str::from_utf8(data).is_ok()`.
///
/// # Examples
///
/// ```
/// use utf8range::range::is_valid;
///
/// assert!(is_valid(b""));
/// assert!(is_valid("日本語".as_bytes()));
/// assert!(!is_valid(&[0xC0, 0x80])); // overlong NUL
/// assert!(!is_valid(&[0xE2, 0x82])); // truncated
/// ```
#[inline]
pub fn is_valid(data: &[u8]) -> bool {
    let raw = ENTRY.load(Ordering::Relaxed);
    // SAFETY: ENTRY only ever holds `resolve` or the entry of an available
    // kernel, all of type `ValidateFn`.
    unsafe {
        let f = core::mem::transmute::<FnRaw, ValidateFn>(raw);
        f(data)
    }
}

/// Validate `data` with a specific kernel.
///
/// # Errors
///
/// Returns [`UnsupportedKernel`] if `kernel` cannot run on this CPU.
pub fn is_valid_with(kernel: Kernel, data: &[u8]) -> Result<bool, UnsupportedKernel> {
    if !kernel.is_available() {
        return Err(UnsupportedKernel(kernel));
    }
    match kernel.entry() {
        // SAFETY: availability checked above.
        Some(f) => Ok(unsafe { f(data) }),
        None => Err(UnsupportedKernel(kernel)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for kernel in ALL_KERNELS {
            assert_eq!(kernel.name().parse::<Kernel>(), Ok(kernel));
            assert_eq!(kernel.to_string(), kernel.name());
        }
        assert_eq!("AVX2".parse::<Kernel>(), Ok(Kernel::Avx2));
        assert_eq!("sse4.1".parse::<Kernel>(), Ok(Kernel::Sse41));
        assert_eq!("avx512".parse::<Kernel>(), Err(ParseKernelError));
    }

    #[test]
    fn detected_kernel_is_available() {
        let kernel = Kernel::detect();
        assert!(kernel.is_available());
        assert!(Kernel::available().contains(&kernel));
    }

    #[test]
    fn naive_and_portable_always_available() {
        let available = Kernel::available();
        assert!(available.contains(&Kernel::Naive));
        assert!(available.contains(&Kernel::Portable));
    }

    #[test]
    fn selected_kernel_is_stable() {
        let first = selected_kernel();
        assert!(is_valid(b"warm up the resolver"));
        assert_eq!(selected_kernel(), first);
        assert_eq!(first, Kernel::detect());
    }

    #[test]
    fn unsupported_kernel_is_reported() {
        for kernel in ALL_KERNELS {
            let result = is_valid_with(kernel, b"abc");
            if kernel.is_available() {
                assert_eq!(result, Ok(true));
            } else {
                assert_eq!(result, Err(UnsupportedKernel(kernel)));
            }
        }
    }

    #[test]
    fn every_available_kernel_agrees() {
        let inputs: &[&[u8]] = &[
            b"",
            b"plain ascii that is longer than one block of sixteen bytes",
            "αβγδεζηθικλμνξοπρστυφχψω".as_bytes(),
            &[0xED, 0xA0, 0x80],
            &[0xF0, 0x9F, 0x8E],
        ];
        for kernel in Kernel::available() {
            for input in inputs {
                assert_eq!(
                    is_valid_with(kernel, input),
                    Ok(core::str::from_utf8(input).is_ok()),
                    "{} on {:02X?}",
                    kernel,
                    input
                );
            }
        }
    }

    #[test]
    fn widths() {
        assert_eq!(Kernel::Naive.width(), 1);
        assert_eq!(Kernel::Sse41.width(), 16);
        assert_eq!(Kernel::Avx2.width(), 32);
    }
}
