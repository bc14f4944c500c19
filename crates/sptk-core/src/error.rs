//! Error type shared by every kernel in the toolkit.

/// Errors returned by kernel `run` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The kernel was constructed with parameters that violate its
    /// invariants; `is_valid()` reports `false` for it.
    InvalidConfiguration,
    /// An input sequence does not have the length the configuration expects.
    LengthMismatch {
        /// Length required by the configuration.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
    /// A 2×2 block or a decomposition pivot fell below the determinant floor.
    SingularMatrix,
    /// Input values outside the kernel's domain (e.g. a zero gain).
    InvalidInput(&'static str),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidConfiguration => write!(f, "invalid configuration"),
            Self::LengthMismatch { expected, actual } => {
                write!(f, "expected input of length {expected}, got {actual}")
            }
            Self::SingularMatrix => write!(f, "matrix is singular"),
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Convenience result type for kernel calls.
pub type Result<T> = core::result::Result<T, Error>;

/// Fails with [`Error::LengthMismatch`] unless `actual == expected`.
#[inline]
pub fn ensure_length(actual: usize, expected: usize) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(Error::LengthMismatch { expected, actual })
    }
}

/// Fails with [`Error::InvalidConfiguration`] unless `is_valid` holds.
#[inline]
pub fn ensure_valid(is_valid: bool) -> Result<()> {
    if is_valid {
        Ok(())
    } else {
        Err(Error::InvalidConfiguration)
    }
}
