//! Stream I/O for the SPTK command-line tools.
//!
//! Every tool reads and writes headerless streams of numbers. This crate
//! provides:
//!
//! - **Element types**: [`DataType`] names the one-letter codes (`d`, `f`,
//!   `s`, `a`, ...) the tools accept
//! - **Value codecs**: [`ValueReader`] and [`write_value`] convert any type
//!   through `f64`, little-endian, clipping and optionally rounding on the
//!   way back to integers
//! - **Records**: [`RecordReader`] yields fixed-length frames with optional
//!   zero padding of the final one
//! - **Byte order**: [`swap_bytes`] for `swab`
//!
//! ## Quick Start
//!
//! ```rust
//! use sptk_io::{DataType, RecordReader, write_record};
//!
//! let mut bytes = Vec::new();
//! write_record(&mut bytes, DataType::Int16, &[1.0, -2.0, 3.0], false).unwrap();
//!
//! let mut reader = RecordReader::new(bytes.as_slice(), DataType::Int16, 2).with_zero_padding(true);
//! let mut record = Vec::new();
//! assert!(reader.next_record(&mut record).unwrap());
//! assert_eq!(record, vec![1.0, -2.0]);
//! assert!(reader.next_record(&mut record).unwrap());
//! assert_eq!(record, vec![3.0, 0.0]);
//! assert!(!reader.next_record(&mut record).unwrap());
//! ```

mod data_type;
mod stream;

pub use data_type::{DataType, parse_type_pair};
pub use stream::{
    RecordReader, ValueReader, decode, encode, open_input, open_output, read_all, swap_bytes,
    write_record, write_value,
};

use std::path::PathBuf;

/// Error types for stream operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The code names no data type.
    #[error("unknown data type: {0}")]
    UnknownType(char),

    /// A type argument is not a single code (or a `+xy` pair).
    #[error("invalid type specification: {0}")]
    InvalidTypeCode(String),

    /// An ASCII token is not a number.
    #[error("invalid number '{token}'")]
    InvalidNumber {
        /// Offending token.
        token: String,
        /// Parse failure.
        #[source]
        source: std::num::ParseFloatError,
    },

    /// A byte-level operation was requested on ASCII data.
    #[error("data type '{0}' has no fixed byte width")]
    NotBinary(crate::DataType),

    /// A file could not be opened.
    #[error("cannot open file '{path}': {source}")]
    Open {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an unknown type error.
    pub fn unknown_type(code: char) -> Self {
        Error::UnknownType(code)
    }

    /// Create an open error.
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Open {
            path: path.into(),
            source,
        }
    }
}

/// Convenience result type for stream operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn open_error_keeps_source() {
        let err = Error::open("/no/such", std::io::Error::new(std::io::ErrorKind::NotFound, "mock"));
        let msg = err.to_string();
        assert!(msg.contains("cannot open file"), "got: {msg}");
        assert!(msg.contains("/no/such"), "got: {msg}");
        assert!(err.source().is_some());
    }
}
