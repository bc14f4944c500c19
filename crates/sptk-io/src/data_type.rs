//! Element types of SPTK data streams.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Element type of a stream, named by its one-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    /// `c`: 8-bit signed integer.
    Int8,
    /// `C`: 8-bit unsigned integer.
    UInt8,
    /// `s`: 16-bit signed integer.
    Int16,
    /// `S`: 16-bit unsigned integer.
    UInt16,
    /// `h`: 24-bit signed integer.
    Int24,
    /// `H`: 24-bit unsigned integer.
    UInt24,
    /// `i`: 32-bit signed integer.
    Int32,
    /// `I`: 32-bit unsigned integer.
    UInt32,
    /// `l`: 64-bit signed integer.
    Int64,
    /// `L`: 64-bit unsigned integer.
    UInt64,
    /// `f`: 32-bit float.
    Float,
    /// `d`: 64-bit float.
    #[default]
    Double,
    /// `e`: x87 80-bit extended float, stored in a 16-byte slot.
    Extended,
    /// `a`: whitespace-separated ASCII decimals.
    Ascii,
}

impl DataType {
    /// Every type, in code order.
    pub const ALL: [DataType; 14] = [
        DataType::Int8,
        DataType::UInt8,
        DataType::Int16,
        DataType::UInt16,
        DataType::Int24,
        DataType::UInt24,
        DataType::Int32,
        DataType::UInt32,
        DataType::Int64,
        DataType::UInt64,
        DataType::Float,
        DataType::Double,
        DataType::Extended,
        DataType::Ascii,
    ];

    /// Parse a one-letter code.
    pub fn from_code(code: char) -> Result<Self, Error> {
        Ok(match code {
            'c' => Self::Int8,
            'C' => Self::UInt8,
            's' => Self::Int16,
            'S' => Self::UInt16,
            'h' => Self::Int24,
            'H' => Self::UInt24,
            'i' => Self::Int32,
            'I' => Self::UInt32,
            'l' => Self::Int64,
            'L' => Self::UInt64,
            'f' => Self::Float,
            'd' => Self::Double,
            'a' => Self::Ascii,
            'e' => Self::Extended,
            other => return Err(Error::unknown_type(other)),
        })
    }

    /// The one-letter code.
    pub fn code(self) -> char {
        match self {
            Self::Int8 => 'c',
            Self::UInt8 => 'C',
            Self::Int16 => 's',
            Self::UInt16 => 'S',
            Self::Int24 => 'h',
            Self::UInt24 => 'H',
            Self::Int32 => 'i',
            Self::UInt32 => 'I',
            Self::Int64 => 'l',
            Self::UInt64 => 'L',
            Self::Float => 'f',
            Self::Double => 'd',
            Self::Extended => 'e',
            Self::Ascii => 'a',
        }
    }

    /// Bytes per element. ASCII has no fixed width and reports 0.
    pub fn size(self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int24 | Self::UInt24 => 3,
            Self::Int32 | Self::UInt32 | Self::Float => 4,
            Self::Int64 | Self::UInt64 | Self::Double => 8,
            Self::Extended => 16,
            Self::Ascii => 0,
        }
    }

    /// Whether values of this type are integers.
    pub fn is_integer(self) -> bool {
        !matches!(self, Self::Float | Self::Double | Self::Extended | Self::Ascii)
    }

    /// Whether the stream is binary.
    pub fn is_binary(self) -> bool {
        self != Self::Ascii
    }

    /// Representable range of an integer type.
    pub fn integer_range(self) -> Option<(f64, f64)> {
        Some(match self {
            Self::Int8 => (i8::MIN as f64, i8::MAX as f64),
            Self::UInt8 => (0.0, u8::MAX as f64),
            Self::Int16 => (i16::MIN as f64, i16::MAX as f64),
            Self::UInt16 => (0.0, u16::MAX as f64),
            Self::Int24 => (-8_388_608.0, 8_388_607.0),
            Self::UInt24 => (0.0, 16_777_215.0),
            Self::Int32 => (i32::MIN as f64, i32::MAX as f64),
            Self::UInt32 => (0.0, u32::MAX as f64),
            Self::Int64 => (i64::MIN as f64, i64::MAX as f64),
            Self::UInt64 => (0.0, u64::MAX as f64),
            Self::Float | Self::Double | Self::Extended | Self::Ascii => return None,
        })
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(code), None) => Self::from_code(code),
            _ => Err(Error::InvalidTypeCode(s.to_string())),
        }
    }
}

/// Parse the `+xy` pair notation of `x2x` into input and output types.
///
/// ```rust
/// use sptk_io::{DataType, parse_type_pair};
///
/// assert_eq!(
///     parse_type_pair("+sd").unwrap(),
///     (DataType::Int16, DataType::Double),
/// );
/// ```
pub fn parse_type_pair(s: &str) -> Result<(DataType, DataType), Error> {
    let codes = s.strip_prefix('+').unwrap_or(s);
    let mut chars = codes.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(input), Some(output), None) => {
            Ok((DataType::from_code(input)?, DataType::from_code(output)?))
        }
        _ => Err(Error::InvalidTypeCode(s.to_string())),
    }
}
