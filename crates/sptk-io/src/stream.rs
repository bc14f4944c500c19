//! Value and record codecs over byte streams.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::{DataType, Error, Result};

/// Decode one little-endian element from the first `data_type.size()`
/// bytes of `bytes`.
pub fn decode(bytes: &[u8], data_type: DataType) -> Result<f64> {
    let mut word = [0u8; 8];
    let size = data_type.size();
    if size == 0 {
        return Err(Error::NotBinary(data_type));
    }
    let Some(element) = bytes.get(..size) else {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    };
    if data_type == DataType::Extended {
        return Ok(extended_to_f64(element));
    }
    word[..size].copy_from_slice(element);
    Ok(match data_type {
        DataType::Int8 => i8::from_le_bytes([word[0]]) as f64,
        DataType::UInt8 => word[0] as f64,
        DataType::Int16 => i16::from_le_bytes([word[0], word[1]]) as f64,
        DataType::UInt16 => u16::from_le_bytes([word[0], word[1]]) as f64,
        DataType::Int24 => {
            let sign = if word[2] & 0x80 != 0 { 0xff } else { 0x00 };
            i32::from_le_bytes([word[0], word[1], word[2], sign]) as f64
        }
        DataType::UInt24 => u32::from_le_bytes([word[0], word[1], word[2], 0]) as f64,
        DataType::Int32 => i32::from_le_bytes([word[0], word[1], word[2], word[3]]) as f64,
        DataType::UInt32 => u32::from_le_bytes([word[0], word[1], word[2], word[3]]) as f64,
        DataType::Int64 => i64::from_le_bytes(word) as f64,
        DataType::UInt64 => u64::from_le_bytes(word) as f64,
        DataType::Float => f32::from_le_bytes([word[0], word[1], word[2], word[3]]) as f64,
        DataType::Double => f64::from_le_bytes(word),
        DataType::Extended | DataType::Ascii => return Err(Error::NotBinary(data_type)),
    })
}

/// Append the little-endian encoding of `value` to `out`.
///
/// Integer types clip to their range after rounding half away from zero
/// (`rounding`) or truncating toward zero.
pub fn encode(value: f64, data_type: DataType, rounding: bool, out: &mut Vec<u8>) -> Result<()> {
    let integer = data_type.integer_range().map(|(low, high)| {
        let v = if rounding { value.round() } else { value.trunc() };
        v.clamp(low, high)
    });
    let v = integer.unwrap_or(value);
    match data_type {
        DataType::Int8 => out.extend_from_slice(&(v as i8).to_le_bytes()),
        DataType::UInt8 => out.extend_from_slice(&(v as u8).to_le_bytes()),
        DataType::Int16 => out.extend_from_slice(&(v as i16).to_le_bytes()),
        DataType::UInt16 => out.extend_from_slice(&(v as u16).to_le_bytes()),
        DataType::Int24 => out.extend_from_slice(&(v as i32).to_le_bytes()[..3]),
        DataType::UInt24 => out.extend_from_slice(&(v as u32).to_le_bytes()[..3]),
        DataType::Int32 => out.extend_from_slice(&(v as i32).to_le_bytes()),
        DataType::UInt32 => out.extend_from_slice(&(v as u32).to_le_bytes()),
        DataType::Int64 => out.extend_from_slice(&(v as i64).to_le_bytes()),
        DataType::UInt64 => out.extend_from_slice(&(v as u64).to_le_bytes()),
        DataType::Float => out.extend_from_slice(&(v as f32).to_le_bytes()),
        DataType::Double => out.extend_from_slice(&v.to_le_bytes()),
        DataType::Extended => out.extend_from_slice(&f64_to_extended(v)),
        DataType::Ascii => return Err(Error::NotBinary(data_type)),
    }
    Ok(())
}

const EXTENDED_BIAS: i32 = 16383;

/// `2^n` built from its bit pattern, exact down to the smallest subnormal.
fn exp2i(n: i32) -> f64 {
    match n {
        1024.. => f64::INFINITY,
        -1022..=1023 => f64::from_bits(((n + 1023) as u64) << 52),
        -1074..=-1023 => f64::from_bits(1u64 << (n + 1074)),
        _ => 0.0,
    }
}

/// Value of an x87 extended float: 64-bit mantissa with an explicit
/// integer bit, then sign and 15-bit biased exponent. Padding is ignored.
fn extended_to_f64(bytes: &[u8]) -> f64 {
    let mut mantissa = [0u8; 8];
    mantissa.copy_from_slice(&bytes[..8]);
    let mantissa = u64::from_le_bytes(mantissa);
    let sign_exponent = u16::from_le_bytes([bytes[8], bytes[9]]);
    let sign = if sign_exponent & 0x8000 != 0 { -1.0 } else { 1.0 };
    let exponent = i32::from(sign_exponent & 0x7fff);
    let magnitude = if exponent == 0x7fff {
        if mantissa << 1 == 0 { f64::INFINITY } else { f64::NAN }
    } else {
        // Denormals use the minimum exponent without an implicit bit.
        let exponent = exponent.max(1);
        mantissa as f64 * exp2i(-63) * exp2i(exponent - EXTENDED_BIAS)
    };
    sign * magnitude
}

/// Exact extended encoding of `value`, zero-padded to sixteen bytes.
fn f64_to_extended(value: f64) -> [u8; 16] {
    let bits = value.to_bits();
    let sign = ((bits >> 63) as u16) << 15;
    let exponent = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    let (exponent, mantissa) = match (exponent, fraction) {
        (0, 0) => (0, 0),
        (0x7ff, 0) => (0x7fff, 1u64 << 63),
        (0x7ff, _) => (0x7fff, (3u64 << 62) | (fraction << 11)),
        (0, _) => {
            let shift = fraction.leading_zeros() as i32;
            (EXTENDED_BIAS + 63 - 1074 - shift, fraction << shift)
        }
        _ => (exponent - 1023 + EXTENDED_BIAS, (1u64 << 63) | (fraction << 11)),
    };
    let mut out = [0u8; 16];
    out[..8].copy_from_slice(&mantissa.to_le_bytes());
    out[8..10].copy_from_slice(&(sign | exponent as u16).to_le_bytes());
    out
}

/// Write one value. ASCII values go one per line.
pub fn write_value<W: Write>(
    writer: &mut W,
    data_type: DataType,
    value: f64,
    rounding: bool,
) -> Result<()> {
    if data_type == DataType::Ascii {
        writeln!(writer, "{value}")?;
        return Ok(());
    }
    let mut bytes = Vec::with_capacity(8);
    encode(value, data_type, rounding, &mut bytes)?;
    writer.write_all(&bytes)?;
    Ok(())
}

/// Write every value of `record`.
pub fn write_record<W: Write>(
    writer: &mut W,
    data_type: DataType,
    record: &[f64],
    rounding: bool,
) -> Result<()> {
    if data_type == DataType::Ascii {
        for value in record {
            writeln!(writer, "{value}")?;
        }
        return Ok(());
    }
    let mut bytes = Vec::with_capacity(record.len() * data_type.size());
    for &value in record {
        encode(value, data_type, rounding, &mut bytes)?;
    }
    writer.write_all(&bytes)?;
    Ok(())
}

/// Reverse the byte order of each `data_type` element in `bytes`.
///
/// A trailing partial element is left untouched.
pub fn swap_bytes(bytes: &mut [u8], data_type: DataType) -> Result<()> {
    let size = data_type.size();
    if size == 0 {
        return Err(Error::NotBinary(data_type));
    }
    for element in bytes.chunks_exact_mut(size) {
        element.reverse();
    }
    Ok(())
}

/// Pull values of one type from a byte stream.
#[derive(Debug)]
pub struct ValueReader<R> {
    reader: R,
    data_type: DataType,
    tokens: VecDeque<String>,
    line: String,
}

impl<R: BufRead> ValueReader<R> {
    /// Reader of `data_type` values.
    pub fn new(reader: R, data_type: DataType) -> Self {
        Self {
            reader,
            data_type,
            tokens: VecDeque::new(),
            line: String::new(),
        }
    }

    /// Element type being read.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Next value, or `None` at the end of the stream.
    ///
    /// A trailing partial binary element counts as the end of the stream.
    pub fn read_value(&mut self) -> Result<Option<f64>> {
        if self.data_type == DataType::Ascii {
            return self.read_token();
        }
        let size = self.data_type.size();
        let mut bytes = [0u8; 16];
        let filled = read_up_to(&mut self.reader, &mut bytes[..size])?;
        if filled < size {
            if 0 < filled {
                tracing::warn!(filled, size, "discarding partial element at end of stream");
            }
            return Ok(None);
        }
        decode(&bytes[..size], self.data_type).map(Some)
    }

    /// Read every remaining value into `values`.
    pub fn read_to_end(&mut self, values: &mut Vec<f64>) -> Result<()> {
        while let Some(value) = self.read_value()? {
            values.push(value);
        }
        Ok(())
    }

    /// Read up to `count` values, returning how many were read.
    pub fn read_many(&mut self, count: usize, values: &mut Vec<f64>) -> Result<usize> {
        let mut read = 0;
        while read < count {
            match self.read_value()? {
                Some(value) => values.push(value),
                None => break,
            }
            read += 1;
        }
        Ok(read)
    }

    fn read_token(&mut self) -> Result<Option<f64>> {
        while self.tokens.is_empty() {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.tokens
                .extend(self.line.split_whitespace().map(str::to_string));
        }
        let Some(token) = self.tokens.pop_front() else {
            return Ok(None);
        };
        token
            .parse::<f64>()
            .map(Some)
            .map_err(|source| Error::InvalidNumber { token, source })
    }
}

fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Fixed-length record reader.
///
/// A short final record ends the stream unless zero padding is enabled,
/// in which case it is padded with zeros and returned once.
#[derive(Debug)]
pub struct RecordReader<R> {
    values: ValueReader<R>,
    record_length: usize,
    zero_padding: bool,
    exhausted: bool,
}

impl<R: BufRead> RecordReader<R> {
    /// Reader of `record_length`-value records.
    pub fn new(reader: R, data_type: DataType, record_length: usize) -> Self {
        Self {
            values: ValueReader::new(reader, data_type),
            record_length,
            zero_padding: false,
            exhausted: false,
        }
    }

    /// Pad a short final record with zeros instead of dropping it.
    pub fn with_zero_padding(mut self, zero_padding: bool) -> Self {
        self.zero_padding = zero_padding;
        self
    }

    /// Values per record.
    pub fn record_length(&self) -> usize {
        self.record_length
    }

    /// Fill `record` with the next record. Returns `false` at the end.
    pub fn next_record(&mut self, record: &mut Vec<f64>) -> Result<bool> {
        record.clear();
        if self.exhausted || self.record_length == 0 {
            return Ok(false);
        }
        let read = self.values.read_many(self.record_length, record)?;
        if read == self.record_length {
            return Ok(true);
        }
        self.exhausted = true;
        if 0 < read && self.zero_padding {
            record.resize(self.record_length, 0.0);
            return Ok(true);
        }
        if 0 < read {
            tracing::debug!(read, record_length = self.record_length, "dropping short final record");
        }
        Ok(false)
    }
}

/// Read every value of `reader`.
pub fn read_all<R: BufRead>(reader: R, data_type: DataType) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    ValueReader::new(reader, data_type).read_to_end(&mut values)?;
    Ok(values)
}

/// Buffered file reader, or standard input when `path` is `None`.
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file = File::open(path).map_err(|e| Error::open(path, e))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin().lock()))),
    }
}

/// Buffered file writer, or standard output when `path` is `None`.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| Error::open(path, e))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}
