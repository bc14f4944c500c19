//! Stream utilities: `x2x`, `bcut`, `bcp`, `merge`, `swab`, `dmp`, `transpose`.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Args;
use sptk_core::Matrix;
use sptk_io::{DataType, ValueReader, open_input, parse_type_pair, swap_bytes, write_record};

use super::common::{
    Input, Output, double_records, flush, single_input, split_type_operands, stdout,
    write_doubles,
};

fn data_type_or(spec: Option<&str>, default: DataType) -> Result<DataType> {
    match spec {
        Some(spec) => spec
            .parse()
            .with_context(|| format!("invalid data type '+{spec}'")),
        None => Ok(default),
    }
}

fn value_reader(path: Option<&Path>, data_type: DataType) -> Result<ValueReader<Input>> {
    Ok(ValueReader::new(open_input(path)?, data_type))
}

/// Block length from `-l`, or `-m + 1`.
fn block_length(length: Option<usize>, order: Option<usize>, default: usize) -> Result<usize> {
    let length = order.map_or(length.unwrap_or(default), |m| m + 1);
    if length == 0 {
        bail!("block length must be positive");
    }
    Ok(length)
}

/// Behavior of `x2x` for values outside the output range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutOfRange {
    Clip,
    Warn,
    Exit,
}

impl OutOfRange {
    fn from_index(index: u8) -> Self {
        match index {
            1 => Self::Warn,
            2 => Self::Exit,
            _ => Self::Clip,
        }
    }
}

/// Arguments for `x2x`.
#[derive(Args, Debug)]
pub struct X2xArgs {
    /// Round values converted to an integer type
    #[arg(short = 'r')]
    rounding: bool,

    /// Out-of-range values: 0 (clip), 1 (clip and warn), 2 (exit)
    #[arg(short = 'e', default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=2))]
    out_of_range: u8,

    /// Values per line of ASCII output
    #[arg(short = 'c', default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    columns: u64,

    /// `+xy` input and output types [default: +da], then the input file
    operands: Vec<String>,
}

pub fn run_x2x(args: X2xArgs) -> Result<()> {
    let (spec, files) = split_type_operands(&args.operands)?;
    let (from, to) = match spec {
        Some(spec) => {
            parse_type_pair(spec).with_context(|| format!("invalid data types '+{spec}'"))?
        }
        None => (DataType::Double, DataType::Ascii),
    };
    let behavior = OutOfRange::from_index(args.out_of_range);
    let columns = usize::try_from(args.columns).context("too many columns")?;

    let mut reader = value_reader(single_input(&files)?, from)?;
    let mut out = stdout()?;
    let mut line = Vec::with_capacity(columns);
    let mut index = 0usize;
    while let Some(value) = reader.read_value()? {
        index += 1;
        let in_range = to
            .integer_range()
            .is_none_or(|(low, high)| (low..=high).contains(&value));
        if !in_range && behavior != OutOfRange::Clip {
            if behavior == OutOfRange::Exit {
                flush(&mut out)?;
                bail!("{index}th data is over the range of output type");
            }
            eprintln!("sptk x2x: {index}th data is over the range of output type");
        }
        if to == DataType::Ascii {
            line.push(value.to_string());
            if line.len() == columns {
                writeln!(out, "{}", line.join("\t")).context("failed to write output")?;
                line.clear();
            }
        } else {
            write_record(&mut out, to, &[value], args.rounding)?;
        }
    }
    if !line.is_empty() {
        writeln!(out, "{}", line.join("\t")).context("failed to write output")?;
    }
    flush(&mut out)
}

/// Arguments for `bcut`.
#[derive(Args, Debug)]
pub struct BcutArgs {
    /// Start block number
    #[arg(short = 's', default_value_t = 0)]
    start: usize,

    /// End block number [default: end of input]
    #[arg(short = 'e')]
    end: Option<usize>,

    /// Block length [default: 1]
    #[arg(short = 'l', conflicts_with = "order")]
    length: Option<usize>,

    /// Block order (block length minus one)
    #[arg(short = 'm')]
    order: Option<usize>,

    /// `+type` [default: +d], then the input file
    operands: Vec<String>,
}

pub fn run_bcut(args: BcutArgs) -> Result<()> {
    if args.end.is_some_and(|end| end < args.start) {
        bail!("end number must be equal to or greater than start number");
    }
    let (spec, files) = split_type_operands(&args.operands)?;
    let data_type = data_type_or(spec, DataType::Double)?;
    let length = block_length(args.length, args.order, 1)?;

    let mut reader = value_reader(single_input(&files)?, data_type)?;
    let mut out = stdout()?;
    let mut block = Vec::with_capacity(length);
    for index in 0.. {
        block.clear();
        if reader.read_many(length, &mut block)? < length {
            break;
        }
        if args.end.is_some_and(|end| end < index) {
            break;
        }
        if args.start <= index {
            write_record(&mut out, data_type, &block, false)?;
        }
    }
    flush(&mut out)
}

/// Arguments for `bcp`.
#[derive(Args, Debug)]
pub struct BcpArgs {
    /// First element copied from each input block
    #[arg(short = 's', default_value_t = 0)]
    start: usize,

    /// Last element copied from each input block [default: l-1]
    #[arg(short = 'e')]
    end: Option<usize>,

    /// Input block length [default: 512]
    #[arg(short = 'l', conflicts_with = "order")]
    length: Option<usize>,

    /// Input block order
    #[arg(short = 'm')]
    order: Option<usize>,

    /// Position of the copy in the output block
    #[arg(short = 'S', default_value_t = 0)]
    output_start: usize,

    /// Output block length [default: S + e - s + 1]
    #[arg(short = 'L', conflicts_with = "output_order")]
    output_length: Option<usize>,

    /// Output block order
    #[arg(short = 'M')]
    output_order: Option<usize>,

    /// Value of the padded slots
    #[arg(short = 'f', default_value_t = 0.0, allow_negative_numbers = true)]
    pad: f64,

    /// `+type` [default: +d], then the input file
    operands: Vec<String>,
}

/// Validated geometry of a `bcp` copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlockCopy {
    input_length: usize,
    start: usize,
    end: usize,
    output_start: usize,
    output_length: usize,
}

impl BlockCopy {
    fn from_args(args: &BcpArgs) -> Result<Self> {
        let input_length = block_length(args.length, args.order, 512)?;
        if input_length <= args.start {
            bail!("start number {} must be less than block length {input_length}", args.start);
        }
        let end = args.end.unwrap_or(input_length - 1);
        if input_length <= end {
            bail!("end number {end} must be less than block length {input_length}");
        }
        if end < args.start {
            bail!("end number {end} must be equal to or greater than start number {}", args.start);
        }
        let copy_length = end - args.start + 1;
        let needed = args.output_start + copy_length;
        let output_length = match args.output_order.map(|m| m + 1).or(args.output_length) {
            Some(length) if length < needed => bail!("output block length is too short"),
            Some(length) => length,
            None => needed,
        };
        Ok(Self {
            input_length,
            start: args.start,
            end,
            output_start: args.output_start,
            output_length,
        })
    }

    fn copy(&self, input: &[f64], pad: f64, output: &mut Vec<f64>) {
        output.clear();
        output.resize(self.output_start, pad);
        output.extend_from_slice(&input[self.start..=self.end]);
        output.resize(self.output_length, pad);
    }
}

pub fn run_bcp(args: BcpArgs) -> Result<()> {
    let geometry = BlockCopy::from_args(&args)?;
    let (spec, files) = split_type_operands(&args.operands)?;
    let data_type = data_type_or(spec, DataType::Double)?;

    let mut reader = value_reader(single_input(&files)?, data_type)?;
    let mut out = stdout()?;
    let (mut block, mut copied) = (Vec::new(), Vec::new());
    loop {
        block.clear();
        if reader.read_many(geometry.input_length, &mut block)? < geometry.input_length {
            break;
        }
        geometry.copy(&block, args.pad, &mut copied);
        write_record(&mut out, data_type, &copied, false)?;
    }
    flush(&mut out)
}

/// Arguments for `merge`.
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Insert point in each input frame
    #[arg(short = 's', default_value_t = 0)]
    insert_point: usize,

    /// Frame length of the input data [default: 25]
    #[arg(short = 'l', conflicts_with = "input_order")]
    input_length: Option<usize>,

    /// Order of the input data
    #[arg(short = 'n')]
    input_order: Option<usize>,

    /// Frame length of the inserted data [default: 10]
    #[arg(short = 'L', conflicts_with = "insert_order")]
    insert_length: Option<usize>,

    /// Order of the inserted data
    #[arg(short = 'N')]
    insert_order: Option<usize>,

    /// Overwrite input values instead of inserting
    #[arg(short = 'w')]
    overwrite: bool,

    /// `+type` [default: +d], the file to insert, then the input file
    operands: Vec<String>,
}

/// Validated geometry of a `merge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VectorMerge {
    insert_point: usize,
    input_length: usize,
    insert_length: usize,
    overwrite: bool,
}

impl VectorMerge {
    fn from_args(args: &MergeArgs) -> Result<Self> {
        let input_length = block_length(args.input_length, args.input_order, 25)?;
        let insert_length = block_length(args.insert_length, args.insert_order, 10)?;
        if input_length < args.insert_point {
            bail!("insert point must be equal to or less than input length");
        }
        if args.overwrite && input_length < args.insert_point + insert_length {
            bail!("the end of the inserted data exceeds the input frame");
        }
        Ok(Self {
            insert_point: args.insert_point,
            input_length,
            insert_length,
            overwrite: args.overwrite,
        })
    }

    /// Input values following the inserted segment.
    fn rest_length(&self) -> usize {
        self.input_length - self.insert_point - if self.overwrite { self.insert_length } else { 0 }
    }

    /// Merge one frame; `false` once either stream runs out.
    fn next_frame(
        &self,
        input: &mut ValueReader<Input>,
        insert: &mut ValueReader<Input>,
        merged: &mut Vec<f64>,
    ) -> Result<bool> {
        merged.clear();
        if input.read_many(self.insert_point, merged)? < self.insert_point {
            return Ok(false);
        }
        if insert.read_many(self.insert_length, merged)? < self.insert_length {
            return Ok(false);
        }
        if self.overwrite {
            let mut skipped = Vec::with_capacity(self.insert_length);
            if input.read_many(self.insert_length, &mut skipped)? < self.insert_length {
                return Ok(false);
            }
        }
        let rest = self.rest_length();
        if input.read_many(rest, merged)? < rest {
            return Ok(false);
        }
        Ok(true)
    }
}

pub fn run_merge(args: MergeArgs) -> Result<()> {
    let geometry = VectorMerge::from_args(&args)?;
    let (spec, files) = split_type_operands(&args.operands)?;
    let data_type = data_type_or(spec, DataType::Double)?;
    let (insert_file, input_file) = match files.as_slice() {
        [insert] => (insert.as_path(), None),
        [insert, input] => (insert.as_path(), Some(input.as_path())),
        [] => bail!("file to insert is required"),
        _ => bail!("too many input files"),
    };

    let mut insert = value_reader(Some(insert_file), data_type)?;
    let mut input = value_reader(input_file, data_type)?;
    let mut out = stdout()?;
    let mut merged = Vec::new();
    let mut frames = 0usize;
    while geometry.next_frame(&mut input, &mut insert, &mut merged)? {
        write_record(&mut out, data_type, &merged, false)?;
        frames += 1;
    }
    if input.read_value()?.is_some() || insert.read_value()?.is_some() {
        tracing::warn!(frames, "input streams have different numbers of frames");
    }
    flush(&mut out)
}

/// Arguments for `swab`.
#[derive(Args, Debug)]
pub struct SwabArgs {
    /// Start address in bytes
    #[arg(short = 'S', default_value_t = 0)]
    start_address: usize,

    /// Start offset in elements
    #[arg(short = 's', default_value_t = 0)]
    start_offset: usize,

    /// End address in bytes
    #[arg(short = 'E')]
    end_address: Option<usize>,

    /// End offset in elements
    #[arg(short = 'e')]
    end_offset: Option<usize>,

    /// `+type` [default: +s], then the input file
    operands: Vec<String>,
}

pub fn run_swab(args: SwabArgs) -> Result<()> {
    let (spec, files) = split_type_operands(&args.operands)?;
    let data_type = data_type_or(spec, DataType::Int16)?;
    if !data_type.is_binary() {
        bail!("cannot swap bytes of ASCII data");
    }
    let size = data_type.size();
    let skip = args.start_address + size * args.start_offset;
    let end_address = args.end_address.unwrap_or(usize::MAX);
    let end_offset = args.end_offset.unwrap_or(usize::MAX);
    if end_address < args.start_address || end_offset < args.start_offset {
        bail!("end must be equal to or greater than start");
    }

    let mut input = open_input(single_input(&files)?)?;
    std::io::copy(&mut input.by_ref().take(skip as u64), &mut std::io::sink())
        .context("failed to skip input")?;

    let mut out = stdout()?;
    let mut element = vec![0u8; size];
    let (mut address, mut offset) = (skip, args.start_offset);
    while address <= end_address && offset <= end_offset {
        match input.read_exact(&mut element) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e).context("failed to read input"),
        }
        swap_bytes(&mut element, data_type)?;
        out.write_all(&element).context("failed to write output")?;
        address += size;
        offset += 1;
    }
    flush(&mut out)
}

/// Arguments for `dmp`.
#[derive(Args, Debug)]
pub struct DmpArgs {
    /// Block length; indices run from 1 to l
    #[arg(short = 'l', conflicts_with = "order", value_parser = clap::value_parser!(u64).range(1..))]
    length: Option<u64>,

    /// Block order; indices run from 0 to m
    #[arg(short = 'm')]
    order: Option<usize>,

    /// `+type` [default: +d], then the input file
    operands: Vec<String>,
}

/// First and last index of each dumped block.
fn dump_indices(length: Option<u64>, order: Option<usize>) -> Result<(usize, Option<usize>)> {
    Ok(match (length, order) {
        (Some(length), _) => {
            let length = usize::try_from(length).context("block length is too large")?;
            (1, Some(length))
        }
        (None, Some(order)) => (0, Some(order)),
        (None, None) => (0, None),
    })
}

pub fn run_dmp(args: DmpArgs) -> Result<()> {
    let (spec, files) = split_type_operands(&args.operands)?;
    let data_type = data_type_or(spec, DataType::Double)?;
    let (first, last) = dump_indices(args.length, args.order)?;

    let mut reader = value_reader(single_input(&files)?, data_type)?;
    let mut out: Output = stdout()?;
    let mut index = first;
    while let Some(value) = reader.read_value()? {
        writeln!(out, "{index}\t{value}").context("failed to write output")?;
        index = if last == Some(index) { first } else { index + 1 };
    }
    flush(&mut out)
}

/// Arguments for `transpose`.
#[derive(Args, Debug)]
pub struct TransposeArgs {
    /// Number of rows
    #[arg(short = 'r', default_value_t = 1)]
    rows: usize,

    /// Number of columns
    #[arg(short = 'c', default_value_t = 1)]
    columns: usize,

    /// Input file [default: stdin]
    input: Option<std::path::PathBuf>,
}

pub fn run_transpose(args: TransposeArgs) -> Result<()> {
    if args.rows == 0 || args.columns == 0 {
        bail!("number of rows and columns must be positive");
    }
    let mut reader = double_records(args.input.as_deref(), args.rows * args.columns)?;
    let mut out = stdout()?;
    let mut values = Vec::new();
    while reader.next_record(&mut values)? {
        let matrix = Matrix::from_vec(args.rows, args.columns, std::mem::take(&mut values))?;
        write_doubles(&mut out, matrix.transpose().as_slice())?;
    }
    flush(&mut out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bcp_args(start: usize, end: Option<usize>, length: usize) -> BcpArgs {
        BcpArgs {
            start,
            end,
            length: Some(length),
            order: None,
            output_start: 0,
            output_length: None,
            output_order: None,
            pad: 0.0,
            operands: Vec::new(),
        }
    }

    #[test]
    fn test_block_length() {
        assert_eq!(block_length(None, None, 512).unwrap(), 512);
        assert_eq!(block_length(Some(4), None, 512).unwrap(), 4);
        assert_eq!(block_length(None, Some(3), 512).unwrap(), 4);
        assert!(block_length(Some(0), None, 1).is_err());
    }

    #[test]
    fn test_block_copy_geometry() {
        let geometry = BlockCopy::from_args(&bcp_args(1, Some(2), 4)).unwrap();
        assert_eq!(geometry.output_length, 2);

        let mut args = bcp_args(1, Some(2), 4);
        args.output_start = 1;
        args.output_length = Some(5);
        args.pad = -1.0;
        let geometry = BlockCopy::from_args(&args).unwrap();
        let mut output = Vec::new();
        geometry.copy(&[10.0, 11.0, 12.0, 13.0], args.pad, &mut output);
        assert_eq!(output, vec![-1.0, 11.0, 12.0, -1.0, -1.0]);
    }

    #[test]
    fn test_block_copy_rejects_bad_ranges() {
        assert!(BlockCopy::from_args(&bcp_args(4, None, 4)).is_err());
        assert!(BlockCopy::from_args(&bcp_args(2, Some(1), 4)).is_err());
        assert!(BlockCopy::from_args(&bcp_args(0, Some(4), 4)).is_err());
        let mut args = bcp_args(0, Some(3), 4);
        args.output_length = Some(3);
        assert!(BlockCopy::from_args(&args).is_err());
    }

    #[test]
    fn test_merge_rest_length() {
        let insert = VectorMerge {
            insert_point: 2,
            input_length: 5,
            insert_length: 2,
            overwrite: false,
        };
        assert_eq!(insert.rest_length(), 3);
        let overwrite = VectorMerge {
            overwrite: true,
            ..insert
        };
        assert_eq!(overwrite.rest_length(), 1);
    }

    #[test]
    fn test_merge_frames() {
        let geometry = VectorMerge {
            insert_point: 1,
            input_length: 3,
            insert_length: 1,
            overwrite: true,
        };
        let input: Input = Box::new(std::io::Cursor::new(b"1 2 3 4 5 6\n".to_vec()));
        let insert: Input = Box::new(std::io::Cursor::new(b"9 8\n".to_vec()));
        let mut input = ValueReader::new(input, DataType::Ascii);
        let mut insert = ValueReader::new(insert, DataType::Ascii);
        let mut merged = Vec::new();
        assert!(geometry.next_frame(&mut input, &mut insert, &mut merged).unwrap());
        assert_eq!(merged, vec![1.0, 9.0, 3.0]);
        assert!(geometry.next_frame(&mut input, &mut insert, &mut merged).unwrap());
        assert_eq!(merged, vec![4.0, 8.0, 6.0]);
        assert!(!geometry.next_frame(&mut input, &mut insert, &mut merged).unwrap());
    }

    #[test]
    fn test_dump_indices() {
        assert_eq!(dump_indices(None, None).unwrap(), (0, None));
        assert_eq!(dump_indices(Some(3), None).unwrap(), (1, Some(3)));
        assert_eq!(dump_indices(None, Some(2)).unwrap(), (0, Some(2)));
    }

    #[test]
    fn test_out_of_range_behaviors() {
        assert_eq!(OutOfRange::from_index(0), OutOfRange::Clip);
        assert_eq!(OutOfRange::from_index(1), OutOfRange::Warn);
        assert_eq!(OutOfRange::from_index(2), OutOfRange::Exit);
    }
}
