//! FFT commands: `fft`, `ifft`, `fftr`, `ifftr`, `fft2`, `ifft2`, `fftr2`.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use sptk_io::RecordReader;
use sptk_core::{
    Fft, InverseFft, Matrix, RealFft, RealFftBuffer, RealInverseFft, TwoDimensionalFft,
    TwoDimensionalFftBuffer, TwoDimensionalInverseFft, TwoDimensionalRealFft,
    TwoDimensionalRealFftBuffer, fft::append_boundary, fft::swap_quadrants,
};

use super::common::{
    Input, Output, double_records, flush, order_for_length, padded_double_records, stdout,
    write_doubles,
};

/// What to emit from a complex spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ComplexOutput {
    RealAndImaginary,
    Real,
    Imaginary,
    Amplitude,
    Power,
}

impl ComplexOutput {
    fn from_index(index: u8) -> Result<Self> {
        Ok(match index {
            0 => Self::RealAndImaginary,
            1 => Self::Real,
            2 => Self::Imaginary,
            3 => Self::Amplitude,
            4 => Self::Power,
            other => bail!("unknown output format {other}"),
        })
    }

    fn write(self, out: &mut Output, real: &[f64], imag: &[f64]) -> Result<()> {
        match self {
            Self::RealAndImaginary => {
                write_doubles(out, real)?;
                write_doubles(out, imag)
            }
            Self::Real => write_doubles(out, real),
            Self::Imaginary => write_doubles(out, imag),
            Self::Amplitude | Self::Power => {
                let values: Vec<f64> = real
                    .iter()
                    .zip(imag)
                    .map(|(x, y)| {
                        let power = x * x + y * y;
                        if self == Self::Power { power } else { power.sqrt() }
                    })
                    .collect();
                write_doubles(out, &values)
            }
        }
    }
}

/// Arguments for `fft`.
#[derive(Args, Debug)]
pub struct FftArgs {
    /// FFT length
    #[arg(short = 'l', default_value_t = 256)]
    fft_length: usize,

    /// Order of the input sequence [default: l-1]
    #[arg(short = 'm')]
    order: Option<usize>,

    /// Output format: 0 real and imaginary, 1 real, 2 imaginary, 3 amplitude, 4 power
    #[arg(short = 'o', default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=4))]
    output_format: u8,

    /// Input file: real part then imaginary part per frame [default: stdin]
    input: Option<PathBuf>,
}

/// Arguments for `ifft`.
#[derive(Args, Debug)]
pub struct IfftArgs {
    /// FFT length
    #[arg(short = 'l', default_value_t = 256)]
    fft_length: usize,

    /// Output format: 0 real and imaginary, 1 real, 2 imaginary
    #[arg(short = 'o', default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=2))]
    output_format: u8,

    /// Input file [default: stdin]
    input: Option<PathBuf>,
}

/// Arguments for `fftr`.
#[derive(Args, Debug)]
pub struct FftrArgs {
    /// FFT length
    #[arg(short = 'l', default_value_t = 256)]
    fft_length: usize,

    /// Order of the input sequence [default: l-1]
    #[arg(short = 'm')]
    order: Option<usize>,

    /// Output format: 0 real and imaginary, 1 real, 2 imaginary, 3 amplitude, 4 power
    #[arg(short = 'o', default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=4))]
    output_format: u8,

    /// Output only the first l/2+1 bins
    #[arg(short = 'H')]
    half: bool,

    /// Input file [default: stdin]
    input: Option<PathBuf>,
}

/// Arguments for `ifftr`.
#[derive(Args, Debug)]
pub struct IfftrArgs {
    /// FFT length
    #[arg(short = 'l', default_value_t = 256)]
    fft_length: usize,

    /// Order of the input sequence [default: l-1]
    #[arg(short = 'm')]
    order: Option<usize>,

    /// Output format: 0 real and imaginary, 1 real, 2 imaginary
    #[arg(short = 'o', default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=2))]
    output_format: u8,

    /// Input file [default: stdin]
    input: Option<PathBuf>,
}

pub fn run_fft(args: FftArgs) -> Result<()> {
    let order = order_for_length(args.order, args.fft_length)?;
    let fft = Fft::new(order, args.fft_length);
    if !fft.is_valid() {
        bail!("FFT length must be a power of two of at least 4");
    }
    let format = ComplexOutput::from_index(args.output_format)?;

    let mut reader = padded_double_records(args.input.as_deref(), order + 1)?;
    let mut out = stdout()?;
    let (mut x, mut y) = (Vec::new(), Vec::new());
    let (mut re, mut im) = (Vec::new(), Vec::new());
    while reader.next_record(&mut x)? && reader.next_record(&mut y)? {
        fft.run(&x, &y, &mut re, &mut im)
            .context("failed to run fast Fourier transform")?;
        format.write(&mut out, &re, &im)?;
    }
    flush(&mut out)
}

pub fn run_ifft(args: IfftArgs) -> Result<()> {
    let ifft = InverseFft::with_length(args.fft_length);
    if !ifft.is_valid() {
        bail!("FFT length must be a power of two of at least 4");
    }
    let format = ComplexOutput::from_index(args.output_format)?;

    let mut reader = double_records(args.input.as_deref(), args.fft_length)?;
    let mut out = stdout()?;
    let (mut x, mut y) = (Vec::new(), Vec::new());
    let (mut re, mut im) = (Vec::new(), Vec::new());
    while reader.next_record(&mut x)? && reader.next_record(&mut y)? {
        ifft.run(&x, &y, &mut re, &mut im)
            .context("failed to run inverse fast Fourier transform")?;
        format.write(&mut out, &re, &im)?;
    }
    flush(&mut out)
}

pub fn run_fftr(args: FftrArgs) -> Result<()> {
    let order = order_for_length(args.order, args.fft_length)?;
    let fft = RealFft::new(order, args.fft_length);
    if !fft.is_valid() {
        bail!("FFT length must be a power of two of at least 8");
    }
    let format = ComplexOutput::from_index(args.output_format)?;
    let output_length = if args.half {
        args.fft_length / 2 + 1
    } else {
        args.fft_length
    };

    let mut reader = padded_double_records(args.input.as_deref(), order + 1)?;
    let mut out = stdout()?;
    let mut buffer = RealFftBuffer::default();
    let mut x = Vec::new();
    let (mut re, mut im) = (Vec::new(), Vec::new());
    while reader.next_record(&mut x)? {
        fft.run(&x, &mut re, &mut im, &mut buffer)
            .context("failed to run fast Fourier transform")?;
        format.write(&mut out, &re[..output_length], &im[..output_length])?;
    }
    flush(&mut out)
}

pub fn run_ifftr(args: IfftrArgs) -> Result<()> {
    let order = order_for_length(args.order, args.fft_length)?;
    let ifft = RealInverseFft::new(order, args.fft_length);
    if !ifft.is_valid() {
        bail!("FFT length must be a power of two of at least 8");
    }
    let format = ComplexOutput::from_index(args.output_format)?;

    let mut reader = padded_double_records(args.input.as_deref(), order + 1)?;
    let mut out = stdout()?;
    let mut buffer = RealFftBuffer::default();
    let mut x = Vec::new();
    let (mut re, mut im) = (Vec::new(), Vec::new());
    while reader.next_record(&mut x)? {
        ifft.run(&x, &mut re, &mut im, &mut buffer)
            .context("failed to run inverse fast Fourier transform")?;
        format.write(&mut out, &re, &im)?;
    }
    flush(&mut out)
}

/// Layout of a 2D spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputStyle {
    /// `L × L` as computed.
    Standard,
    /// Quadrants swapped so the zero frequency sits at the centre.
    Centered,
    /// Centered, plus a boundary row and column.
    CenteredWithBoundary,
    /// The first `(L/2 + 1) × (L/2 + 1)` quadrant.
    Quadrant,
}

impl OutputStyle {
    fn from_index(index: u8) -> Result<Self> {
        Ok(match index {
            0 => Self::Standard,
            1 => Self::Centered,
            2 => Self::CenteredWithBoundary,
            3 => Self::Quadrant,
            other => bail!("unknown output style {other}"),
        })
    }

    fn arrange(self, spectrum: Matrix) -> Result<Matrix> {
        let length = spectrum.num_rows();
        Ok(match self {
            Self::Standard => spectrum,
            Self::Centered | Self::CenteredWithBoundary => {
                let mut centered = Matrix::new(length, length);
                swap_quadrants(&spectrum, &mut centered)?;
                if self == Self::Centered {
                    centered
                } else {
                    append_boundary(&centered)
                }
            }
            Self::Quadrant => spectrum.submatrix(0, 0, length / 2 + 1, length / 2 + 1)?,
        })
    }
}

/// Shape options shared by the 2D transforms.
#[derive(Args, Debug)]
pub struct Shape2d {
    /// FFT length
    #[arg(short = 'l', default_value_t = 64)]
    fft_length: usize,

    /// Number of rows [default: l]
    #[arg(short = 'r')]
    num_row: Option<usize>,

    /// Number of columns [default: l]
    #[arg(short = 'c')]
    num_column: Option<usize>,

    /// Output style: 0 standard, 1 centered, 2 centered with boundary, 3 first quadrant
    #[arg(short = 'p', default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    output_style: u8,
}

impl Shape2d {
    fn rows(&self) -> usize {
        self.num_row.unwrap_or(self.fft_length)
    }

    fn columns(&self) -> usize {
        self.num_column.unwrap_or(self.fft_length)
    }
}

/// Arguments for `fft2` and `fftr2`.
#[derive(Args, Debug)]
pub struct Fft2Args {
    #[command(flatten)]
    shape: Shape2d,

    /// Output format: 0 real and imaginary, 1 real, 2 imaginary, 3 amplitude, 4 power
    #[arg(short = 'o', default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=4))]
    output_format: u8,

    /// Input file [default: stdin]
    input: Option<PathBuf>,
}

/// Arguments for `fftr2`.
pub type Fftr2Args = Fft2Args;

/// Arguments for `ifft2`.
#[derive(Args, Debug)]
pub struct Ifft2Args {
    #[command(flatten)]
    shape: Shape2d,

    /// Output format: 0 real and imaginary, 1 real, 2 imaginary
    #[arg(short = 'o', default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=2))]
    output_format: u8,

    /// Input file [default: stdin]
    input: Option<PathBuf>,
}

fn write_matrices(
    out: &mut Output,
    style: OutputStyle,
    format: ComplexOutput,
    real: Matrix,
    imag: Matrix,
) -> Result<()> {
    let real = style.arrange(real)?;
    let imag = style.arrange(imag)?;
    format.write(out, real.as_slice(), imag.as_slice())
}

fn read_matrix(
    reader: &mut RecordReader<Input>,
    record: &mut Vec<f64>,
    rows: usize,
    columns: usize,
) -> Result<Option<Matrix>> {
    if !reader.next_record(record)? {
        return Ok(None);
    }
    Ok(Some(Matrix::from_vec(rows, columns, std::mem::take(record))?))
}

pub fn run_fft2(args: Fft2Args) -> Result<()> {
    let (rows, columns) = (args.shape.rows(), args.shape.columns());
    let fft = TwoDimensionalFft::new(rows, columns, args.shape.fft_length);
    if !fft.is_valid() {
        bail!("matrix must fit in an FFT length that is a power of two");
    }
    let style = OutputStyle::from_index(args.shape.output_style)?;
    let format = ComplexOutput::from_index(args.output_format)?;

    let mut reader = double_records(args.input.as_deref(), rows * columns)?;
    let mut out = stdout()?;
    let mut buffer = TwoDimensionalFftBuffer::default();
    let mut record = Vec::new();
    while let Some(x) = read_matrix(&mut reader, &mut record, rows, columns)? {
        let Some(y) = read_matrix(&mut reader, &mut record, rows, columns)? else {
            break;
        };
        let (mut re, mut im) = (Matrix::new(0, 0), Matrix::new(0, 0));
        fft.run(&x, &y, &mut re, &mut im, &mut buffer)
            .context("failed to run 2D fast Fourier transform")?;
        write_matrices(&mut out, style, format, re, im)?;
    }
    flush(&mut out)
}

pub fn run_ifft2(args: Ifft2Args) -> Result<()> {
    let (rows, columns) = (args.shape.rows(), args.shape.columns());
    let ifft = TwoDimensionalInverseFft::new(rows, columns, args.shape.fft_length);
    if !ifft.is_valid() {
        bail!("matrix must fit in an FFT length that is a power of two");
    }
    let style = OutputStyle::from_index(args.shape.output_style)?;
    let format = ComplexOutput::from_index(args.output_format)?;

    let mut reader = double_records(args.input.as_deref(), rows * columns)?;
    let mut out = stdout()?;
    let mut buffer = TwoDimensionalFftBuffer::default();
    let mut record = Vec::new();
    while let Some(x) = read_matrix(&mut reader, &mut record, rows, columns)? {
        let Some(y) = read_matrix(&mut reader, &mut record, rows, columns)? else {
            break;
        };
        let (mut re, mut im) = (Matrix::new(0, 0), Matrix::new(0, 0));
        ifft.run(&x, &y, &mut re, &mut im, &mut buffer)
            .context("failed to run 2D inverse fast Fourier transform")?;
        write_matrices(&mut out, style, format, re, im)?;
    }
    flush(&mut out)
}

pub fn run_fftr2(args: Fftr2Args) -> Result<()> {
    let (rows, columns) = (args.shape.rows(), args.shape.columns());
    let fft = TwoDimensionalRealFft::new(rows, columns, args.shape.fft_length);
    if !fft.is_valid() {
        bail!("matrix must fit in an FFT length that is a power of two");
    }
    let style = OutputStyle::from_index(args.shape.output_style)?;
    let format = ComplexOutput::from_index(args.output_format)?;

    let mut reader = double_records(args.input.as_deref(), rows * columns)?;
    let mut out = stdout()?;
    let mut buffer = TwoDimensionalRealFftBuffer::default();
    let mut record = Vec::new();
    while let Some(x) = read_matrix(&mut reader, &mut record, rows, columns)? {
        let (mut re, mut im) = (Matrix::new(0, 0), Matrix::new(0, 0));
        fft.run(&x, &mut re, &mut im, &mut buffer)
            .context("failed to run 2D fast Fourier transform")?;
        write_matrices(&mut out, style, format, re, im)?;
    }
    flush(&mut out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_style_layouts() {
        let mut spectrum = Matrix::new(4, 4);
        spectrum[0][0] = 1.0;

        let centered = OutputStyle::Centered.arrange(spectrum.clone()).unwrap();
        assert_eq!(centered[2][2], 1.0);

        let bounded = OutputStyle::CenteredWithBoundary.arrange(spectrum.clone()).unwrap();
        assert_eq!(bounded.num_rows(), 5);
        assert_eq!(bounded[2][2], 1.0);

        let quadrant = OutputStyle::Quadrant.arrange(spectrum).unwrap();
        assert_eq!(quadrant.num_rows(), 3);
        assert_eq!(quadrant[0][0], 1.0);
    }

    #[test]
    fn test_complex_output_indices() {
        assert_eq!(ComplexOutput::from_index(4).unwrap(), ComplexOutput::Power);
        assert!(ComplexOutput::from_index(5).is_err());
        assert!(OutputStyle::from_index(4).is_err());
    }
}
