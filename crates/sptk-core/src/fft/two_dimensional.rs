//! Separable 2-D transforms built from the 1-D engines.
//!
//! An `R × C` input is zero-padded to `L × L`. The first pass transforms
//! each of the `C` columns; the second pass transforms across the `C`
//! first-pass results for every one of the `L` frequency bins. Row `i` of
//! the output is the `i`-th second-pass spectrum.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::error::{Result, ensure_length, ensure_valid};
use crate::matrix::Matrix;

use super::{Fft, InverseFft, RealFft, RealFftBuffer};

/// Scratch for [`TwoDimensionalFft`] and [`TwoDimensionalInverseFft`].
#[derive(Debug, Clone, Default)]
pub struct TwoDimensionalFftBuffer {
    real_part_input: Vec<f64>,
    imag_part_input: Vec<f64>,
    first_real_part_outputs: Vec<Vec<f64>>,
    first_imag_part_outputs: Vec<Vec<f64>>,
    second_real_part_output: Vec<f64>,
    second_imag_part_output: Vec<f64>,
}

impl TwoDimensionalFftBuffer {
    fn prepare(&mut self, num_column: usize, fft_length: usize) {
        self.first_real_part_outputs
            .resize_with(num_column, Vec::new);
        self.first_imag_part_outputs
            .resize_with(num_column, Vec::new);
        self.real_part_input.resize(fft_length, 0.0);
        self.imag_part_input.resize(fft_length, 0.0);
    }
}

/// Scratch for [`TwoDimensionalRealFft`].
#[derive(Debug, Clone, Default)]
pub struct TwoDimensionalRealFftBuffer {
    two_dimensional: TwoDimensionalFftBuffer,
    real_fft: RealFftBuffer,
}

/// Shape shared by all three 2-D transforms.
#[derive(Debug, Clone, Copy)]
struct Shape {
    num_row: usize,
    num_column: usize,
    fft_length: usize,
}

impl Shape {
    fn is_valid(&self) -> bool {
        0 < self.num_row
            && self.num_row <= self.fft_length
            && 0 < self.num_column
            && self.num_column <= self.fft_length
    }

    fn check_input(&self, input: &Matrix) -> Result<()> {
        ensure_length(input.num_rows(), self.num_row)?;
        ensure_length(input.num_columns(), self.num_column)
    }

    fn prepare_output(&self, output: &mut Matrix) {
        if output.num_rows() != self.fft_length || output.num_columns() != self.fft_length {
            output.resize(self.fft_length, self.fft_length);
        }
    }
}

/// Transform across the first-pass spectra and store one output row per
/// frequency bin.
fn second_pass<F>(
    shape: Shape,
    transform: F,
    buffer: &mut TwoDimensionalFftBuffer,
    real_output: &mut Matrix,
    imag_output: &mut Matrix,
) -> Result<()>
where
    F: Fn(&[f64], &[f64], &mut Vec<f64>, &mut Vec<f64>) -> Result<()>,
{
    shape.prepare_output(real_output);
    shape.prepare_output(imag_output);

    let TwoDimensionalFftBuffer {
        real_part_input: x,
        imag_part_input: y,
        first_real_part_outputs: first_x,
        first_imag_part_outputs: first_y,
        second_real_part_output: second_x,
        second_imag_part_output: second_y,
    } = buffer;

    x[shape.num_column..].fill(0.0);
    y[shape.num_column..].fill(0.0);
    for i in 0..shape.fft_length {
        for j in 0..shape.num_column {
            x[j] = first_x[j][i];
            y[j] = first_y[j][i];
        }
        transform(&x[..], &y[..], &mut *second_x, &mut *second_y)?;
        real_output[i].copy_from_slice(&second_x[..]);
        imag_output[i].copy_from_slice(&second_y[..]);
    }
    Ok(())
}

/// Load column `column` of `input` into `target`, zero-padding the tail.
fn load_column(input: &Matrix, column: usize, target: &mut [f64]) {
    let num_row = input.num_rows();
    for (j, value) in target.iter_mut().enumerate() {
        *value = if j < num_row { input[j][column] } else { 0.0 };
    }
}

macro_rules! complex_two_dimensional {
    ($(#[$meta:meta])* $name:ident, $engine:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            shape: Shape,
            engine: $engine,
            is_valid: bool,
        }

        impl $name {
            /// Transform of an `num_row × num_column` input padded to
            /// `fft_length × fft_length`.
            pub fn new(num_row: usize, num_column: usize, fft_length: usize) -> Self {
                let shape = Shape {
                    num_row,
                    num_column,
                    fft_length,
                };
                let engine = $engine::with_length(fft_length);
                let is_valid = shape.is_valid() && engine.is_valid();
                Self {
                    shape,
                    engine,
                    is_valid,
                }
            }

            /// Transform length `L`.
            pub fn fft_length(&self) -> usize {
                self.shape.fft_length
            }

            /// Whether construction succeeded.
            pub fn is_valid(&self) -> bool {
                self.is_valid
            }

            /// Transform `(real_input, imag_input)` into `L × L` outputs.
            pub fn run(
                &self,
                real_input: &Matrix,
                imag_input: &Matrix,
                real_output: &mut Matrix,
                imag_output: &mut Matrix,
                buffer: &mut TwoDimensionalFftBuffer,
            ) -> Result<()> {
                ensure_valid(self.is_valid)?;
                self.shape.check_input(real_input)?;
                self.shape.check_input(imag_input)?;

                let length = self.shape.fft_length;
                buffer.prepare(self.shape.num_column, length);
                for i in 0..self.shape.num_column {
                    load_column(real_input, i, &mut buffer.real_part_input);
                    load_column(imag_input, i, &mut buffer.imag_part_input);
                    self.engine.run(
                        &buffer.real_part_input,
                        &buffer.imag_part_input,
                        &mut buffer.first_real_part_outputs[i],
                        &mut buffer.first_imag_part_outputs[i],
                    )?;
                }

                second_pass(
                    self.shape,
                    |x, y, out_x, out_y| self.engine.run(x, y, out_x, out_y),
                    buffer,
                    real_output,
                    imag_output,
                )
            }
        }
    };
}

complex_two_dimensional!(
    /// 2-D complex FFT.
    TwoDimensionalFft,
    Fft
);

complex_two_dimensional!(
    /// 2-D complex inverse FFT, scaled by `1 / L²`.
    TwoDimensionalInverseFft,
    InverseFft
);

/// 2-D FFT of a real matrix.
///
/// The column pass uses [`RealFft`]; the cross pass is a complex [`Fft`].
#[derive(Debug, Clone)]
pub struct TwoDimensionalRealFft {
    shape: Shape,
    fft: Fft,
    real_fft: RealFft,
    is_valid: bool,
}

impl TwoDimensionalRealFft {
    /// Transform of an `num_row × num_column` real input.
    pub fn new(num_row: usize, num_column: usize, fft_length: usize) -> Self {
        let shape = Shape {
            num_row,
            num_column,
            fft_length,
        };
        let fft = Fft::with_length(fft_length);
        let real_fft = RealFft::with_length(fft_length);
        let is_valid = shape.is_valid() && fft.is_valid() && real_fft.is_valid();
        Self {
            shape,
            fft,
            real_fft,
            is_valid,
        }
    }

    /// Transform length `L`.
    pub fn fft_length(&self) -> usize {
        self.shape.fft_length
    }

    /// Whether construction succeeded.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Transform `input` into `L × L` outputs.
    pub fn run(
        &self,
        input: &Matrix,
        real_output: &mut Matrix,
        imag_output: &mut Matrix,
        buffer: &mut TwoDimensionalRealFftBuffer,
    ) -> Result<()> {
        ensure_valid(self.is_valid)?;
        self.shape.check_input(input)?;

        let length = self.shape.fft_length;
        let inner = &mut buffer.two_dimensional;
        inner.prepare(self.shape.num_column, length);
        for i in 0..self.shape.num_column {
            load_column(input, i, &mut inner.real_part_input);
            self.real_fft.run(
                &inner.real_part_input,
                &mut inner.first_real_part_outputs[i],
                &mut inner.first_imag_part_outputs[i],
                &mut buffer.real_fft,
            )?;
        }

        second_pass(
            self.shape,
            |x, y, out_x, out_y| self.fft.run(x, y, out_x, out_y),
            inner,
            real_output,
            imag_output,
        )
    }
}

/// Swap quadrants so the zero frequency lands at `(L/2, L/2)`.
///
/// `output` becomes `L × L`.
pub fn swap_quadrants(input: &Matrix, output: &mut Matrix) -> Result<()> {
    let length = input.num_rows();
    ensure_length(input.num_columns(), length)?;
    let half = length / 2;
    output.resize(length, length);
    for i in 0..length {
        for j in 0..length {
            output[(i + half) % length][(j + half) % length] = input[i][j];
        }
    }
    Ok(())
}

/// Append a boundary row and column copied from row 0 and column 0.
pub fn append_boundary(input: &Matrix) -> Matrix {
    let n = input.num_rows();
    let m = input.num_columns();
    let mut output = Matrix::new(n + 1, m + 1);
    for i in 0..=n {
        for j in 0..=m {
            output[i][j] = input[i % n.max(1)][j % m.max(1)];
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(num_row: usize, num_column: usize) -> Matrix {
        let mut m = Matrix::new(num_row, num_column);
        for r in 0..num_row {
            for c in 0..num_column {
                m[r][c] = ((r * 3 + c * 5) % 7) as f64 - 3.0;
            }
        }
        m
    }

    #[test]
    fn test_validity() {
        assert!(TwoDimensionalFft::new(3, 4, 4).is_valid());
        assert!(!TwoDimensionalFft::new(5, 4, 4).is_valid());
        assert!(!TwoDimensionalFft::new(0, 4, 4).is_valid());
        assert!(TwoDimensionalRealFft::new(2, 2, 8).is_valid());
        assert!(!TwoDimensionalRealFft::new(2, 2, 4).is_valid());
    }

    #[test]
    fn test_dc_component() {
        let input = sample(3, 2);
        let total: f64 = input.as_slice().iter().sum();
        let fft = TwoDimensionalFft::new(3, 2, 4);
        let mut buffer = TwoDimensionalFftBuffer::default();
        let (mut re, mut im) = (Matrix::default(), Matrix::default());
        fft.run(&input, &Matrix::new(3, 2), &mut re, &mut im, &mut buffer)
            .unwrap();
        assert_eq!(re.num_rows(), 4);
        assert!((re[0][0] - total).abs() < 1e-12);
        assert!(im[0][0].abs() < 1e-12);
    }

    #[test]
    fn test_real_matches_complex() {
        let input = sample(5, 6);
        let length = 8;
        let fft = TwoDimensionalFft::new(5, 6, length);
        let rfft = TwoDimensionalRealFft::new(5, 6, length);
        let (mut re, mut im) = (Matrix::default(), Matrix::default());
        let (mut rre, mut rim) = (Matrix::default(), Matrix::default());
        fft.run(
            &input,
            &Matrix::new(5, 6),
            &mut re,
            &mut im,
            &mut TwoDimensionalFftBuffer::default(),
        )
        .unwrap();
        rfft.run(
            &input,
            &mut rre,
            &mut rim,
            &mut TwoDimensionalRealFftBuffer::default(),
        )
        .unwrap();
        for (a, b) in re.as_slice().iter().zip(rre.as_slice()) {
            assert!((a - b).abs() < 1e-10);
        }
        for (a, b) in im.as_slice().iter().zip(rim.as_slice()) {
            assert!((a - b).abs() < 1e-10);
        }
    }

    #[test]
    fn test_inverse_round_trip() {
        let input = sample(4, 4);
        let fft = TwoDimensionalFft::new(4, 4, 4);
        let ifft = TwoDimensionalInverseFft::new(4, 4, 4);
        let mut buffer = TwoDimensionalFftBuffer::default();
        let (mut re, mut im) = (Matrix::default(), Matrix::default());
        fft.run(&input, &Matrix::new(4, 4), &mut re, &mut im, &mut buffer)
            .unwrap();
        let (mut back_re, mut back_im) = (Matrix::default(), Matrix::default());
        ifft.run(&re, &im, &mut back_re, &mut back_im, &mut buffer)
            .unwrap();
        for r in 0..4 {
            for c in 0..4 {
                assert!((back_re[r][c] - input[r][c]).abs() < 1e-12);
                assert!(back_im[r][c].abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_quadrant_helpers() {
        let input = sample(4, 4);
        let mut swapped = Matrix::default();
        swap_quadrants(&input, &mut swapped).unwrap();
        assert_eq!(swapped[2][2], input[0][0]);
        assert_eq!(swapped[0][3], input[2][1]);

        let bounded = append_boundary(&swapped);
        assert_eq!(bounded.num_rows(), 5);
        assert_eq!(bounded[4][4], swapped[0][0]);
        assert_eq!(bounded[1][4], swapped[1][0]);
        assert_eq!(bounded[4][2], swapped[0][2]);
    }
}
