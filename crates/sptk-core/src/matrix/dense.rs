//! Row-major dense matrix.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use core::ops::{Index, IndexMut, Neg};

use crate::error::{Error, Result};

/// Dense `R × C` matrix stored row by row.
///
/// Row `r` is addressed as `m[r]`, a slice of `C` values, so elements read
/// naturally as `m[r][c]`. Arithmetic between matrices is shape-checked and
/// returns [`Error::LengthMismatch`] instead of panicking.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Matrix {
    num_rows: usize,
    num_columns: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create a zero-filled `num_rows × num_columns` matrix.
    pub fn new(num_rows: usize, num_columns: usize) -> Self {
        Self {
            num_rows,
            num_columns,
            data: vec![0.0; num_rows * num_columns],
        }
    }

    /// Wrap row-major `data`; its length must be `num_rows * num_columns`.
    pub fn from_vec(num_rows: usize, num_columns: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != num_rows * num_columns {
            return Err(Error::LengthMismatch {
                expected: num_rows * num_columns,
                actual: data.len(),
            });
        }
        Ok(Self {
            num_rows,
            num_columns,
            data,
        })
    }

    /// Build a matrix from equally long rows.
    pub fn from_rows(rows: &[&[f64]]) -> Result<Self> {
        let num_columns = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(rows.len() * num_columns);
        for row in rows {
            if row.len() != num_columns {
                return Err(Error::LengthMismatch {
                    expected: num_columns,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            num_rows: rows.len(),
            num_columns,
            data,
        })
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    /// Change the shape; every element is reset to zero.
    pub fn resize(&mut self, num_rows: usize, num_columns: usize) {
        self.num_rows = num_rows;
        self.num_columns = num_columns;
        self.data.clear();
        self.data.resize(num_rows * num_columns, 0.0);
    }

    /// Element at `(row, column)`, or `None` when out of range.
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        if row < self.num_rows && column < self.num_columns {
            Some(self.data[row * self.num_columns + column])
        } else {
            None
        }
    }

    /// Row-major view of all elements.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable row-major view of all elements.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Set the main diagonal to `value`, leaving other elements untouched.
    pub fn fill_diagonal(&mut self, value: f64) {
        let n = self.num_rows.min(self.num_columns);
        for i in 0..n {
            self.data[i * self.num_columns + i] = value;
        }
    }

    /// Negate every element in place.
    pub fn negate(&mut self) {
        for v in &mut self.data {
            *v = -*v;
        }
    }

    /// Return the transpose.
    pub fn transpose(&self) -> Matrix {
        let mut out = Matrix::new(self.num_columns, self.num_rows);
        for r in 0..self.num_rows {
            for c in 0..self.num_columns {
                out.data[c * self.num_rows + r] = self.data[r * self.num_columns + c];
            }
        }
        out
    }

    /// Copy the `num_rows × num_columns` block whose top-left corner is at
    /// `(row_offset, column_offset)`.
    pub fn submatrix(
        &self,
        row_offset: usize,
        column_offset: usize,
        num_rows: usize,
        num_columns: usize,
    ) -> Result<Matrix> {
        if self.num_rows < row_offset + num_rows || self.num_columns < column_offset + num_columns
        {
            return Err(Error::InvalidInput("submatrix exceeds matrix bounds"));
        }
        let mut out = Matrix::new(num_rows, num_columns);
        for r in 0..num_rows {
            let src = (row_offset + r) * self.num_columns + column_offset;
            out[r].copy_from_slice(&self.data[src..src + num_columns]);
        }
        Ok(out)
    }

    /// Determinant by cofactor expansion along the first row.
    pub fn determinant(&self) -> Result<f64> {
        if self.num_rows != self.num_columns || self.num_rows == 0 {
            return Err(Error::InvalidInput("determinant needs a non-empty square matrix"));
        }
        Ok(cofactor_determinant(&self.data, self.num_rows))
    }

    /// `self + other`.
    pub fn checked_add(&self, other: &Matrix) -> Result<Matrix> {
        let mut out = self.clone();
        out.add_assign_checked(other)?;
        Ok(out)
    }

    /// `self - other`.
    pub fn checked_sub(&self, other: &Matrix) -> Result<Matrix> {
        let mut out = self.clone();
        out.sub_assign_checked(other)?;
        Ok(out)
    }

    /// In-place `self += other`.
    pub fn add_assign_checked(&mut self, other: &Matrix) -> Result<()> {
        self.ensure_same_shape(other)?;
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += b;
        }
        Ok(())
    }

    /// In-place `self -= other`.
    pub fn sub_assign_checked(&mut self, other: &Matrix) -> Result<()> {
        self.ensure_same_shape(other)?;
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a -= b;
        }
        Ok(())
    }

    /// Matrix product `self · other`.
    pub fn checked_mul(&self, other: &Matrix) -> Result<Matrix> {
        if self.num_columns != other.num_rows {
            return Err(Error::LengthMismatch {
                expected: self.num_columns,
                actual: other.num_rows,
            });
        }
        let mut out = Matrix::new(self.num_rows, other.num_columns);
        for r in 0..self.num_rows {
            for k in 0..self.num_columns {
                let a = self.data[r * self.num_columns + k];
                let row = &other[k];
                for (o, b) in out[r].iter_mut().zip(row) {
                    *o += a * b;
                }
            }
        }
        Ok(out)
    }

    fn ensure_same_shape(&self, other: &Matrix) -> Result<()> {
        if self.num_rows != other.num_rows || self.num_columns != other.num_columns {
            return Err(Error::LengthMismatch {
                expected: self.num_rows * self.num_columns,
                actual: other.num_rows * other.num_columns,
            });
        }
        Ok(())
    }
}

fn cofactor_determinant(data: &[f64], n: usize) -> f64 {
    match n {
        1 => data[0],
        2 => data[0] * data[3] - data[1] * data[2],
        _ => {
            let mut minor = vec![0.0; (n - 1) * (n - 1)];
            let mut det = 0.0;
            let mut sign = 1.0;
            for skip in 0..n {
                let mut k = 0;
                for r in 1..n {
                    for c in (0..n).filter(|&c| c != skip) {
                        minor[k] = data[r * n + c];
                        k += 1;
                    }
                }
                det += sign * data[skip] * cofactor_determinant(&minor, n - 1);
                sign = -sign;
            }
            det
        }
    }
}

impl Index<usize> for Matrix {
    type Output = [f64];

    fn index(&self, row: usize) -> &[f64] {
        let start = row * self.num_columns;
        &self.data[start..start + self.num_columns]
    }
}

impl IndexMut<usize> for Matrix {
    fn index_mut(&mut self, row: usize) -> &mut [f64] {
        let start = row * self.num_columns;
        &mut self.data[start..start + self.num_columns]
    }
}

impl Neg for Matrix {
    type Output = Matrix;

    fn neg(mut self) -> Matrix {
        self.negate();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_zero_fills() {
        let mut m = Matrix::from_rows(&[&[1.0, 2.0], &[3.0, 4.0]]).unwrap();
        m.resize(3, 1);
        assert_eq!(m.num_rows(), 3);
        assert_eq!(m.num_columns(), 1);
        assert!(m.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_product_and_transpose() {
        let a = Matrix::from_rows(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]).unwrap();
        let b = a.transpose();
        assert_eq!(b[2][1], 6.0);
        let c = a.checked_mul(&b).unwrap();
        assert_eq!(c.as_slice(), &[14.0, 32.0, 32.0, 77.0]);
        assert!(a.checked_mul(&a).is_err());
    }

    #[test]
    fn test_add_sub_negate() {
        let a = Matrix::from_rows(&[&[1.0, 2.0], &[3.0, 4.0]]).unwrap();
        let b = a.checked_add(&a).unwrap();
        assert_eq!(b.as_slice(), &[2.0, 4.0, 6.0, 8.0]);
        let z = b.checked_sub(&a).unwrap().checked_sub(&a).unwrap();
        assert!(z.as_slice().iter().all(|&v| v == 0.0));
        let n = -a.clone();
        assert_eq!(n[1][0], -3.0);
        assert!(a.checked_add(&Matrix::new(1, 2)).is_err());
    }

    #[test]
    fn test_fill_diagonal_and_submatrix() {
        let mut m = Matrix::new(3, 4);
        m.fill(2.0);
        m.fill_diagonal(1.0);
        assert_eq!(m[2][2], 1.0);
        assert_eq!(m[2][3], 2.0);
        let s = m.submatrix(1, 2, 2, 2).unwrap();
        assert_eq!(s.as_slice(), &[1.0, 2.0, 2.0, 1.0]);
        assert!(m.submatrix(2, 2, 2, 2).is_err());
    }

    #[test]
    fn test_determinant() {
        let m = Matrix::from_rows(&[&[2.0, 0.0, 1.0], &[1.0, 3.0, 2.0], &[1.0, 1.0, 1.0]]).unwrap();
        // 2(3-2) - 0 + 1(1-3) = 0
        assert!((m.determinant().unwrap() - 0.0).abs() < 1e-12);
        let m = Matrix::from_rows(&[
            &[4.0, 3.0, 2.0, 1.0],
            &[0.0, 1.0, -1.0, 2.0],
            &[1.0, 0.0, 2.0, 0.0],
            &[0.0, 2.0, 0.0, 1.0],
        ])
        .unwrap();
        assert!((m.determinant().unwrap() - (-19.0)).abs() < 1e-12);
        assert!(Matrix::new(2, 3).determinant().is_err());
    }
}
