//! Symmetric matrix in packed lower-triangular storage.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::error::{Error, Result};

/// Symmetric `N × N` matrix storing only the lower triangle.
///
/// `get(i, j)` and `get(j, i)` address the same element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SymmetricMatrix {
    dimension: usize,
    data: Vec<f64>,
}

impl SymmetricMatrix {
    /// Zero-filled matrix of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: vec![0.0; dimension * (dimension + 1) / 2],
        }
    }

    /// Dimension `N`.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Change the dimension; every element is reset to zero.
    pub fn resize(&mut self, dimension: usize) {
        self.dimension = dimension;
        self.data.clear();
        self.data.resize(dimension * (dimension + 1) / 2, 0.0);
    }

    #[inline]
    fn offset(row: usize, column: usize) -> usize {
        let (r, c) = if row < column {
            (column, row)
        } else {
            (row, column)
        };
        r * (r + 1) / 2 + c
    }

    /// Element `(row, column)`.
    #[inline]
    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.data[Self::offset(row, column)]
    }

    /// Set element `(row, column)` (and its mirror).
    #[inline]
    pub fn set(&mut self, row: usize, column: usize, value: f64) {
        self.data[Self::offset(row, column)] = value;
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Set the diagonal to `value`.
    pub fn fill_diagonal(&mut self, value: f64) {
        for i in 0..self.dimension {
            self.set(i, i, value);
        }
    }

    /// LDLᵀ factorisation.
    ///
    /// Returns the unit lower-triangular factor `L` (row-major, full
    /// `N × N`) and the diagonal `D`. Fails when a pivot is not positive,
    /// i.e. the matrix is not positive definite.
    pub fn cholesky(&self) -> Result<(Vec<f64>, Vec<f64>)> {
        let n = self.dimension;
        if n == 0 || self.get(0, 0) == 0.0 {
            return Err(Error::SingularMatrix);
        }
        let mut lower = vec![0.0; n * n];
        let mut d = vec![0.0; n];

        d[0] = self.get(0, 0);
        lower[0] = 1.0;
        for i in 1..n {
            for j in 0..i {
                let mut tmp = self.get(i, j);
                for k in 0..j {
                    tmp -= lower[i * n + k] * lower[j * n + k] * d[k];
                }
                lower[i * n + j] = tmp / d[j];
            }

            d[i] = self.get(i, i);
            for j in 0..i {
                d[i] -= lower[i * n + j] * lower[i * n + j] * d[j];
            }
            if d[i] <= 0.0 {
                return Err(Error::SingularMatrix);
            }
            lower[i * n + i] = 1.0;
        }
        Ok((lower, d))
    }

    /// Inverse through the LDLᵀ factors: `A⁻¹ = L⁻ᵀ D⁻¹ L⁻¹`.
    pub fn invert(&self) -> Result<SymmetricMatrix> {
        let n = self.dimension;
        let (lower, d) = self.cholesky()?;

        // Inverse of the unit lower-triangular factor.
        let mut inv_lower = vec![0.0; n * n];
        for i in (0..n).rev() {
            inv_lower[i * n + i] = 1.0;
            for j in i + 1..n {
                let mut sum = lower[j * n + i];
                for k in i + 1..j {
                    sum += lower[j * n + k] * inv_lower[k * n + i];
                }
                inv_lower[j * n + i] = -sum;
            }
        }

        let mut inverse = SymmetricMatrix::new(n);
        for i in 0..n {
            for j in 0..=i {
                let mut sum = 0.0;
                for k in i..n {
                    sum += inv_lower[k * n + i] * inv_lower[k * n + j] / d[k];
                }
                inverse.set(i, j, sum);
            }
        }
        Ok(inverse)
    }

    /// Solve `A x = b` by forward and back substitution on the LDLᵀ factors.
    pub fn solve(&self, b: &[f64], x: &mut Vec<f64>) -> Result<()> {
        let n = self.dimension;
        if b.len() != n {
            return Err(Error::LengthMismatch {
                expected: n,
                actual: b.len(),
            });
        }
        let (lower, d) = self.cholesky()?;

        x.clear();
        x.extend_from_slice(b);
        for i in 0..n {
            for k in 0..i {
                x[i] -= lower[i * n + k] * x[k];
            }
        }
        for i in 0..n {
            x[i] /= d[i];
        }
        for i in (0..n).rev() {
            for k in i + 1..n {
                x[i] -= lower[k * n + i] * x[k];
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SymmetricMatrix {
        let mut a = SymmetricMatrix::new(3);
        let values = [[4.0, 2.0, 0.4], [2.0, 5.0, 1.0], [0.4, 1.0, 3.0]];
        for (i, row) in values.iter().enumerate() {
            for (j, &v) in row.iter().enumerate().take(i + 1) {
                a.set(i, j, v);
            }
        }
        a
    }

    #[test]
    fn test_mirrored_access() {
        let a = sample();
        assert_eq!(a.get(0, 2), a.get(2, 0));
        assert_eq!(a.get(1, 0), 2.0);
    }

    #[test]
    fn test_cholesky_reconstructs() {
        let a = sample();
        let (l, d) = a.cholesky().unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let mut v = 0.0;
                for k in 0..3 {
                    v += l[i * 3 + k] * d[k] * l[j * 3 + k];
                }
                assert!((v - a.get(i, j)).abs() < 1e-12, "({i},{j}) = {v}");
            }
        }
    }

    #[test]
    fn test_invert_identity_product() {
        let a = sample();
        let inv = a.invert().unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let v: f64 = (0..3).map(|k| a.get(i, k) * inv.get(k, j)).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((v - expected).abs() < 1e-12, "({i},{j}) = {v}");
            }
        }
    }

    #[test]
    fn test_solve() {
        let a = sample();
        let b = [1.0, -2.0, 0.5];
        let mut x = Vec::new();
        a.solve(&b, &mut x).unwrap();
        for i in 0..3 {
            let v: f64 = (0..3).map(|k| a.get(i, k) * x[k]).sum();
            assert!((v - b[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_not_positive_definite() {
        let mut a = SymmetricMatrix::new(2);
        a.set(0, 0, 1.0);
        a.set(1, 0, 2.0);
        a.set(1, 1, 1.0);
        assert_eq!(a.cholesky().unwrap_err(), Error::SingularMatrix);
    }
}
