//! Principal component scores (`pcas`).

use sptk_core::Matrix;
use sptk_core::error::{Error, Result, ensure_length};

/// Projection onto stored principal axes: `s = E (x - μ)`.
///
/// `E` holds one eigenvector per row, so `N` scores come out of each
/// `L`-dimensional input.
///
/// # Example
///
/// ```rust
/// use sptk_analysis::PrincipalComponentScores;
/// use sptk_core::Matrix;
///
/// let axes = Matrix::from_vec(2, 2, vec![0.0, 1.0, 1.0, 0.0]).unwrap();
/// let pcas = PrincipalComponentScores::new(vec![1.0, 2.0], axes).unwrap();
/// let mut scores = Vec::new();
/// pcas.run(&[3.0, 5.0], &mut scores).unwrap();
/// assert_eq!(scores, vec![3.0, 2.0]);
/// ```
#[derive(Debug, Clone)]
pub struct PrincipalComponentScores {
    mean: Vec<f64>,
    eigenvectors: Matrix,
}

impl PrincipalComponentScores {
    /// Pair a mean vector of length `L` with an `N × L` eigenvector matrix.
    ///
    /// Fails unless `1 ≤ N ≤ L` and the column count matches the mean.
    pub fn new(mean: Vec<f64>, eigenvectors: Matrix) -> Result<Self> {
        ensure_length(eigenvectors.num_columns(), mean.len())?;
        if eigenvectors.num_rows() == 0 || mean.len() < eigenvectors.num_rows() {
            return Err(Error::InvalidConfiguration);
        }
        Ok(Self { mean, eigenvectors })
    }

    /// Vector length `L`.
    pub fn vector_length(&self) -> usize {
        self.mean.len()
    }

    /// Number of principal components `N`.
    pub fn num_principal_components(&self) -> usize {
        self.eigenvectors.num_rows()
    }

    /// Mean vector `μ`.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Eigenvector matrix `E`.
    pub fn eigenvectors(&self) -> &Matrix {
        &self.eigenvectors
    }

    /// Project `input` (`L` values) into `scores` (`N` values).
    pub fn run(&self, input: &[f64], scores: &mut Vec<f64>) -> Result<()> {
        ensure_length(input.len(), self.mean.len())?;
        scores.clear();
        scores.extend((0..self.eigenvectors.num_rows()).map(|n| {
            self.eigenvectors[n]
                .iter()
                .zip(input.iter().zip(&self.mean))
                .map(|(e, (x, mu))| e * (x - mu))
                .sum::<f64>()
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_onto_rotated_axes() {
        let s = core::f64::consts::FRAC_1_SQRT_2;
        let axes = Matrix::from_vec(1, 3, vec![s, s, 0.0]).unwrap();
        let pcas = PrincipalComponentScores::new(vec![1.0, 1.0, 7.0], axes).unwrap();
        assert_eq!(pcas.num_principal_components(), 1);
        let mut scores = Vec::new();
        pcas.run(&[2.0, 2.0, -3.0], &mut scores).unwrap();
        assert!((scores[0] - 2.0 * s).abs() < 1e-12);
    }

    #[test]
    fn test_mean_maps_to_origin() {
        let axes = Matrix::from_vec(2, 2, vec![0.6, 0.8, -0.8, 0.6]).unwrap();
        let pcas = PrincipalComponentScores::new(vec![0.25, -4.0], axes).unwrap();
        let mut scores = Vec::new();
        pcas.run(&[0.25, -4.0], &mut scores).unwrap();
        assert_eq!(scores, vec![0.0, 0.0]);
    }

    #[test]
    fn test_rejects_mismatched_shapes() {
        let axes = Matrix::from_vec(1, 2, vec![1.0, 0.0]).unwrap();
        assert!(PrincipalComponentScores::new(vec![0.0; 3], axes.clone()).is_err());
        assert!(PrincipalComponentScores::new(vec![0.0; 2], Matrix::new(0, 2)).is_err());
        let pcas = PrincipalComponentScores::new(vec![0.0; 2], axes).unwrap();
        assert!(pcas.run(&[1.0], &mut Vec::new()).is_err());
    }
}
