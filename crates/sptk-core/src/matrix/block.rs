//! Inline 2×2 matrix, the block type of the Merchant-Parks recursion.

use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use libm::fabs;

use crate::error::{Error, Result};

/// Smallest |det| accepted by [`Matrix2x2::invert`].
pub(crate) const MINIMUM_DETERMINANT: f64 = 1e-6;

/// A 2×2 matrix `[[a, b], [c, d]]` held by value.
///
/// The arithmetic operators take their operands by value and always write a
/// fresh result, so an output can never alias an input.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Matrix2x2 {
    /// Elements indexed `[row][column]`.
    pub m: [[f64; 2]; 2],
}

impl Matrix2x2 {
    /// All zeros.
    pub const ZERO: Self = Self { m: [[0.0; 2]; 2] };

    /// Identity.
    pub const IDENTITY: Self = Self {
        m: [[1.0, 0.0], [0.0, 1.0]],
    };

    /// `[[a, b], [c, d]]`.
    pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { m: [[a, b], [c, d]] }
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: f64) {
        self.m = [[value; 2]; 2];
    }

    /// Set both diagonal elements to `value`.
    pub fn fill_diagonal(&mut self, value: f64) {
        self.m[0][0] = value;
        self.m[1][1] = value;
    }

    /// Negate in place.
    pub fn negate(&mut self) {
        *self = -*self;
    }

    /// `ad - bc`.
    pub fn determinant(&self) -> f64 {
        self.m[0][0] * self.m[1][1] - self.m[0][1] * self.m[1][0]
    }

    /// Ordinary transpose.
    pub fn transpose(&self) -> Self {
        Self::new(self.m[0][0], self.m[1][0], self.m[0][1], self.m[1][1])
    }

    /// Flip about the anti-diagonal: `[[a, b], [c, d]] → [[d, c], [b, a]]`.
    pub fn cross_transpose(&self) -> Self {
        Self::new(self.m[1][1], self.m[1][0], self.m[0][1], self.m[0][0])
    }

    /// Inverse, or [`Error::SingularMatrix`] when `|det| < 1e-6`.
    pub fn invert(&self) -> Result<Self> {
        let det = self.determinant();
        if fabs(det) < MINIMUM_DETERMINANT {
            #[cfg(feature = "tracing")]
            tracing::debug!(determinant = det, "2x2 block below determinant floor");
            return Err(Error::SingularMatrix);
        }
        let inv = 1.0 / det;
        Ok(Self::new(
            self.m[1][1] * inv,
            -self.m[0][1] * inv,
            -self.m[1][0] * inv,
            self.m[0][0] * inv,
        ))
    }

    /// Matrix-vector product.
    #[inline]
    pub fn apply(&self, v: [f64; 2]) -> [f64; 2] {
        [
            self.m[0][0] * v[0] + self.m[0][1] * v[1],
            self.m[1][0] * v[0] + self.m[1][1] * v[1],
        ]
    }
}

impl Add for Matrix2x2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.m[0][0] + rhs.m[0][0],
            self.m[0][1] + rhs.m[0][1],
            self.m[1][0] + rhs.m[1][0],
            self.m[1][1] + rhs.m[1][1],
        )
    }
}

impl Sub for Matrix2x2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.m[0][0] - rhs.m[0][0],
            self.m[0][1] - rhs.m[0][1],
            self.m[1][0] - rhs.m[1][0],
            self.m[1][1] - rhs.m[1][1],
        )
    }
}

impl Mul for Matrix2x2 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let a = &self.m;
        let b = &rhs.m;
        Self::new(
            a[0][0] * b[0][0] + a[0][1] * b[1][0],
            a[0][0] * b[0][1] + a[0][1] * b[1][1],
            a[1][0] * b[0][0] + a[1][1] * b[1][0],
            a[1][0] * b[0][1] + a[1][1] * b[1][1],
        )
    }
}

impl Neg for Matrix2x2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.m[0][0], -self.m[0][1], -self.m[1][0], -self.m[1][1])
    }
}

impl AddAssign for Matrix2x2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Matrix2x2 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_transpose() {
        let a = Matrix2x2::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(a.cross_transpose(), Matrix2x2::new(4.0, 3.0, 2.0, 1.0));
        assert_eq!(a.cross_transpose().cross_transpose(), a);
        assert_ne!(a.cross_transpose(), a.transpose());
    }

    #[test]
    fn test_invert() {
        let a = Matrix2x2::new(4.0, 7.0, 2.0, 6.0);
        let inv = a.invert().unwrap();
        let id = a * inv;
        for r in 0..2 {
            for c in 0..2 {
                let expected = if r == c { 1.0 } else { 0.0 };
                assert!((id.m[r][c] - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_determinant_floor() {
        let nearly_singular = Matrix2x2::new(1.0, 1.0, 1.0, 1.0 + 1e-7);
        assert_eq!(nearly_singular.invert(), Err(Error::SingularMatrix));
        let above_floor = Matrix2x2::new(1.0, 1.0, 1.0, 1.0 + 2e-6);
        assert!(above_floor.invert().is_ok());
    }

    #[test]
    fn test_arithmetic() {
        let a = Matrix2x2::new(1.0, 2.0, 3.0, 4.0);
        let mut b = Matrix2x2::IDENTITY;
        b += a;
        assert_eq!(b, Matrix2x2::new(2.0, 2.0, 3.0, 5.0));
        b -= a;
        assert_eq!(b, Matrix2x2::IDENTITY);
        assert_eq!(a * Matrix2x2::IDENTITY, a);
        assert_eq!(a.apply([1.0, 1.0]), [3.0, 7.0]);
        let mut n = a;
        n.negate();
        assert_eq!(n + a, Matrix2x2::ZERO);
        n.fill(5.0);
        n.fill_diagonal(0.0);
        assert_eq!(n, Matrix2x2::new(0.0, 5.0, 5.0, 0.0));
    }
}
