//! Toeplitz-plus-Hankel linear systems.
//!
//! Solves `(T + H) x = b` for `x` of length `M + 1`, where
//! `T[i][j] = t[i - j + M]` and `H[i][j] = h[i + j]`, both given as
//! vectors of `2M + 1` coefficients.
//!
//! # Algorithm
//!
//! Block Levinson recursion on 2×2 blocks (Merchant-Parks). With the block
//! `R_k = [[t[M+k], h[M+k]], [h[M-k], t[M-k]]]` and `J(·)` the flip about
//! the anti-diagonal, each step `i = 1..=M` does:
//!
//! ```text
//! E  = Σ_{j<i} R_{i-j} X_j          e = Σ_{j<i} R_{i-j} p_j
//! B  = J(V)⁻¹ E
//! X_j -= J(X'_{i-j}) B   (1 ≤ j < i),   X_i = -B
//! V  -= J(E) B
//! g  = J(V)⁻¹ ([b_i, b_{M-i}] - e)
//! p_j += J(X_{i-j}) g    (j < i),       p_i = g
//! ```
//!
//! where `X'` are the blocks from the previous step. The solution is the
//! first coordinate of every `p_j`.
//!
//! # References
//!
//! - Merchant & Parks, "Efficient solution of a Toeplitz-plus-Hankel
//!   coefficient matrix system of equations", IEEE Trans. ASSP, 1982

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::error::{Result, ensure_length};
use crate::matrix::Matrix2x2;

/// Scratch for [`ToeplitzPlusHankelSolver`].
#[derive(Debug, Clone, Default)]
pub struct ToeplitzPlusHankelBuffer {
    r: Vec<Matrix2x2>,
    x: Vec<Matrix2x2>,
    prev_x: Vec<Matrix2x2>,
    p: Vec<[f64; 2]>,
}

/// Solver for `(T + H) x = b` of order `M`.
///
/// With `coefficients_modification` set, `t[M]` is added to the diagonal of
/// every even block and subtracted from the off-diagonal of every other
/// block starting at the parity of `M`. The cepstral analyses use this to
/// solve their Newton systems.
#[derive(Debug, Clone)]
pub struct ToeplitzPlusHankelSolver {
    num_order: usize,
    coefficients_modification: bool,
}

impl ToeplitzPlusHankelSolver {
    /// Solver of order `num_order`.
    pub fn new(num_order: usize, coefficients_modification: bool) -> Self {
        Self {
            num_order,
            coefficients_modification,
        }
    }

    /// Order `M`.
    pub fn num_order(&self) -> usize {
        self.num_order
    }

    /// Always `true`.
    pub fn is_valid(&self) -> bool {
        true
    }

    /// Solve for `solution` (resized to `M + 1`).
    ///
    /// Fails with [`Error::SingularMatrix`](crate::Error::SingularMatrix)
    /// when a pivot block falls below the determinant floor.
    pub fn run(
        &self,
        toeplitz: &[f64],
        hankel: &[f64],
        constant: &[f64],
        solution: &mut Vec<f64>,
        buffer: &mut ToeplitzPlusHankelBuffer,
    ) -> Result<()> {
        let order = self.num_order;
        let length = order + 1;
        ensure_length(toeplitz.len(), 2 * order + 1)?;
        ensure_length(hankel.len(), 2 * order + 1)?;
        ensure_length(constant.len(), length)?;

        let ToeplitzPlusHankelBuffer { r, x, prev_x, p } = buffer;
        r.clear();
        r.extend((0..length).map(|i| {
            Matrix2x2::new(
                toeplitz[order + i],
                hankel[order + i],
                hankel[order - i],
                toeplitz[order - i],
            )
        }));
        if self.coefficients_modification {
            let d0 = toeplitz[order];
            for block in r.iter_mut().step_by(2) {
                block.m[0][0] += d0;
                block.m[1][1] += d0;
            }
            let first = if order % 2 == 0 { 0 } else { 1 };
            for block in r.iter_mut().skip(first).step_by(2) {
                block.m[0][1] -= d0;
                block.m[1][0] -= d0;
            }
        }

        let bar = |i: usize| [constant[i], constant[order - i]];

        x.clear();
        x.resize(length, Matrix2x2::ZERO);
        prev_x.clear();
        prev_x.resize(length, Matrix2x2::ZERO);
        p.clear();
        p.resize(length, [0.0; 2]);

        x[0] = Matrix2x2::IDENTITY;
        p[0] = r[0].invert()?.apply(bar(0));
        let mut vx = r[0];

        for i in 1..length {
            let mut ex = Matrix2x2::ZERO;
            let mut ep = [0.0; 2];
            for j in 0..i {
                ex += r[i - j] * x[j];
                let v = r[i - j].apply(p[j]);
                ep[0] += v[0];
                ep[1] += v[1];
            }

            let bx = vx.cross_transpose().invert()? * ex;
            for j in 1..i {
                x[j] -= prev_x[i - j].cross_transpose() * bx;
            }
            x[i] = -bx;
            prev_x[1..=i].copy_from_slice(&x[1..=i]);

            vx -= ex.cross_transpose() * bx;

            let target = bar(i);
            let g = vx
                .cross_transpose()
                .invert()?
                .apply([target[0] - ep[0], target[1] - ep[1]]);
            for j in 0..i {
                let v = x[i - j].cross_transpose().apply(g);
                p[j][0] += v[0];
                p[j][1] += v[1];
            }
            p[i] = g;
        }

        solution.clear();
        solution.extend(p.iter().map(|v| v[0]));
        Ok(())
    }
}
