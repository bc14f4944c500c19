//! Matrix primitives used by the linear-system solvers and 2-D transforms.
//!
//! - [`Matrix`] - general `R × C` row-major storage
//! - [`Matrix2x2`] - the block type of the Toeplitz-plus-Hankel recursion
//! - [`SymmetricMatrix`] - packed lower triangle with LDLᵀ factorisation

mod block;
mod dense;
mod symmetric;

pub use block::Matrix2x2;
pub use dense::Matrix;
pub use symmetric::SymmetricMatrix;
