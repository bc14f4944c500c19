//! All-pass frequency warping of cepstral sequences.
//!
//! - [`FrequencyTransform`] - first-order all-pass, closed-form recursion
//! - [`SecondOrderAllPassFrequencyTransform`] /
//!   [`SecondOrderAllPassInverseFrequencyTransform`] - two-parameter
//!   all-pass, precomputed conversion matrix

mod frequency;
mod second_order;

pub use frequency::{FrequencyTransform, FrequencyTransformBuffer};
pub use second_order::{
    SecondOrderAllPassFrequencyTransform, SecondOrderAllPassInverseFrequencyTransform, phase_warp,
    phase_warp_derivative,
};

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Copy `input` into `output`, zero-padding or truncating to
/// `output_length`.
pub(crate) fn copy_resized(input: &[f64], output: &mut Vec<f64>, output_length: usize) {
    output.clear();
    let n = input.len().min(output_length);
    output.extend_from_slice(&input[..n]);
    output.resize(output_length, 0.0);
}
