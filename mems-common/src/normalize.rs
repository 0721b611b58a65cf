//! L2 normalization of emotion vectors
//!
//! # Degenerate Inputs
//! - Empty vector: returns an empty vector and norm `0.0`
//! - All-zero vector: returns every present key mapped to `0.0` and norm `0.0`
//!
//! The norm is computed on values scaled by their maximum, so very large
//! finite intensities do not overflow to infinity.

use crate::emotion::EmotionVector;

/// L2-normalize a vector
///
/// Returns `(normalized, norm)` where each present value is divided by the
/// Euclidean norm of all present values. Never panics for finite input.
pub fn normalize(vector: &EmotionVector) -> (EmotionVector, f64) {
    if vector.is_empty() {
        return (EmotionVector::new(), 0.0);
    }

    let norm = l2_norm(vector);
    if norm == 0.0 {
        return (vector.map_values(|_| 0.0), 0.0);
    }

    (vector.map_values(|value| value / norm), norm)
}

/// Euclidean norm over present values
pub fn l2_norm(vector: &EmotionVector) -> f64 {
    let max = vector.iter().map(|(_, v)| v.abs()).fold(0.0_f64, f64::max);
    if max == 0.0 {
        return 0.0;
    }

    let scaled_sum: f64 = vector
        .iter()
        .map(|(_, v)| {
            let scaled = v / max;
            scaled * scaled
        })
        .sum();

    max * scaled_sum.sqrt()
}
