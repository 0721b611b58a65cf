//! Dominant-emotion selection

use crate::emotion::{Emotion, EmotionVector};

/// Number of dominant emotions used by the similarity score
pub const DEFAULT_TOP_K: usize = 3;

/// The `k` emotions with the largest values, highest first
///
/// Ties keep the vector's insertion order (first-seen wins). Returns every
/// present emotion when the vector has fewer than `k` entries.
pub fn top_k(vector: &EmotionVector, k: usize) -> Vec<Emotion> {
    let mut entries: Vec<(Emotion, f64)> = vector.iter().collect();
    // Stable sort: equal values stay in insertion order
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries.into_iter().take(k).map(|(emotion, _)| emotion).collect()
}
