//! Similarity Scorer
//!
//! Compares a song's reference emotion profile with the audience's aggregated
//! perception, restricted to the reference's dominant emotions.
//!
//! # Normalized Subspace Score (default)
//! 1. L2-normalize reference and observed vectors
//! 2. Select the top-K emotions of the normalized reference
//! 3. Restrict both normalized vectors to those K emotions (absent = 0) and
//!    L2-normalize each restriction again
//! 4. Score = dot product of the two restricted unit vectors
//!
//! With non-negative inputs the score lies in [0, 1]: 1 means identical
//! relative proportions among the dominant emotions, 0 means the audience
//! reported none of them. The score is not clamped, so rounding may land a
//! hair outside the interval.
//!
//! # Raw Dot Score (alternative)
//! Top-K is taken on the raw reference and the score is the plain dot product
//! of raw reference and raw observed values over those K emotions. It depends
//! on absolute rating scales and is not bounded; it is kept selectable through
//! [`ScoringMethod::RawDot`] for comparison with older results.
//!
//! # Anomaly Flags
//! The threshold is the weakest of the top-K reference values (in the space the
//! method scores in). Every observed emotion outside the top-K whose value
//! exceeds that threshold is flagged, strongest first.
//!
//! # Incomparable Inputs
//! An empty reference or empty observed vector yields `None`, which is not the
//! same as a zero score.

use crate::emotion::{Emotion, EmotionVector};
use crate::normalize::normalize;
use crate::top_k::{top_k, DEFAULT_TOP_K};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Similarity formula selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    /// Dot product of re-normalized top-K restrictions, bounded in [0, 1]
    #[default]
    NormalizedSubspace,
    /// Dot product of raw values over the raw reference's top-K
    RawDot,
}

/// Score and the dominant reference emotions it was computed over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    pub score: f64,
    pub top_emotions: Vec<Emotion>,
}

/// An emotion the audience perceived more strongly than the weakest dominant
/// reference emotion, without it being dominant in the reference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyFlag {
    pub emotion: Emotion,
    /// Observed value (normalized under the default method)
    pub observed: f64,
    pub threshold: f64,
}

/// Similarity plus anomaly flags, strongest anomaly first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedSimilarity {
    pub similarity: Similarity,
    pub flags: Vec<AnomalyFlag>,
}

impl FlaggedSimilarity {
    pub fn has_anomaly(&self) -> bool {
        !self.flags.is_empty()
    }
}

/// Reference/observed pair mapped into the scoring space
struct ScoringSpace {
    reference: EmotionVector,
    observed: EmotionVector,
    top: Vec<Emotion>,
}

/// Configurable similarity scorer
///
/// The free functions [`similarity`] and [`similarity_with_flags`] use the
/// default scorer (top-3, normalized subspace).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarityScorer {
    top_k: usize,
    method: ScoringMethod,
}

impl SimilarityScorer {
    /// Create scorer with default settings (top-3, normalized subspace)
    pub fn new() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            method: ScoringMethod::NormalizedSubspace,
        }
    }

    /// Create scorer with custom dominant-emotion count and method
    pub fn with_settings(top_k: usize, method: ScoringMethod) -> Self {
        Self { top_k, method }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn method(&self) -> ScoringMethod {
        self.method
    }

    /// Basic score, `None` when either vector is empty
    pub fn score(&self, reference: &EmotionVector, observed: &EmotionVector) -> Option<Similarity> {
        let space = self.scoring_space(reference, observed)?;
        let score = self.dot(&space);

        Some(Similarity {
            score,
            top_emotions: space.top,
        })
    }

    /// Score plus anomaly flags, `None` when either vector is empty
    pub fn score_with_flags(
        &self,
        reference: &EmotionVector,
        observed: &EmotionVector,
    ) -> Option<FlaggedSimilarity> {
        let space = self.scoring_space(reference, observed)?;
        let score = self.dot(&space);

        let threshold = space
            .top
            .iter()
            .map(|&e| space.reference.get(e))
            .reduce(f64::min)
            .unwrap_or(0.0);

        let mut flags: Vec<AnomalyFlag> = space
            .observed
            .iter()
            .filter(|(emotion, value)| !space.top.contains(emotion) && *value > threshold)
            .map(|(emotion, observed)| AnomalyFlag {
                emotion,
                observed,
                threshold,
            })
            .collect();
        flags.sort_by(|a, b| b.observed.total_cmp(&a.observed));

        if !flags.is_empty() {
            debug!(
                score = score,
                threshold = threshold,
                flag_count = flags.len(),
                strongest = %flags[0].emotion,
                "Off-profile emotions flagged"
            );
        }

        Some(FlaggedSimilarity {
            similarity: Similarity {
                score,
                top_emotions: space.top,
            },
            flags,
        })
    }

    fn scoring_space(&self, reference: &EmotionVector, observed: &EmotionVector) -> Option<ScoringSpace> {
        if reference.is_empty() || observed.is_empty() {
            return None;
        }

        let (reference, observed) = match self.method {
            ScoringMethod::NormalizedSubspace => (normalize(reference).0, normalize(observed).0),
            ScoringMethod::RawDot => (*reference, *observed),
        };
        let top = top_k(&reference, self.top_k);

        Some(ScoringSpace {
            reference,
            observed,
            top,
        })
    }

    fn dot(&self, space: &ScoringSpace) -> f64 {
        match self.method {
            ScoringMethod::NormalizedSubspace => {
                let (reference_sub, _) = normalize(&space.reference.restrict(&space.top));
                let (observed_sub, _) = normalize(&space.observed.restrict(&space.top));
                reference_sub.dot_over(&observed_sub, &space.top)
            }
            ScoringMethod::RawDot => space.reference.dot_over(&space.observed, &space.top),
        }
    }
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalized top-3 subspace similarity
pub fn similarity(reference: &EmotionVector, observed: &EmotionVector) -> Option<Similarity> {
    SimilarityScorer::new().score(reference, observed)
}

/// Normalized top-3 subspace similarity with anomaly flags
pub fn similarity_with_flags(
    reference: &EmotionVector,
    observed: &EmotionVector,
) -> Option<FlaggedSimilarity> {
    SimilarityScorer::new().score_with_flags(reference, observed)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn reference_profile() -> EmotionVector {
        EmotionVector::from([
            (Emotion::Amusement, 0.9),
            (Emotion::Excitement, 0.7),
            (Emotion::Awe, 0.6),
            (Emotion::Anger, 0.1),
        ])
    }

    #[test]
    fn test_empty_inputs_are_incomparable() {
        let v = reference_profile();
        assert!(similarity(&EmotionVector::new(), &v).is_none());
        assert!(similarity(&v, &EmotionVector::new()).is_none());
        assert!(similarity_with_flags(&EmotionVector::new(), &v).is_none());
    }

    #[test]
    fn test_self_similarity_is_one() {
        let v = reference_profile();
        let result = similarity(&v, &v).unwrap();
        assert!((result.score - 1.0).abs() < EPS, "got {}", result.score);
        assert_eq!(
            result.top_emotions,
            vec![Emotion::Amusement, Emotion::Excitement, Emotion::Awe]
        );
    }

    #[test]
    fn test_scale_invariance() {
        let v = reference_profile();
        let scaled = v.map_values(|x| x * 7.5);
        let result = similarity(&v, &scaled).unwrap();
        assert!((result.score - 1.0).abs() < EPS);
    }

    #[test]
    fn test_disjoint_observed_scores_zero() {
        let observed = EmotionVector::from([(Emotion::Sadness, 0.8), (Emotion::Fear, 0.3)]);
        let result = similarity(&reference_profile(), &observed).unwrap();
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_zero_reference_scores_zero() {
        let reference = EmotionVector::from([(Emotion::Anger, 0.0), (Emotion::Fear, 0.0)]);
        let observed = EmotionVector::from([(Emotion::Anger, 0.5)]);
        let result = similarity(&reference, &observed).unwrap();
        assert_eq!(result.score, 0.0);
        assert_eq!(result.top_emotions, vec![Emotion::Anger, Emotion::Fear]);
    }

    #[test]
    fn test_partial_overlap_between_bounds() {
        let observed = EmotionVector::from([(Emotion::Amusement, 0.9), (Emotion::Sadness, 0.9)]);
        let result = similarity(&reference_profile(), &observed).unwrap();
        assert!(result.score > 0.0 && result.score < 1.0);
    }

    #[test]
    fn test_flags_sorted_strongest_first() {
        let observed = EmotionVector::from([
            (Emotion::Amusement, 0.2),
            (Emotion::Excitement, 0.2),
            (Emotion::Awe, 0.2),
            (Emotion::Fear, 0.6),
            (Emotion::Sadness, 0.9),
        ]);
        let result = similarity_with_flags(&reference_profile(), &observed).unwrap();

        assert!(result.has_anomaly());
        let flagged: Vec<Emotion> = result.flags.iter().map(|f| f.emotion).collect();
        assert_eq!(flagged, vec![Emotion::Sadness, Emotion::Fear]);
        assert!(result.flags[0].observed > result.flags[1].observed);
        assert!(result.flags.iter().all(|f| f.observed > f.threshold));
    }

    #[test]
    fn test_no_flags_when_profile_matches() {
        let v = reference_profile();
        let result = similarity_with_flags(&v, &v).unwrap();
        assert!(!result.has_anomaly());
        assert!(result.flags.is_empty());
    }

    #[test]
    fn test_flag_threshold_is_weakest_dominant_reference_value() {
        let reference = EmotionVector::from([
            (Emotion::Amusement, 3.0),
            (Emotion::Excitement, 0.0),
            (Emotion::Awe, 4.0),
            (Emotion::Anger, 0.0),
        ]);
        let observed = EmotionVector::from([(Emotion::Anger, 1.0)]);
        let result = similarity_with_flags(&reference, &observed).unwrap();

        // Normalized reference: awe 0.8, amusement 0.6, excitement 0.0
        assert_eq!(
            result.similarity.top_emotions,
            vec![Emotion::Awe, Emotion::Amusement, Emotion::Excitement]
        );
        assert_eq!(result.flags.len(), 1);
        assert_eq!(result.flags[0].threshold, 0.0);
        assert_eq!(result.flags[0].emotion, Emotion::Anger);
    }

    #[test]
    fn test_raw_dot_uses_unnormalized_values() {
        let scorer = SimilarityScorer::with_settings(3, ScoringMethod::RawDot);
        let reference = EmotionVector::from([
            (Emotion::Amusement, 0.5),
            (Emotion::Awe, 0.4),
            (Emotion::Fear, 0.2),
            (Emotion::Anger, 0.1),
        ]);
        let observed = EmotionVector::from([(Emotion::Amusement, 1.0), (Emotion::Awe, 0.5)]);

        let result = scorer.score(&reference, &observed).unwrap();
        // 0.5*1.0 + 0.4*0.5 + 0.2*0.0
        assert!((result.score - 0.7).abs() < EPS);
    }

    #[test]
    fn test_custom_top_k() {
        let scorer = SimilarityScorer::with_settings(1, ScoringMethod::NormalizedSubspace);
        let result = scorer.score(&reference_profile(), &reference_profile()).unwrap();
        assert_eq!(result.top_emotions, vec![Emotion::Amusement]);
        assert!((result.score - 1.0).abs() < EPS);
    }
}
