//! Match Classifier
//!
//! Buckets similarity scores into qualitative tiers and summarizes a corpus.
//!
//! # Tiers (default thresholds)
//! - Good: score ≥ 0.6
//! - Medium: 0.4 ≤ score < 0.6
//! - Poor: score < 0.4
//!
//! # Corpus Assessment
//! Derived from the share of Good matches:
//! - Excellent: ≥ 70%
//! - Fair: ≥ 50%
//! - Weak: below 50%

use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative match tier, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Good,
    Medium,
    Poor,
}

impl MatchTier {
    pub const ALL: [MatchTier; 3] = [MatchTier::Good, MatchTier::Medium, MatchTier::Poor];

    pub fn label(self) -> &'static str {
        match self {
            MatchTier::Good => "Good match",
            MatchTier::Medium => "Medium match",
            MatchTier::Poor => "Poor match",
        }
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn default_good_threshold() -> f64 {
    0.6
}

fn default_medium_threshold() -> f64 {
    0.4
}

/// Lower bounds (inclusive) of the Good and Medium tiers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchThresholds {
    #[serde(default = "default_good_threshold")]
    pub good: f64,
    #[serde(default = "default_medium_threshold")]
    pub medium: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            good: default_good_threshold(),
            medium: default_medium_threshold(),
        }
    }
}

impl MatchThresholds {
    /// Classify a score against these thresholds
    ///
    /// # Panics
    /// If `score` is NaN. Incomparable songs must be filtered out before
    /// classification.
    pub fn classify(&self, score: f64) -> MatchTier {
        assert!(!score.is_nan(), "cannot classify a NaN similarity score");

        if score >= self.good {
            MatchTier::Good
        } else if score >= self.medium {
            MatchTier::Medium
        } else {
            MatchTier::Poor
        }
    }

    /// Tier counts over a collection of scores
    pub fn summarize(&self, scores: &[f64]) -> MatchSummary {
        let mut summary = MatchSummary {
            total: scores.len(),
            ..MatchSummary::default()
        };

        for &score in scores {
            match self.classify(score) {
                MatchTier::Good => summary.good += 1,
                MatchTier::Medium => summary.medium += 1,
                MatchTier::Poor => summary.poor += 1,
            }
        }
        summary.good_rate = summary.rate(MatchTier::Good);

        summary
    }
}

/// Classify with default thresholds
pub fn classify(score: f64) -> MatchTier {
    MatchThresholds::default().classify(score)
}

/// Summarize with default thresholds
pub fn summarize(scores: &[f64]) -> MatchSummary {
    MatchThresholds::default().summarize(scores)
}

/// Corpus-level tier counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub total: usize,
    pub good: usize,
    pub medium: usize,
    pub poor: usize,
    /// Percentage of Good matches (0-100)
    pub good_rate: f64,
}

impl MatchSummary {
    pub fn count(&self, tier: MatchTier) -> usize {
        match tier {
            MatchTier::Good => self.good,
            MatchTier::Medium => self.medium,
            MatchTier::Poor => self.poor,
        }
    }

    /// Percentage of scores in a tier (0-100), 0 for an empty corpus
    pub fn rate(&self, tier: MatchTier) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count(tier) as f64 / self.total as f64 * 100.0
        }
    }

    pub fn assessment(&self) -> Assessment {
        Assessment::from_good_rate(self.good_rate)
    }
}

/// Overall verdict for a corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Assessment {
    Excellent,
    Fair,
    Weak,
}

impl Assessment {
    pub fn from_good_rate(good_rate: f64) -> Self {
        if good_rate >= 70.0 {
            Assessment::Excellent
        } else if good_rate >= 50.0 {
            Assessment::Fair
        } else {
            Assessment::Weak
        }
    }
}
