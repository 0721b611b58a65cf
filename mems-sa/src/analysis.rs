//! Similarity analysis over a listening corpus
//!
//! Joins per-song aggregates with reference profiles and scores each matched
//! song:
//! 1. Songs rated by fewer than `min_users` distinct users are left out
//! 2. Songs without a reference profile are recorded as unmatched
//! 3. Matched songs are scored with anomaly flags and classified
//! 4. Scores are summarized into tier counts and an overall assessment
//!
//! Results are sorted by score, best first (ties by song path).

use mems_common::config::ScoringConfig;
use mems_common::records::reference_key;
use mems_common::{
    AnomalyFlag, Assessment, Emotion, MatchSummary, MatchThresholds, MatchTier, ReferenceProfiles,
    ScoringMethod, SongAggregate,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Scored song
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongSimilarity {
    pub song_path: String,
    pub song_name: String,
    pub user_count: usize,
    pub response_count: usize,
    pub score: f64,
    pub top_emotions: Vec<Emotion>,
    pub tier: MatchTier,
    pub flags: Vec<AnomalyFlag>,
}

impl SongSimilarity {
    pub fn has_anomaly(&self) -> bool {
        !self.flags.is_empty()
    }
}

/// Corpus-level similarity results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityAnalysis {
    pub method: ScoringMethod,
    pub top_k: usize,
    pub thresholds: MatchThresholds,
    /// Best first
    pub songs: Vec<SongSimilarity>,
    pub summary: MatchSummary,
    pub assessment: Assessment,
    /// Songs without a reference profile
    pub unmatched: Vec<String>,
    /// Songs left out for having fewer than `min_users` raters
    pub below_min_users: usize,
}

impl SimilarityAnalysis {
    /// Up to `n` best-scoring songs, best first
    pub fn best(&self, n: usize) -> &[SongSimilarity] {
        &self.songs[..n.min(self.songs.len())]
    }

    /// Up to `n` worst-scoring songs, in the same (descending) order
    pub fn worst(&self, n: usize) -> &[SongSimilarity] {
        &self.songs[self.songs.len().saturating_sub(n)..]
    }

    /// Songs with at least one off-profile emotion flagged
    pub fn anomalous(&self) -> impl Iterator<Item = &SongSimilarity> {
        self.songs.iter().filter(|s| s.has_anomaly())
    }
}

/// Score every aggregated song that has a reference profile
pub fn analyze(
    aggregates: &BTreeMap<String, SongAggregate>,
    references: &ReferenceProfiles,
    config: &ScoringConfig,
) -> SimilarityAnalysis {
    let scorer = config.scorer();
    let mut songs = Vec::new();
    let mut unmatched = Vec::new();
    let mut below_min_users = 0usize;

    for (song_path, aggregate) in aggregates {
        if aggregate.user_count < config.min_users {
            below_min_users += 1;
            continue;
        }

        let Some(reference) = references.for_song(song_path) else {
            debug!(song = %song_path, "No reference profile, skipping");
            unmatched.push(song_path.clone());
            continue;
        };

        let Some(result) = scorer.score_with_flags(reference, &aggregate.mean) else {
            debug!(song = %song_path, "Empty reference profile, skipping");
            unmatched.push(song_path.clone());
            continue;
        };

        songs.push(SongSimilarity {
            song_path: song_path.clone(),
            song_name: reference_key(song_path),
            user_count: aggregate.user_count,
            response_count: aggregate.response_count,
            score: result.similarity.score,
            top_emotions: result.similarity.top_emotions,
            tier: config.thresholds.classify(result.similarity.score),
            flags: result.flags,
        });
    }

    songs.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.song_path.cmp(&b.song_path))
    });

    let scores: Vec<f64> = songs.iter().map(|s| s.score).collect();
    let summary = config.thresholds.summarize(&scores);

    info!(
        scored = songs.len(),
        unmatched = unmatched.len(),
        below_min_users,
        good = summary.good,
        medium = summary.medium,
        poor = summary.poor,
        "Similarity analysis complete"
    );

    SimilarityAnalysis {
        method: scorer.method(),
        top_k: scorer.top_k(),
        thresholds: config.thresholds,
        songs,
        summary,
        assessment: summary.assessment(),
        unmatched,
        below_min_users,
    }
}
