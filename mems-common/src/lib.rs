//! # MEMS Common Library
//!
//! Emotion similarity core shared by all MEMS crates:
//! - Emotion key set and fixed-size emotion vectors
//! - L2 normalization and top-K selection
//! - Reference vs. audience similarity scoring with anomaly flags
//! - Per-song aggregation of listener responses
//! - Match tier classification and corpus summaries
//! - Dataset overview, per-emotion rankings and inter-rater agreement
//! - Configuration loading
//!
//! Everything here is in-memory and side-effect free apart from configuration
//! file reading; source loading lives in `mems-sa`.

pub mod aggregate;
pub mod agreement;
pub mod classify;
pub mod config;
pub mod emotion;
pub mod error;
pub mod normalize;
pub mod overview;
pub mod ranking;
pub mod records;
pub mod reference;
pub mod similarity;
pub mod top_k;

pub use aggregate::{aggregate_by_song, SongAggregate};
pub use classify::{classify, summarize, Assessment, MatchSummary, MatchThresholds, MatchTier};
pub use emotion::{Emotion, EmotionVector, EMOTION_COUNT};
pub use error::{Error, Result};
pub use normalize::normalize;
pub use records::{ResponseRecord, UserProfile};
pub use reference::ReferenceProfiles;
pub use similarity::{
    similarity, similarity_with_flags, AnomalyFlag, FlaggedSimilarity, ScoringMethod, Similarity,
    SimilarityScorer,
};
pub use top_k::top_k;
