//! Inter-rater agreement
//!
//! For songs rated by at least two distinct users, reports how much the
//! individual ratings spread around the audience mean and how far that mean is
//! from the authored profile.
//!
//! # Statistics
//! - Mean: arithmetic mean over the song's records (absent keys as 0)
//! - Std dev: sample standard deviation (n - 1 denominator), 0 for one record
//! - Reference difference: |mean - reference|, only when a profile exists

use crate::emotion::{Emotion, EmotionVector};
use crate::records::{reference_key, ResponseRecord};
use crate::reference::ReferenceProfiles;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Minimum distinct users for a song to be included
pub const MIN_AGREEMENT_USERS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionAgreement {
    pub emotion: Emotion,
    pub mean: f64,
    pub std_dev: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_diff: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongAgreement {
    pub song_path: String,
    pub song_name: String,
    pub user_count: usize,
    pub response_count: usize,
    pub has_reference: bool,
    /// One entry per emotion in canonical order
    pub emotions: Vec<EmotionAgreement>,
}

/// Agreement statistics for every song with at least two distinct raters
///
/// Sorted by user count descending, then song path.
pub fn inter_rater_agreement(
    records: &[ResponseRecord],
    references: &ReferenceProfiles,
) -> Vec<SongAgreement> {
    let mut by_song: BTreeMap<&str, Vec<&ResponseRecord>> = BTreeMap::new();
    for record in records {
        by_song.entry(record.song_path.as_str()).or_default().push(record);
    }

    let mut agreements: Vec<SongAgreement> = by_song
        .into_iter()
        .filter_map(|(song_path, song_records)| {
            let user_count = song_records
                .iter()
                .map(|r| r.user_id.as_str())
                .collect::<HashSet<_>>()
                .len();
            if user_count < MIN_AGREEMENT_USERS {
                return None;
            }

            let reference = references.for_song(song_path);
            let vectors: Vec<&EmotionVector> = song_records.iter().map(|r| &r.emotions).collect();

            Some(SongAgreement {
                song_path: song_path.to_string(),
                song_name: reference_key(song_path),
                user_count,
                response_count: song_records.len(),
                has_reference: reference.is_some(),
                emotions: Emotion::ALL
                    .iter()
                    .map(|&emotion| emotion_agreement(emotion, &vectors, reference))
                    .collect(),
            })
        })
        .collect();

    agreements.sort_by(|a, b| b.user_count.cmp(&a.user_count));
    agreements
}

fn emotion_agreement(
    emotion: Emotion,
    vectors: &[&EmotionVector],
    reference: Option<&EmotionVector>,
) -> EmotionAgreement {
    let values: Vec<f64> = vectors.iter().map(|v| v.get(emotion)).collect();
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;

    let std_dev = if values.len() < 2 {
        0.0
    } else {
        let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (sum_sq / (n - 1.0)).sqrt()
    };

    let reference_value = reference.map(|r| r.get(emotion));

    EmotionAgreement {
        emotion,
        mean,
        std_dev,
        reference: reference_value,
        reference_diff: reference_value.map(|r| (mean - r).abs()),
    }
}
