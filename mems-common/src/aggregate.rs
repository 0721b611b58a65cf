//! Song Aggregator
//!
//! Reduces individual listener responses into one mean emotion vector per song.
//!
//! # Aggregation
//! For each song identifier:
//! - Mean per emotion: simple arithmetic mean over all records of the song,
//!   absent keys contributing `0.0` (no weighting by time spent)
//! - User count: distinct user identifiers among those records
//! - Response count: number of records
//!
//! Every song present in the input yields an aggregate; minimum-sample
//! filtering is left to the caller. Aggregates are recomputed from the records
//! on every call.

use crate::emotion::{EmotionVector, EMOTION_COUNT};
use crate::records::ResponseRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Per-song reduction of listener responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongAggregate {
    pub song_path: String,
    /// Mean intensity, all eight emotions present in canonical order
    pub mean: EmotionVector,
    /// Distinct contributing users
    pub user_count: usize,
    /// Contributing records (a user may rate a song more than once)
    pub response_count: usize,
}

#[derive(Default)]
struct SongAccumulator<'a> {
    sums: [f64; EMOTION_COUNT],
    responses: usize,
    users: HashSet<&'a str>,
}

/// Group records by song and compute mean vectors and user counts
pub fn aggregate_by_song(records: &[ResponseRecord]) -> BTreeMap<String, SongAggregate> {
    let mut accumulators: BTreeMap<&str, SongAccumulator<'_>> = BTreeMap::new();

    for record in records {
        let acc = accumulators.entry(record.song_path.as_str()).or_default();
        for (sum, value) in acc.sums.iter_mut().zip(record.emotions.to_dense()) {
            *sum += value;
        }
        acc.responses += 1;
        acc.users.insert(record.user_id.as_str());
    }

    debug!(
        record_count = records.len(),
        song_count = accumulators.len(),
        "Aggregated responses by song"
    );

    accumulators
        .into_iter()
        .map(|(song_path, acc)| {
            let count = acc.responses as f64;
            let means = acc.sums.map(|sum| sum / count);
            let aggregate = SongAggregate {
                song_path: song_path.to_string(),
                mean: EmotionVector::from_dense(means),
                user_count: acc.users.len(),
                response_count: acc.responses,
            };
            (song_path.to_string(), aggregate)
        })
        .collect()
}
