//! Per-emotion song rankings by audience mean

use crate::aggregate::SongAggregate;
use crate::emotion::Emotion;
use crate::records::reference_key;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default number of songs listed per emotion
pub const DEFAULT_RANKING_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSong {
    pub song_path: String,
    pub song_name: String,
    pub user_count: usize,
    /// Audience mean for the ranked emotion
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionRanking {
    pub emotion: Emotion,
    pub songs: Vec<RankedSong>,
}

/// The `n` songs with the highest audience mean for each emotion
///
/// One ranking per emotion in canonical order; ties keep song path order.
pub fn top_songs_by_emotion(
    aggregates: &BTreeMap<String, SongAggregate>,
    n: usize,
) -> Vec<EmotionRanking> {
    Emotion::ALL
        .iter()
        .map(|&emotion| {
            let mut songs: Vec<&SongAggregate> = aggregates.values().collect();
            songs.sort_by(|a, b| b.mean.get(emotion).total_cmp(&a.mean.get(emotion)));

            EmotionRanking {
                emotion,
                songs: songs
                    .into_iter()
                    .take(n)
                    .map(|song| RankedSong {
                        song_path: song.song_path.clone(),
                        song_name: reference_key(&song.song_path),
                        user_count: song.user_count,
                        value: song.mean.get(emotion),
                    })
                    .collect(),
            }
        })
        .collect()
}
