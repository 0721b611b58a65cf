//! Listener response records and song path helpers

use crate::emotion::EmotionVector;
use serde::{Deserialize, Serialize};

/// Placeholder for an intended emotion that cannot be derived from the path
pub const UNKNOWN_INTENDED_EMOTION: &str = "unknown";

/// One listener's rating of one song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Song identifier as recorded by the client (relative path)
    pub song_path: String,
    pub user_id: String,
    pub emotions: EmotionVector,
    pub time_spent_secs: f64,
    /// Emotion category the song was presented under
    pub intended_emotion: String,
}

impl ResponseRecord {
    /// Build a record, deriving the intended emotion from the song path
    pub fn new(
        song_path: impl Into<String>,
        user_id: impl Into<String>,
        emotions: EmotionVector,
        time_spent_secs: f64,
    ) -> Self {
        let song_path = song_path.into();
        let intended_emotion = intended_emotion(&song_path);
        Self {
            song_path,
            user_id: user_id.into(),
            emotions,
            time_spent_secs,
            intended_emotion,
        }
    }
}

/// Listener profile as registered, including listeners with no responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub gender: String,
    pub age: String,
    pub num_responses: usize,
}

/// Intended emotion encoded in a song path (`songs/<emotion>/<file>`)
///
/// Returns the second `/`-separated segment, or `"unknown"` when the path has
/// a single segment.
pub fn intended_emotion(song_path: &str) -> String {
    song_path
        .split('/')
        .nth(1)
        .unwrap_or(UNKNOWN_INTENDED_EMOTION)
        .to_string()
}

/// Key used to match a song against reference profiles
///
/// Backslashes are treated as path separators and only the last segment (the
/// file name, case as authored) is kept.
pub fn reference_key(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    normalized
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}
