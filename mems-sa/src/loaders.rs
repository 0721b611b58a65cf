//! Source loaders
//!
//! Parses the two external sources into core records:
//! - Listener responses: JSON document exported by the listening app
//! - Reference profiles: CSV table of authored emotion intensities per song
//!
//! # Response Document
//! ```json
//! {"userData": {"<user id>": {
//!     "gender": "F", "age": 31,
//!     "emotionResponses": [
//!         {"song": "songs/awe/Track01.mp3",
//!          "emotionValues": {"awe": 0.8, "fear": 0.1},
//!          "timeSpentSeconds": 42}
//!     ]}}}
//! ```
//! - Responses without `emotionValues` are skipped but still counted in the
//!   user's response total
//! - Emotion names outside the canonical set are dropped with a warning
//!
//! # Reference Table
//! Header row with a `filename` column plus any of the eight emotion columns.
//! Values are inserted in [`REFERENCE_COLUMN_ORDER`] whatever the header's
//! column order; that order is the tie-break order for dominant-emotion
//! selection. Empty cells are left absent. Values must be finite and
//! non-negative.

use crate::cache::SourceCache;
use mems_common::{Emotion, EmotionVector, Error, ReferenceProfiles, ResponseRecord, Result, UserProfile};
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name of the reference table column holding the song file name
pub const FILENAME_COLUMN: &str = "filename";

/// Insertion order of reference profile values
pub const REFERENCE_COLUMN_ORDER: [Emotion; 8] = [
    Emotion::Amusement,
    Emotion::Anger,
    Emotion::Awe,
    Emotion::Contentment,
    Emotion::Disgust,
    Emotion::Excitement,
    Emotion::Fear,
    Emotion::Sadness,
];

/// Parsed listener responses
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseDataset {
    pub users: Vec<UserProfile>,
    pub records: Vec<ResponseRecord>,
}

/// Cache of parsed response documents
pub static RESPONSE_CACHE: Lazy<SourceCache<ResponseDataset>> =
    Lazy::new(|| SourceCache::new("responses"));

/// Cache of parsed reference tables
pub static REFERENCE_CACHE: Lazy<SourceCache<ReferenceProfiles>> =
    Lazy::new(|| SourceCache::new("references"));

/// Load listener responses through the process-wide cache
pub async fn load_responses(path: &Path) -> Result<Arc<ResponseDataset>> {
    RESPONSE_CACHE.get_or_load(path, parse_responses).await
}

/// Load reference profiles through the process-wide cache
pub async fn load_references(path: &Path) -> Result<Arc<ReferenceProfiles>> {
    REFERENCE_CACHE.get_or_load(path, parse_references).await
}

// ============================================================================
// Response document
// ============================================================================

#[derive(Deserialize)]
struct RawDocument {
    #[serde(rename = "userData", default)]
    user_data: BTreeMap<String, RawUser>,
}

#[derive(Deserialize)]
struct RawUser {
    #[serde(default)]
    gender: Option<Value>,
    #[serde(default)]
    age: Option<Value>,
    #[serde(rename = "emotionResponses", default)]
    emotion_responses: Vec<RawResponse>,
}

#[derive(Deserialize)]
struct RawResponse {
    song: String,
    #[serde(rename = "emotionValues", default)]
    emotion_values: Option<BTreeMap<String, f64>>,
    #[serde(rename = "timeSpentSeconds", default)]
    time_spent_seconds: f64,
}

/// Parse a response document
pub fn parse_responses(bytes: &[u8]) -> Result<ResponseDataset> {
    let document: RawDocument = serde_json::from_slice(bytes)
        .map_err(|e| Error::Parse(format!("Response document: {}", e)))?;

    let mut dataset = ResponseDataset::default();
    let mut skipped = 0usize;

    for (user_id, user) in document.user_data {
        dataset.users.push(UserProfile {
            user_id: user_id.clone(),
            gender: profile_field(user.gender),
            age: profile_field(user.age),
            num_responses: user.emotion_responses.len(),
        });

        for response in user.emotion_responses {
            let Some(values) = response.emotion_values else {
                skipped += 1;
                continue;
            };

            let mut emotions = EmotionVector::new();
            for (name, value) in values {
                match name.parse::<Emotion>() {
                    Ok(emotion) => {
                        emotions.insert(emotion, value);
                    }
                    Err(_) => warn!(
                        user = %user_id,
                        song = %response.song,
                        "Ignoring unknown emotion '{}'",
                        name
                    ),
                }
            }

            dataset.records.push(ResponseRecord::new(
                response.song,
                user_id.clone(),
                emotions,
                response.time_spent_seconds,
            ));
        }
    }

    debug!(
        users = dataset.users.len(),
        records = dataset.records.len(),
        skipped_without_values = skipped,
        "Parsed response document"
    );

    Ok(dataset)
}

/// Free-form profile value rendered as text, "N/A" when missing
fn profile_field(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => "N/A".to_string(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

// ============================================================================
// Reference table
// ============================================================================

/// Parse a reference profile table
pub fn parse_references(bytes: &[u8]) -> Result<ReferenceProfiles> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| Error::Parse(format!("Reference table header: {}", e)))?
        .clone();

    let filename_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(FILENAME_COLUMN))
        .ok_or_else(|| Error::Parse(format!("Reference table has no '{}' column", FILENAME_COLUMN)))?;

    let mut emotion_columns: Vec<(usize, Emotion)> = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| name.parse::<Emotion>().ok().map(|e| (idx, e)))
        .collect();
    emotion_columns.sort_by_key(|&(_, emotion)| column_rank(emotion));

    if emotion_columns.is_empty() {
        warn!("Reference table has no emotion columns; all profiles will be empty");
    }

    let mut profiles = ReferenceProfiles::new();
    for (row_idx, row) in reader.records().enumerate() {
        // Header is line 1
        let line = row_idx + 2;
        let row = row.map_err(|e| Error::Parse(format!("Reference table line {}: {}", line, e)))?;

        let filename = row.get(filename_idx).unwrap_or_default();
        if filename.is_empty() {
            warn!(line, "Skipping reference row without file name");
            continue;
        }

        let mut profile = EmotionVector::new();
        for &(idx, emotion) in &emotion_columns {
            let cell = row.get(idx).unwrap_or_default();
            if cell.is_empty() {
                continue;
            }
            let value = match cell.parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 0.0 => value,
                _ => {
                    return Err(Error::Parse(format!(
                        "Reference table line {}: invalid {} value '{}' (expected a finite non-negative number)",
                        line, emotion, cell
                    )))
                }
            };
            profile.insert(emotion, value);
        }

        if profiles.insert(filename, profile).is_some() {
            warn!(line, filename, "Duplicate reference profile replaces earlier row");
        }
    }

    info!(profiles = profiles.len(), "Parsed reference table");
    Ok(profiles)
}

fn column_rank(emotion: Emotion) -> usize {
    REFERENCE_COLUMN_ORDER
        .iter()
        .position(|&e| e == emotion)
        .unwrap_or(REFERENCE_COLUMN_ORDER.len())
}
