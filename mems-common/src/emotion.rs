//! Emotion key set and fixed-size emotion vectors
//!
//! The emotion vocabulary is closed: every rating and every reference profile
//! is expressed over the same eight emotions. Vectors are stored in a
//! fixed-size array indexed by [`Emotion`], so a misspelled key can never
//! introduce a ninth dimension.
//!
//! # Presence and Order
//! An [`EmotionVector`] remembers which keys were explicitly set and the order
//! they were first set in:
//! - Absent keys read as `0.0` through [`EmotionVector::get`]
//! - Iteration yields present entries in insertion order
//! - Re-inserting an existing key updates its value but keeps its position
//!
//! Insertion order matters for top-K selection, where ties are broken by the
//! first-seen entry.

use crate::{Error, Result};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of canonical emotions
pub const EMOTION_COUNT: usize = 8;

/// Canonical emotion categories
///
/// Declaration order is the canonical order used for dense vectors,
/// aggregated means and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Amusement,
    Anger,
    Sadness,
    Contentment,
    Disgust,
    Awe,
    Fear,
    Excitement,
}

impl Emotion {
    /// All emotions in canonical order
    pub const ALL: [Emotion; EMOTION_COUNT] = [
        Emotion::Amusement,
        Emotion::Anger,
        Emotion::Sadness,
        Emotion::Contentment,
        Emotion::Disgust,
        Emotion::Awe,
        Emotion::Fear,
        Emotion::Excitement,
    ];

    /// Position of this emotion in canonical order
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lower-case name as used in source data and reports
    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Amusement => "amusement",
            Emotion::Anger => "anger",
            Emotion::Sadness => "sadness",
            Emotion::Contentment => "contentment",
            Emotion::Disgust => "disgust",
            Emotion::Awe => "awe",
            Emotion::Fear => "fear",
            Emotion::Excitement => "excitement",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = Error;

    /// Parse an emotion name (trimmed, case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        Emotion::ALL
            .iter()
            .copied()
            .find(|e| e.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::InvalidInput(format!("Unknown emotion: '{}'", name)))
    }
}

/// Emotion intensities over the closed emotion set
///
/// Values are expected to be finite and non-negative; the vector itself does
/// not normalize or clamp on construction.
#[derive(Clone, Copy, Default)]
pub struct EmotionVector {
    values: [f64; EMOTION_COUNT],
    present: [bool; EMOTION_COUNT],
    /// Canonical indices of present keys in insertion order (first `len` valid)
    order: [u8; EMOTION_COUNT],
    len: u8,
}

impl EmotionVector {
    /// Create an empty vector (no keys present)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a vector with all eight keys present, in canonical order
    pub fn from_dense(values: [f64; EMOTION_COUNT]) -> Self {
        Emotion::ALL
            .iter()
            .map(|&e| (e, values[e.index()]))
            .collect()
    }

    /// Set the value for an emotion, returning the previous value if present
    ///
    /// A newly inserted key is appended to the iteration order; an existing key
    /// keeps its position.
    pub fn insert(&mut self, emotion: Emotion, value: f64) -> Option<f64> {
        let idx = emotion.index();
        let previous = self.value(emotion);
        if !self.present[idx] {
            self.present[idx] = true;
            self.order[self.len as usize] = idx as u8;
            self.len += 1;
        }
        self.values[idx] = value;
        previous
    }

    /// Value for an emotion, `0.0` when the key is absent
    pub fn get(&self, emotion: Emotion) -> f64 {
        self.value(emotion).unwrap_or(0.0)
    }

    /// Value for an emotion, `None` when the key is absent
    pub fn value(&self, emotion: Emotion) -> Option<f64> {
        let idx = emotion.index();
        self.present[idx].then_some(self.values[idx])
    }

    pub fn contains(&self, emotion: Emotion) -> bool {
        self.present[emotion.index()]
    }

    /// Number of present keys
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Present entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f64)> + '_ {
        self.order[..self.len as usize].iter().map(move |&idx| {
            let emotion = Emotion::ALL[idx as usize];
            (emotion, self.values[idx as usize])
        })
    }

    /// Present keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = Emotion> + '_ {
        self.iter().map(|(emotion, _)| emotion)
    }

    /// All eight values in canonical order, absent keys as `0.0`
    pub fn to_dense(&self) -> [f64; EMOTION_COUNT] {
        let mut dense = [0.0; EMOTION_COUNT];
        for (emotion, value) in self.iter() {
            dense[emotion.index()] = value;
        }
        dense
    }

    /// Apply `f` to every present value, keeping keys and order
    pub fn map_values(&self, mut f: impl FnMut(f64) -> f64) -> Self {
        let mut mapped = *self;
        for (emotion, value) in self.iter() {
            mapped.values[emotion.index()] = f(value);
        }
        mapped
    }

    /// Restrict to the given emotions, in the given order
    ///
    /// Emotions absent from `self` are present in the result with `0.0`.
    pub fn restrict(&self, emotions: &[Emotion]) -> Self {
        emotions.iter().map(|&e| (e, self.get(e))).collect()
    }

    /// Dot product over the given emotions (absent keys read as `0.0`)
    pub fn dot_over(&self, other: &EmotionVector, emotions: &[Emotion]) -> f64 {
        emotions.iter().map(|&e| self.get(e) * other.get(e)).sum()
    }
}

impl FromIterator<(Emotion, f64)> for EmotionVector {
    fn from_iter<I: IntoIterator<Item = (Emotion, f64)>>(iter: I) -> Self {
        let mut vector = EmotionVector::new();
        for (emotion, value) in iter {
            vector.insert(emotion, value);
        }
        vector
    }
}

impl<const N: usize> From<[(Emotion, f64); N]> for EmotionVector {
    fn from(entries: [(Emotion, f64); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// Equality over present keys and values; insertion order is ignored
impl PartialEq for EmotionVector {
    fn eq(&self, other: &Self) -> bool {
        self.present == other.present
            && Emotion::ALL
                .iter()
                .all(|&e| !self.contains(e) || self.get(e) == other.get(e))
    }
}

impl fmt::Debug for EmotionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter().map(|(e, v)| (e.as_str(), v))).finish()
    }
}

impl Serialize for EmotionVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (emotion, value) in self.iter() {
            map.serialize_entry(emotion.as_str(), &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EmotionVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EmotionVectorVisitor;

        impl<'de> Visitor<'de> for EmotionVectorVisitor {
            type Value = EmotionVector;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from emotion name to intensity")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
                let mut vector = EmotionVector::new();
                while let Some((name, value)) = access.next_entry::<String, f64>()? {
                    let emotion = name.parse::<Emotion>().map_err(serde::de::Error::custom)?;
                    vector.insert(emotion, value);
                }
                Ok(vector)
            }
        }

        deserializer.deserialize_map(EmotionVectorVisitor)
    }
}
