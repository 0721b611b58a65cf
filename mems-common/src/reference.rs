//! Reference (authored) emotion profiles

use crate::emotion::EmotionVector;
use crate::records::reference_key;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Read-only table of authored emotion profiles keyed by file name
///
/// Keys are normalized with [`reference_key`] on insertion, so profiles can be
/// registered by any path form and looked up by a listener's song path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceProfiles {
    profiles: HashMap<String, EmotionVector>,
}

impl ReferenceProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a profile, replacing any profile with the same file name
    pub fn insert(&mut self, path: &str, profile: EmotionVector) -> Option<EmotionVector> {
        self.profiles.insert(reference_key(path), profile)
    }

    /// Profile for a song path (only the file name is compared)
    pub fn for_song(&self, song_path: &str) -> Option<&EmotionVector> {
        self.profiles.get(&reference_key(song_path))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EmotionVector)> {
        self.profiles.iter().map(|(key, profile)| (key.as_str(), profile))
    }
}

impl<S: AsRef<str>> FromIterator<(S, EmotionVector)> for ReferenceProfiles {
    fn from_iter<I: IntoIterator<Item = (S, EmotionVector)>>(iter: I) -> Self {
        let mut profiles = ReferenceProfiles::new();
        for (path, profile) in iter {
            profiles.insert(path.as_ref(), profile);
        }
        profiles
    }
}
