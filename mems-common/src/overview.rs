//! Dataset overview metrics

use crate::records::{ResponseRecord, UserProfile};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Number of users who gave a given number of responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseCountBucket {
    pub responses: usize,
    pub users: usize,
}

/// Headline counts for a loaded dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub unique_users: usize,
    pub total_responses: usize,
    pub unique_songs: usize,
    /// Rounded to one decimal, 0 when there are no users
    pub mean_responses_per_user: f64,
    /// Users with at least one response
    pub active_users: usize,
    /// Ascending by response count
    pub responses_per_user: Vec<ResponseCountBucket>,
}

/// Compute overview metrics from registered users and usable records
///
/// `total_responses` and `unique_songs` count records that carry ratings;
/// per-user counts come from the registration data and include responses
/// without ratings.
pub fn dataset_overview(users: &[UserProfile], records: &[ResponseRecord]) -> DatasetOverview {
    let unique_users = users
        .iter()
        .map(|u| u.user_id.as_str())
        .collect::<HashSet<_>>()
        .len();
    let unique_songs = records
        .iter()
        .map(|r| r.song_path.as_str())
        .collect::<HashSet<_>>()
        .len();

    let mean_responses_per_user = if unique_users > 0 {
        (records.len() as f64 / unique_users as f64 * 10.0).round() / 10.0
    } else {
        0.0
    };

    let mut histogram: BTreeMap<usize, usize> = BTreeMap::new();
    for user in users {
        *histogram.entry(user.num_responses).or_insert(0) += 1;
    }

    DatasetOverview {
        unique_users,
        total_responses: records.len(),
        unique_songs,
        mean_responses_per_user,
        active_users: users.iter().filter(|u| u.num_responses > 0).count(),
        responses_per_user: histogram
            .into_iter()
            .map(|(responses, users)| ResponseCountBucket { responses, users })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::EmotionVector;

    fn user(id: &str, num_responses: usize) -> UserProfile {
        UserProfile {
            user_id: id.to_string(),
            gender: "N/A".to_string(),
            age: "N/A".to_string(),
            num_responses,
        }
    }

    #[test]
    fn test_overview_counts() {
        let users = vec![user("u1", 2), user("u2", 1), user("u3", 0)];
        let records = vec![
            ResponseRecord::new("songs/awe/a.mp3", "u1", EmotionVector::new(), 10.0),
            ResponseRecord::new("songs/awe/b.mp3", "u1", EmotionVector::new(), 10.0),
            ResponseRecord::new("songs/awe/a.mp3", "u2", EmotionVector::new(), 10.0),
        ];
        let overview = dataset_overview(&users, &records);

        assert_eq!(overview.unique_users, 3);
        assert_eq!(overview.total_responses, 3);
        assert_eq!(overview.unique_songs, 2);
        assert_eq!(overview.mean_responses_per_user, 1.0);
        assert_eq!(overview.active_users, 2);
        assert_eq!(
            overview.responses_per_user,
            vec![
                ResponseCountBucket { responses: 0, users: 1 },
                ResponseCountBucket { responses: 1, users: 1 },
                ResponseCountBucket { responses: 2, users: 1 },
            ]
        );
    }

    #[test]
    fn test_overview_empty() {
        let overview = dataset_overview(&[], &[]);
        assert_eq!(overview.unique_users, 0);
        assert_eq!(overview.mean_responses_per_user, 0.0);
        assert!(overview.responses_per_user.is_empty());
    }
}
