//! Integration tests for the scoring pipeline
//!
//! Covers normalization, top-K selection, similarity bounds, aggregation and
//! classification working together on realistic vectors.

use mems_common::{
    aggregate_by_song, classify, normalize, similarity, similarity_with_flags, summarize, top_k,
    Emotion, EmotionVector, MatchTier, ResponseRecord,
};

const EPS: f64 = 1e-9;

fn end_to_end_reference() -> EmotionVector {
    EmotionVector::from([
        (Emotion::Amusement, 0.9),
        (Emotion::Excitement, 0.7),
        (Emotion::Awe, 0.6),
        (Emotion::Anger, 0.1),
        (Emotion::Sadness, 0.0),
        (Emotion::Contentment, 0.05),
        (Emotion::Disgust, 0.0),
        (Emotion::Fear, 0.0),
    ])
}

fn end_to_end_observed(anger: f64) -> EmotionVector {
    EmotionVector::from([
        (Emotion::Amusement, 0.8),
        (Emotion::Excitement, 0.6),
        (Emotion::Awe, 0.5),
        (Emotion::Anger, anger),
        (Emotion::Sadness, 0.0),
        (Emotion::Contentment, 0.0),
        (Emotion::Disgust, 0.0),
        (Emotion::Fear, 0.0),
    ])
}

#[test]
fn test_normalization_is_idempotent() {
    let v = end_to_end_reference();
    let (once, norm) = normalize(&v);
    let (twice, unit_norm) = normalize(&once);

    assert!(norm > 0.0);
    assert!((unit_norm - 1.0).abs() < EPS);
    for emotion in Emotion::ALL {
        assert!((once.get(emotion) - twice.get(emotion)).abs() < EPS);
    }
}

#[test]
fn test_zero_vector_safety() {
    let (empty, norm) = normalize(&EmotionVector::new());
    assert!(empty.is_empty());
    assert_eq!(norm, 0.0);

    let zeros = EmotionVector::from([(Emotion::Anger, 0.0), (Emotion::Fear, 0.0)]);
    let (normalized, norm) = normalize(&zeros);
    assert_eq!(normalized, zeros);
    assert_eq!(norm, 0.0);
}

#[test]
fn test_top_k_tie_break_excludes_weaker() {
    let v = EmotionVector::from([
        (Emotion::Anger, 0.5),
        (Emotion::Fear, 0.5),
        (Emotion::Awe, 0.5),
        (Emotion::Sadness, 0.1),
    ]);
    let top = top_k(&v, 3);

    assert_eq!(top, vec![Emotion::Anger, Emotion::Fear, Emotion::Awe]);
    assert!(!top.contains(&Emotion::Sadness));
}

#[test]
fn test_scores_stay_within_bounds() {
    let samples = [
        end_to_end_reference(),
        end_to_end_observed(0.4),
        EmotionVector::from([(Emotion::Sadness, 1.0)]),
        EmotionVector::from([(Emotion::Fear, 0.3), (Emotion::Disgust, 0.9), (Emotion::Awe, 0.1)]),
        EmotionVector::from_dense([0.0; 8]),
        EmotionVector::from_dense([1.0; 8]),
    ];

    for reference in &samples {
        for observed in &samples {
            let result = similarity(reference, observed).expect("non-empty inputs");
            assert!(
                result.score >= -EPS && result.score <= 1.0 + EPS,
                "score {} out of bounds",
                result.score
            );
        }
    }
}

#[test]
fn test_end_to_end_scenario() {
    let reference = end_to_end_reference();
    let observed = end_to_end_observed(0.4);

    let result = similarity(&reference, &observed).unwrap();
    assert_eq!(
        result.top_emotions,
        vec![Emotion::Amusement, Emotion::Excitement, Emotion::Awe]
    );
    assert!(result.score > 0.99, "expected high match, got {}", result.score);
    assert_eq!(classify(result.score), MatchTier::Good);

    // Normalized anger (~0.337) stays below the weakest dominant reference
    // emotion (awe, ~0.464)
    let flagged = similarity_with_flags(&reference, &observed).unwrap();
    assert!(!flagged.has_anomaly());
    assert_eq!(flagged.similarity, result);
}

#[test]
fn test_end_to_end_strong_anger_is_flagged() {
    let reference = end_to_end_reference();
    let observed = end_to_end_observed(0.9);

    let flagged = similarity_with_flags(&reference, &observed).unwrap();
    assert!(flagged.has_anomaly());
    assert_eq!(flagged.flags.len(), 1);

    let flag = flagged.flags[0];
    assert_eq!(flag.emotion, Emotion::Anger);
    assert!(flag.observed > flag.threshold);
    assert!((flag.threshold - 0.6 / 1.6725_f64.sqrt()).abs() < 1e-9);
}

#[test]
fn test_aggregate_then_score_then_summarize() {
    let records = vec![
        ResponseRecord::new("songs/amusement/a.mp3", "u1", EmotionVector::from([(Emotion::Amusement, 0.2)]), 10.0),
        ResponseRecord::new("songs/amusement/a.mp3", "u1", EmotionVector::from([(Emotion::Amusement, 0.4)]), 12.0),
        ResponseRecord::new("songs/amusement/a.mp3", "u2", EmotionVector::from([(Emotion::Amusement, 0.6)]), 8.0),
        ResponseRecord::new("songs/fear/b.mp3", "u2", EmotionVector::from([(Emotion::Sadness, 0.9)]), 8.0),
    ];
    let aggregates = aggregate_by_song(&records);

    let a = &aggregates["songs/amusement/a.mp3"];
    assert!((a.mean.get(Emotion::Amusement) - 0.4).abs() < 1e-12);
    assert_eq!(a.user_count, 2);

    let reference_a = EmotionVector::from([(Emotion::Amusement, 1.0), (Emotion::Awe, 0.2), (Emotion::Fear, 0.1)]);
    let reference_b = EmotionVector::from([(Emotion::Fear, 1.0), (Emotion::Awe, 0.3), (Emotion::Anger, 0.2)]);

    let score_a = similarity(&reference_a, &a.mean).unwrap().score;
    let score_b = similarity(&reference_b, &aggregates["songs/fear/b.mp3"].mean).unwrap().score;

    let summary = summarize(&[score_a, score_b]);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.good, 1);
    assert_eq!(summary.poor, 1);
    assert_eq!(summary.good_rate, 50.0);
}
