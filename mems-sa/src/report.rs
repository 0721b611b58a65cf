//! Analysis report assembly and output

use crate::analysis::{analyze, SimilarityAnalysis};
use crate::cache::SourceFingerprint;
use crate::loaders::{load_references, load_responses, ResponseDataset, REFERENCE_CACHE, RESPONSE_CACHE};
use chrono::{DateTime, Utc};
use mems_common::agreement::{inter_rater_agreement, SongAgreement};
use mems_common::config::{ScoringConfig, SourcesConfig};
use mems_common::overview::{dataset_overview, DatasetOverview};
use mems_common::ranking::{top_songs_by_emotion, EmotionRanking};
use mems_common::{aggregate_by_song, Assessment, Error, MatchTier, ReferenceProfiles, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Sources the report was computed from
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportSources {
    pub responses: Option<SourceFingerprint>,
    pub references: Option<SourceFingerprint>,
}

/// Everything computed for one dataset
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub sources: ReportSources,
    pub overview: DatasetOverview,
    pub similarity: SimilarityAnalysis,
    pub top_songs_by_emotion: Vec<EmotionRanking>,
    pub agreement: Vec<SongAgreement>,
}

impl AnalysisReport {
    /// Compute a report from already-loaded sources
    pub fn build(
        dataset: &ResponseDataset,
        references: &ReferenceProfiles,
        config: &ScoringConfig,
    ) -> Self {
        let aggregates = aggregate_by_song(&dataset.records);

        Self {
            generated_at: Utc::now(),
            sources: ReportSources::default(),
            overview: dataset_overview(&dataset.users, &dataset.records),
            similarity: analyze(&aggregates, references, config),
            top_songs_by_emotion: top_songs_by_emotion(&aggregates, config.report_limit),
            agreement: inter_rater_agreement(&dataset.records, references),
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.map_err(|e| Error::Internal(format!("Report serialization failed: {}", e)))
    }

    /// Human-readable summary through tracing
    pub fn log_summary(&self, limit: usize) {
        let overview = &self.overview;
        info!(
            "Dataset: {} users ({} active), {} responses, {} songs, {:.1} responses/user",
            overview.unique_users,
            overview.active_users,
            overview.total_responses,
            overview.unique_songs,
            overview.mean_responses_per_user
        );

        let similarity = &self.similarity;
        let summary = &similarity.summary;
        if summary.total == 0 {
            warn!("No songs matched a reference profile");
            return;
        }

        info!(
            "Similarity ({:?}, top {}): {} songs",
            similarity.method, similarity.top_k, summary.total
        );
        for tier in MatchTier::ALL {
            info!(
                "  {:<12} {:>4} ({:.1}%)",
                tier.label(),
                summary.count(tier),
                summary.rate(tier)
            );
        }

        match similarity.assessment {
            Assessment::Excellent => info!(
                "Excellent: {}/{} songs ({:.1}%) show a good match",
                summary.good, summary.total, summary.good_rate
            ),
            Assessment::Fair => info!(
                "Fair: {}/{} songs ({:.1}%) show a good match",
                summary.good, summary.total, summary.good_rate
            ),
            Assessment::Weak => warn!(
                "Only {}/{} songs ({:.1}%) show a good match",
                summary.good, summary.total, summary.good_rate
            ),
        }

        for song in similarity.best(limit) {
            info!(
                "  best  {:.3}  {} (users: {})",
                song.score, song.song_name, song.user_count
            );
        }
        for song in similarity.worst(limit) {
            info!(
                "  worst {:.3}  {} (users: {})",
                song.score, song.song_name, song.user_count
            );
        }

        let anomalous = similarity.anomalous().count();
        if anomalous > 0 {
            info!("{} songs perceived with off-profile emotions", anomalous);
        }
    }
}

/// Load both sources and build the report
///
/// A missing reference file is not fatal: the report is built with no
/// profiles and every song is recorded as unmatched.
pub async fn run_analysis(sources: &SourcesConfig, config: &ScoringConfig) -> Result<AnalysisReport> {
    let (dataset, references) = tokio::join!(
        load_responses(&sources.responses),
        load_references(&sources.references)
    );
    let dataset = dataset?;

    let references = match references {
        Ok(references) => references,
        Err(Error::NotFound(path)) => {
            warn!("Reference profiles not found: {} (similarity analysis will match no songs)", path);
            Arc::new(ReferenceProfiles::new())
        }
        Err(e) => return Err(e),
    };

    let mut report = AnalysisReport::build(&dataset, &references, config);
    let (responses, references) = tokio::join!(
        RESPONSE_CACHE.fingerprint(&sources.responses),
        REFERENCE_CACHE.fingerprint(&sources.references)
    );
    report.sources = ReportSources {
        responses,
        references,
    };

    Ok(report)
}
