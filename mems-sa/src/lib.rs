//! mems-sa - Similarity Analysis
//!
//! Loads listener responses and authored reference profiles, runs them
//! through the `mems-common` scoring core and produces an analysis report.
//!
//! - `loaders`: JSON response document and CSV reference table parsing
//! - `cache`: process-wide read-through cache of parsed sources
//! - `analysis`: per-song similarity scoring and corpus summary
//! - `report`: report assembly, serialization and logging

pub mod analysis;
pub mod cache;
pub mod loaders;
pub mod report;

pub use analysis::{analyze, SimilarityAnalysis, SongSimilarity};
pub use loaders::{load_references, load_responses, ResponseDataset};
pub use report::{run_analysis, AnalysisReport};
