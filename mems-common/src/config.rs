//! Configuration loading and resolution
//!
//! # Sources Priority
//! 1. Command-line argument (`--config`)
//! 2. Environment variable (`MEMS_CONFIG`)
//! 3. User config file (`<config dir>/mems/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A config file that does not exist degrades to compiled defaults with a
//! warning. A file that exists but cannot be read or parsed, or that fails
//! validation, is an error.
//!
//! # Example
//! ```toml
//! [sources]
//! responses = "data.json"
//! references = "song_emotions.csv"
//!
//! [scoring]
//! top_k = 3
//! method = "normalized_subspace"
//! min_users = 1
//! report_limit = 5
//!
//! [scoring.thresholds]
//! good = 0.6
//! medium = 0.4
//!
//! [logging]
//! level = "info"
//! ```

use crate::classify::MatchThresholds;
use crate::ranking::DEFAULT_RANKING_SIZE;
use crate::similarity::{ScoringMethod, SimilarityScorer};
use crate::top_k::DEFAULT_TOP_K;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "MEMS_CONFIG";

/// Root configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Locations of the listener response and reference profile files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_responses_path")]
    pub responses: PathBuf,

    #[serde(default = "default_references_path")]
    pub references: PathBuf,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            responses: default_responses_path(),
            references: default_references_path(),
        }
    }
}

/// Similarity scoring and report policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Dominant reference emotions compared per song
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default)]
    pub method: ScoringMethod,

    /// Songs rated by fewer distinct users are left out of the analysis
    #[serde(default = "default_min_users")]
    pub min_users: usize,

    /// Entries listed in best/worst and per-emotion rankings
    #[serde(default = "default_report_limit")]
    pub report_limit: usize,

    #[serde(default)]
    pub thresholds: MatchThresholds,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            method: ScoringMethod::default(),
            min_users: default_min_users(),
            report_limit: default_report_limit(),
            thresholds: MatchThresholds::default(),
        }
    }
}

impl ScoringConfig {
    /// Scorer configured with this policy's top-K and method
    pub fn scorer(&self) -> SimilarityScorer {
        SimilarityScorer::with_settings(self.top_k, self.method)
    }

    /// Reject settings that cannot produce a meaningful analysis
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::Config("scoring.top_k must be at least 1".to_string()));
        }

        let MatchThresholds { good, medium } = self.thresholds;
        if !good.is_finite() || !medium.is_finite() {
            return Err(Error::Config("scoring.thresholds must be finite".to_string()));
        }
        if medium < 0.0 || medium > good {
            return Err(Error::Config(format!(
                "scoring.thresholds must satisfy 0 <= medium <= good (medium={}, good={})",
                medium, good
            )));
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_responses_path() -> PathBuf {
    PathBuf::from("data.json")
}

fn default_references_path() -> PathBuf {
    PathBuf::from("song_emotions.csv")
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_min_users() -> usize {
    1
}

fn default_report_limit() -> usize {
    DEFAULT_RANKING_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Where the effective configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine,
    Environment,
    UserConfigFile,
    Defaults,
}

/// Outcome of configuration resolution
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: TomlConfig,
    pub source: ConfigSource,
    /// File that was read, if any
    pub path: Option<PathBuf>,
    /// Explicitly named file that did not exist (defaults were used instead)
    pub missing: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Report the resolution through tracing
    ///
    /// Separate from resolution so it can run after the subscriber, whose
    /// level comes from this config, is installed.
    pub fn log_summary(&self) {
        if let Some(missing) = &self.missing {
            warn!(
                "Config file not found: {} (using compiled defaults)",
                missing.display()
            );
        }
        match &self.path {
            Some(path) => info!(source = ?self.source, "Configuration loaded from {}", path.display()),
            None => info!(source = ?self.source, "Using compiled default configuration"),
        }
    }
}

/// Resolves the configuration file following the sources priority
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Resolve and load the effective configuration
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            return load_explicit(path, ConfigSource::CommandLine);
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return load_explicit(Path::new(&path), ConfigSource::Environment);
            }
        }

        // Priority 3: User config file (only if present)
        if let Some(path) = default_config_path() {
            if path.exists() {
                let config = load_toml_config(&path)?;
                return Ok(ResolvedConfig {
                    config,
                    source: ConfigSource::UserConfigFile,
                    path: Some(path),
                    missing: None,
                });
            }
        }

        // Priority 4: Compiled defaults
        Ok(ResolvedConfig {
            config: TomlConfig::default(),
            source: ConfigSource::Defaults,
            path: None,
            missing: None,
        })
    }
}

fn load_explicit(path: &Path, source: ConfigSource) -> Result<ResolvedConfig> {
    if !path.exists() {
        return Ok(ResolvedConfig {
            config: TomlConfig::default(),
            source: ConfigSource::Defaults,
            path: None,
            missing: Some(path.to_path_buf()),
        });
    }

    Ok(ResolvedConfig {
        config: load_toml_config(path)?,
        source,
        path: Some(path.to_path_buf()),
        missing: None,
    })
}

/// Default per-user config file location for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mems").join("config.toml"))
}

/// Read, parse and validate a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    parse_toml_config(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

/// Parse and validate TOML config content
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    let config: TomlConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
    config.scoring.validate()?;
    Ok(config)
}
