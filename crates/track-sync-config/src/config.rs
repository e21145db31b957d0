use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub source: ServiceConfig,
    pub target: ServiceConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub sync: SyncOptions,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where a service's library lives
///
/// `name` is used in logs and reports ("spotify", "qobuz"). `snapshot` points
/// at the JSON library snapshot the service is read from (and, for the target,
/// written back to).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceConfig {
    pub name: String,
    pub snapshot: PathBuf,
}

/// Weights and thresholds for the cross-catalog track scorer
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MatchingConfig {
    #[serde(default = "default_title_weight")]
    pub title_weight: f64,
    #[serde(default = "default_artist_weight")]
    pub artist_weight: f64,
    #[serde(default = "default_duration_weight")]
    pub duration_weight: f64,
    /// Minimum composite score (0-1) a candidate needs to be accepted
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    /// Candidates whose artist similarity is below this are discarded
    #[serde(default = "default_min_artist_similarity")]
    pub min_artist_similarity: f64,
    /// Duration difference still treated as the same recording
    #[serde(default = "default_duration_tolerance_ms")]
    pub duration_tolerance_ms: u64,
    /// Duration difference beyond which a candidate is discarded
    #[serde(default = "default_max_duration_delta_ms")]
    pub max_duration_delta_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SyncOptions {
    #[serde(default = "default_true")]
    pub dry_run: bool,
    #[serde(default = "default_true")]
    pub skip_existing: bool,
    #[serde(default)]
    pub update_existing: bool,
    /// Include the album in catalog searches (falls back to title + artist when nothing is found)
    #[serde(default = "default_true")]
    pub search_with_album: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Directory for per-run sync logs (defaults to the platform log directory)
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub file_logging: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} service name cannot be empty")]
    EmptyServiceName(&'static str),

    #[error("{0} snapshot path cannot be empty")]
    EmptySnapshotPath(&'static str),

    #[error("matching weights must be non-negative and sum to a positive value")]
    InvalidWeights,

    #[error("min_score must be in (0, 1], got {0}")]
    InvalidMinScore(f64),

    #[error("min_artist_similarity must be in [0, 1], got {0}")]
    InvalidMinArtistSimilarity(f64),

    #[error("duration_tolerance_ms ({tolerance}) cannot exceed max_duration_delta_ms ({max_delta})")]
    InvalidDurationWindow { tolerance: u64, max_delta: u64 },
}

fn default_true() -> bool {
    true
}

fn default_title_weight() -> f64 {
    0.5
}

fn default_artist_weight() -> f64 {
    0.35
}

fn default_duration_weight() -> f64 {
    0.15
}

fn default_min_score() -> f64 {
    0.75
}

fn default_min_artist_similarity() -> f64 {
    0.6
}

fn default_duration_tolerance_ms() -> u64 {
    3_000
}

fn default_max_duration_delta_ms() -> u64 {
    10_000
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            title_weight: default_title_weight(),
            artist_weight: default_artist_weight(),
            duration_weight: default_duration_weight(),
            min_score: default_min_score(),
            min_artist_similarity: default_min_artist_similarity(),
            duration_tolerance_ms: default_duration_tolerance_ms(),
            max_duration_delta_ms: default_max_duration_delta_ms(),
        }
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: true,
            skip_existing: true,
            update_existing: false,
            search_with_album: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            file_logging: true,
        }
    }
}

impl MatchingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [self.title_weight, self.artist_weight, self.duration_weight];
        if weights.iter().any(|w| *w < 0.0 || !w.is_finite()) || weights.iter().sum::<f64>() <= 0.0 {
            return Err(ConfigError::InvalidWeights);
        }
        if !(self.min_score > 0.0 && self.min_score <= 1.0) {
            return Err(ConfigError::InvalidMinScore(self.min_score));
        }
        if !(0.0..=1.0).contains(&self.min_artist_similarity) {
            return Err(ConfigError::InvalidMinArtistSimilarity(self.min_artist_similarity));
        }
        if self.duration_tolerance_ms > self.max_duration_delta_ms {
            return Err(ConfigError::InvalidDurationWindow {
                tolerance: self.duration_tolerance_ms,
                max_delta: self.max_duration_delta_ms,
            });
        }
        Ok(())
    }
}

impl ServiceConfig {
    fn validate(&self, role: &'static str) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyServiceName(role));
        }
        if self.snapshot.as_os_str().is_empty() {
            return Err(ConfigError::EmptySnapshotPath(role));
        }
        Ok(())
    }
}

impl Config {
    /// Starter configuration written by `tracksync config init`
    pub fn example(data_dir: &Path) -> Self {
        Self {
            source: ServiceConfig {
                name: "spotify".to_string(),
                snapshot: data_dir.join("spotify-library.json"),
            },
            target: ServiceConfig {
                name: "qobuz".to_string(),
                snapshot: data_dir.join("qobuz-catalog.json"),
            },
            matching: MatchingConfig::default(),
            sync: SyncOptions::default(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.source.validate("source")?;
        self.target.validate("target")?;
        self.matching.validate()
    }

    /// Log directory from config, falling back to the given default
    pub fn log_dir_or(&self, default: &Path) -> PathBuf {
        self.logging
            .dir
            .clone()
            .unwrap_or_else(|| default.to_path_buf())
    }
}
