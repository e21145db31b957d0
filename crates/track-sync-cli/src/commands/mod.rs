use chrono::Utc;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::{Path, PathBuf};
use track_sync_config::{sync_log_file_name, Config, PathManager};
use track_sync_sources::{create_source_library, create_target_catalog, SourceLibrary, TargetCatalog};

pub mod config;
pub mod favorites;
pub mod playlists;
pub mod retry;
mod summary;
pub mod sync_ui;

/// Config file in use: `--config` when given, else the platform default
pub fn config_file_path(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => PathManager::default().config_file(),
    }
}

/// Load and validate the configuration
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let config_file = config_file_path(explicit);
    if !config_file.exists() {
        return Err(eyre!(
            "Configuration file not found at {}. Run 'tracksync config init' to create one.",
            config_file.display()
        ));
    }

    let config = Config::load_from_file(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    config
        .validate()
        .map_err(|e| eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;
    Ok(config)
}

/// Directory the per-run sync logs are written to
pub fn log_dir(config: Option<&Config>) -> PathBuf {
    let paths = PathManager::default();
    match config {
        Some(config) => config.log_dir_or(paths.log_dir()),
        None => paths.log_dir().to_path_buf(),
    }
}

/// The log file of the current sync run
pub struct RunLog {
    pub path: PathBuf,
}

impl RunLog {
    /// `None` when file logging is disabled or the config cannot be read
    /// (the command reports the config problem itself)
    pub fn for_config(explicit: Option<&Path>) -> Option<Self> {
        let config = Config::load_from_file(&config_file_path(explicit)).ok()?;
        if !config.logging.file_logging {
            return None;
        }
        let path = log_dir(Some(&config)).join(sync_log_file_name(Utc::now()));
        Some(Self { path })
    }
}

/// Source library and target catalog built from the config
pub struct Services {
    pub source: Box<dyn SourceLibrary>,
    pub target: Box<dyn TargetCatalog>,
}

pub async fn connect(config: &Config) -> Result<Services> {
    let source = create_source_library(&config.source)
        .await
        .map_err(|e| eyre!("Failed to open source library: {:#}", e))?;
    let target = create_target_catalog(&config.target)
        .await
        .map_err(|e| eyre!("Failed to open target catalog: {:#}", e))?;
    tracing::debug!(
        source = source.service_name(),
        target = target.service_name(),
        "Services ready"
    );
    Ok(Services { source, target })
}
