use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Get the container base path from environment variable, defaulting to "/app"
pub fn container_base_path() -> PathBuf {
    std::env::var("TRACKSYNC_BASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/app"))
}

pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("tracksync");

        Ok(Self {
            config_dir: base_dir.clone(),
            data_dir: base_dir.join("data"),
            log_dir: base_dir.join("sync_logs"),
        })
    }

    pub fn from_docker_env() -> Self {
        let base = container_base_path();
        Self {
            config_dir: base.clone(),
            data_dir: base.join("data"),
            log_dir: base.join("sync_logs"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        // The container base directory only exists inside the image
        let base = container_base_path();
        if base.exists() {
            return Self::from_docker_env();
        }

        Self::new().unwrap_or_else(|_| Self::from_docker_env())
    }
}

/// File name for a run's log, e.g. `sync_20260119_083000.log`
pub fn sync_log_file_name(started_at: DateTime<Utc>) -> String {
    format!("sync_{}.log", started_at.format("%Y%m%d_%H%M%S"))
}

/// Most recently modified `sync_*.log` in `log_dir`
pub fn find_latest_sync_log(log_dir: &Path) -> Result<PathBuf> {
    if !log_dir.exists() {
        return Err(anyhow::anyhow!("Log directory not found: {}", log_dir.display()));
    }

    let mut latest: Option<(std::time::SystemTime, PathBuf)> = None;
    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_sync_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|name| name.starts_with("sync_") && name.ends_with(".log"))
            .unwrap_or(false);
        if !is_sync_log || !path.is_file() {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        if latest.as_ref().map(|(t, _)| modified > *t).unwrap_or(true) {
            latest = Some((modified, path));
        }
    }

    latest
        .map(|(_, path)| path)
        .ok_or_else(|| anyhow::anyhow!("No log files found in {}", log_dir.display()))
}
