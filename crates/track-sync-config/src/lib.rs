pub mod config;
pub mod paths;

pub use config::{Config, ConfigError, LoggingConfig, MatchingConfig, ServiceConfig, SyncOptions};
pub use paths::{PathManager, container_base_path, find_latest_sync_log, sync_log_file_name};
