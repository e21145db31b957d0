/// Service construction from configuration
///
/// Both sides are currently backed by JSON library snapshots; the factory is
/// the single place that decides which implementation a `ServiceConfig` maps to.

use anyhow::{Context, Result};
use track_sync_config::ServiceConfig;

use crate::snapshot::{SnapshotCatalog, SnapshotLibrary};
use crate::traits::{SourceLibrary, TargetCatalog};

/// Build the source library described by `config`
pub async fn create_source_library(config: &ServiceConfig) -> Result<Box<dyn SourceLibrary>> {
    if !config.snapshot.exists() {
        anyhow::bail!(
            "{} snapshot not found at {}",
            config.name,
            config.snapshot.display()
        );
    }
    Ok(Box::new(SnapshotLibrary::new(&config.name, &config.snapshot)))
}

/// Build the target catalog described by `config`
pub async fn create_target_catalog(config: &ServiceConfig) -> Result<Box<dyn TargetCatalog>> {
    let catalog = SnapshotCatalog::open(&config.name, &config.snapshot)
        .await
        .with_context(|| format!("Failed to open {} catalog", config.name))?;
    Ok(Box::new(catalog))
}
