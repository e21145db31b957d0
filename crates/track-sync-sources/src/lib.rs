pub mod traits;
pub mod error;
pub mod factory;
pub mod progress;
pub mod snapshot;

pub use traits::{SourceLibrary, TargetCatalog};
pub use error::SourceError;
pub use factory::{create_source_library, create_target_catalog};
pub use progress::ProgressTracker;
pub use snapshot::{SnapshotCatalog, SnapshotLibrary};
