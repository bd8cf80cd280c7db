//! Track / module / journey-version catalogue and the version lifecycle.

mod memory;
mod publish;

use async_trait::async_trait;

use crate::domain::model::{JourneyVersion, Module, Track};

pub use memory::MemoryContentCatalog;
pub use publish::{archive_version, create_draft, publish_version};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[async_trait]
pub trait ContentCatalog: Send + Sync {
    async fn save_track(&self, track: &Track) -> Result<(), CatalogError>;
    async fn load_track(&self, track_id: &str) -> Result<Option<Track>, CatalogError>;

    async fn save_module(&self, module: &Module) -> Result<(), CatalogError>;
    async fn load_module(&self, module_id: &str) -> Result<Option<Module>, CatalogError>;
    /// Modules of a track ordered by `order_index`, then id.
    async fn modules_in_track(&self, track_id: &str) -> Result<Vec<Module>, CatalogError>;

    async fn save_version(&self, version: &JourneyVersion) -> Result<(), CatalogError>;
    async fn load_version(&self, version_id: &str) -> Result<Option<JourneyVersion>, CatalogError>;
    /// Versions of a module ordered by version number.
    async fn versions_for_module(&self, module_id: &str)
        -> Result<Vec<JourneyVersion>, CatalogError>;

    /// The published version of a module, if any.
    async fn published_version(
        &self,
        module_id: &str,
    ) -> Result<Option<JourneyVersion>, CatalogError> {
        Ok(self
            .versions_for_module(module_id)
            .await?
            .into_iter()
            .rev()
            .find(|v| v.is_published()))
    }
}
