use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::domain::model::{JourneyVersion, Module, Track};

use super::{CatalogError, ContentCatalog};

#[derive(Default)]
pub struct MemoryContentCatalog {
    tracks: RwLock<HashMap<String, Track>>,
    modules: RwLock<HashMap<String, Module>>,
    versions: RwLock<HashMap<String, JourneyVersion>>,
}

impl MemoryContentCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentCatalog for MemoryContentCatalog {
    async fn save_track(&self, track: &Track) -> Result<(), CatalogError> {
        self.tracks.write().insert(track.id.clone(), track.clone());
        Ok(())
    }

    async fn load_track(&self, track_id: &str) -> Result<Option<Track>, CatalogError> {
        Ok(self.tracks.read().get(track_id).cloned())
    }

    async fn save_module(&self, module: &Module) -> Result<(), CatalogError> {
        self.modules.write().insert(module.id.clone(), module.clone());
        Ok(())
    }

    async fn load_module(&self, module_id: &str) -> Result<Option<Module>, CatalogError> {
        Ok(self.modules.read().get(module_id).cloned())
    }

    async fn modules_in_track(&self, track_id: &str) -> Result<Vec<Module>, CatalogError> {
        let mut modules: Vec<Module> = self
            .modules
            .read()
            .values()
            .filter(|m| m.track_id == track_id)
            .cloned()
            .collect();
        modules.sort_by(|a, b| a.order_index.cmp(&b.order_index).then_with(|| a.id.cmp(&b.id)));
        Ok(modules)
    }

    async fn save_version(&self, version: &JourneyVersion) -> Result<(), CatalogError> {
        self.versions
            .write()
            .insert(version.id.clone(), version.clone());
        Ok(())
    }

    async fn load_version(&self, version_id: &str) -> Result<Option<JourneyVersion>, CatalogError> {
        Ok(self.versions.read().get(version_id).cloned())
    }

    async fn versions_for_module(
        &self,
        module_id: &str,
    ) -> Result<Vec<JourneyVersion>, CatalogError> {
        let mut versions: Vec<JourneyVersion> = self
            .versions
            .read()
            .values()
            .filter(|v| v.module_id == module_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| a.version.cmp(&b.version).then_with(|| a.id.cmp(&b.id)));
        Ok(versions)
    }
}
