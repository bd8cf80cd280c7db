use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::catalog::ContentCatalog;
use crate::error::{JourneyError, JourneyResult};

/// Where a learner goes after finishing a module's run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Continuation {
    pub module_id: String,
    pub journey_version_id: String,
}

/// Finds the next module in a track.
pub struct ContinuationResolver {
    catalog: Arc<dyn ContentCatalog>,
}

impl ContinuationResolver {
    pub fn new(catalog: Arc<dyn ContentCatalog>) -> Self {
        Self { catalog }
    }

    /// The first module ordered strictly after `current_order_index`, if it has
    /// published content.
    ///
    /// A next module without a published version ends the chain: later
    /// modules are not reached by skipping over it.
    pub async fn resolve_next(
        &self,
        track_id: &str,
        current_order_index: i32,
    ) -> JourneyResult<Option<Continuation>> {
        let modules = self.catalog.modules_in_track(track_id).await?;
        let Some(next) = modules
            .into_iter()
            .find(|m| m.order_index > current_order_index)
        else {
            debug!(track_id, current_order_index, "end of track");
            return Ok(None);
        };

        match self.catalog.published_version(&next.id).await? {
            Some(version) => Ok(Some(Continuation {
                module_id: next.id,
                journey_version_id: version.id,
            })),
            None => {
                debug!(
                    track_id,
                    module_id = %next.id,
                    "next module has no published version; track ends here"
                );
                Ok(None)
            }
        }
    }

    /// [`resolve_next`](Self::resolve_next) for the module a run belongs to.
    pub async fn resolve_after_module(&self, module_id: &str) -> JourneyResult<Option<Continuation>> {
        let module = self
            .catalog
            .load_module(module_id)
            .await?
            .ok_or_else(|| JourneyError::ModuleNotFound(module_id.to_string()))?;
        self.resolve_next(&module.track_id, module.order_index).await
    }
}
