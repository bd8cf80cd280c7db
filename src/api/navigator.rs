//! Track-level navigation.
//!
//! [`TrackNavigator`] is the caller the engine expects: it loads graphs for
//! published versions, drives the engine for one learner action and, when a
//! run completes, asks the [`ContinuationResolver`] where the track goes next.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::catalog::ContentCatalog;
use crate::domain::execution::{BlockOutput, StepOutcome, UserJourneyRun};
use crate::domain::model::Block;
use crate::engine::{ContinuationResolver, JourneyEngine};
use crate::error::{JourneyError, JourneyResult};
use crate::graph::JourneyGraph;

/// What the UI should show after a learner action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavigationOutcome {
    /// Render this block of the same run.
    NextBlock { block_id: String },
    /// The module is done; continue in the next module with this run.
    #[serde(rename_all = "camelCase")]
    ModuleHandoff {
        module_id: String,
        journey_version_id: String,
        run: UserJourneyRun,
    },
    /// Show the track-completion screen.
    TrackFinished,
}

pub struct TrackNavigator {
    engine: Arc<JourneyEngine>,
    catalog: Arc<dyn ContentCatalog>,
    resolver: ContinuationResolver,
    /// Published and archived versions never change, so built graphs are cached by version id.
    graphs: RwLock<HashMap<String, Arc<JourneyGraph>>>,
}

impl TrackNavigator {
    pub fn new(engine: Arc<JourneyEngine>, catalog: Arc<dyn ContentCatalog>) -> Self {
        Self {
            engine,
            resolver: ContinuationResolver::new(catalog.clone()),
            catalog,
            graphs: RwLock::new(HashMap::new()),
        }
    }

    pub fn engine(&self) -> &JourneyEngine {
        &self.engine
    }

    /// Start or resume the learner's run on the module's published version.
    ///
    /// The module must belong to a known track, since completion hands off
    /// along that track.
    pub async fn begin(&self, user_id: &str, module_id: &str) -> JourneyResult<UserJourneyRun> {
        let module = self
            .catalog
            .load_module(module_id)
            .await?
            .ok_or_else(|| JourneyError::ModuleNotFound(module_id.to_string()))?;
        if self.catalog.load_track(&module.track_id).await?.is_none() {
            return Err(JourneyError::TrackNotFound(module.track_id));
        }
        let version = self
            .catalog
            .published_version(module_id)
            .await?
            .ok_or_else(|| JourneyError::NoPublishedVersion(module_id.to_string()))?;
        let graph = self.graph(&version.id).await?;
        self.engine.start_or_resume(user_id, &graph).await
    }

    pub async fn complete_block(
        &self,
        run: &mut UserJourneyRun,
        block_id: &str,
        output: BlockOutput,
    ) -> JourneyResult<NavigationOutcome> {
        let graph = self.graph(&run.journey_version_id).await?;
        let outcome = self
            .engine
            .complete_block(&graph, run, block_id, output)
            .await?;
        self.follow(run, outcome).await
    }

    pub async fn skip_block(
        &self,
        run: &mut UserJourneyRun,
        block_id: &str,
    ) -> JourneyResult<NavigationOutcome> {
        let graph = self.graph(&run.journey_version_id).await?;
        let outcome = self.engine.skip_block(&graph, run, block_id).await?;
        self.follow(run, outcome).await
    }

    /// The block the run is currently on.
    pub async fn current_block(&self, run: &UserJourneyRun) -> JourneyResult<Option<Block>> {
        let graph = self.graph(&run.journey_version_id).await?;
        Ok(run
            .current_block_id
            .as_deref()
            .and_then(|id| graph.get_block(id))
            .cloned())
    }

    /// Built graph for a journey version, cached.
    pub async fn graph(&self, version_id: &str) -> JourneyResult<Arc<JourneyGraph>> {
        let cached = self.graphs.read().get(version_id).cloned();
        if let Some(graph) = cached {
            return Ok(graph);
        }
        let version = self
            .catalog
            .load_version(version_id)
            .await?
            .ok_or_else(|| JourneyError::VersionNotFound(version_id.to_string()))?;
        let graph = Arc::new(JourneyGraph::from_version(&version)?);
        // Drafts can still change; only frozen versions are cached.
        if !version.is_editable() {
            self.graphs
                .write()
                .insert(version_id.to_string(), graph.clone());
        }
        Ok(graph)
    }

    async fn follow(
        &self,
        run: &UserJourneyRun,
        outcome: StepOutcome,
    ) -> JourneyResult<NavigationOutcome> {
        if let Some(block_id) = outcome.next {
            return Ok(NavigationOutcome::NextBlock { block_id });
        }

        let version = self
            .catalog
            .load_version(&run.journey_version_id)
            .await?
            .ok_or_else(|| JourneyError::VersionNotFound(run.journey_version_id.clone()))?;
        match self.resolver.resolve_after_module(&version.module_id).await? {
            Some(next) => {
                let graph = self.graph(&next.journey_version_id).await?;
                let next_run = self.engine.start_or_resume(&run.user_id, &graph).await?;
                info!(
                    user_id = %run.user_id,
                    from_module = %version.module_id,
                    to_module = %next.module_id,
                    run_id = %next_run.id,
                    "module handoff"
                );
                Ok(NavigationOutcome::ModuleHandoff {
                    module_id: next.module_id,
                    journey_version_id: next.journey_version_id,
                    run: next_run,
                })
            }
            None => {
                info!(user_id = %run.user_id, module_id = %version.module_id, "track finished");
                Ok(NavigationOutcome::TrackFinished)
            }
        }
    }
}
