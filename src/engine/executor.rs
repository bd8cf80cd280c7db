//! Journey execution engine.
//!
//! One [`JourneyEngine`] serves every learner. Each operation takes the
//! caller's copy of the run, persists the transition through the
//! [`JourneyStore`] and only then writes the new state (with its fresh
//! revision) back into the caller's copy. A failed save leaves the caller's
//! run untouched, so the learner action can be retried from a reload.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::core::{JourneyEvent, RuntimeContext};
use crate::domain::execution::{
    BlockOutput, BlockStatus, RunProgress, RunStatus, StepOutcome, UserBlockState,
    UserJourneyRun,
};
use crate::domain::model::{Block, BlockContent};
use crate::error::{JourneyError, JourneyResult};
use crate::evaluator::FactTable;
use crate::graph::{JourneyGraph, Route};
use crate::store::{run_key, JourneyStore, StoreError};

use super::config::EngineConfig;

/// Metadata key holding the reason a run was abandoned.
pub const ABANDON_REASON_KEY: &str = "abandonReason";

pub struct JourneyEngine {
    store: Arc<dyn JourneyStore>,
    config: EngineConfig,
    context: RuntimeContext,
}

/// Builder for [`JourneyEngine`].
pub struct JourneyEngineBuilder {
    store: Arc<dyn JourneyStore>,
    config: EngineConfig,
    context: RuntimeContext,
}

impl JourneyEngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the clock, id generator and event channel.
    pub fn context(mut self, context: RuntimeContext) -> Self {
        self.context = context;
        self
    }

    pub fn build(self) -> JourneyEngine {
        JourneyEngine {
            store: self.store,
            config: self.config,
            context: self.context,
        }
    }
}

impl JourneyEngine {
    pub fn builder(store: Arc<dyn JourneyStore>) -> JourneyEngineBuilder {
        JourneyEngineBuilder {
            store,
            config: EngineConfig::default(),
            context: RuntimeContext::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn JourneyStore> {
        &self.store
    }

    pub async fn load_run(&self, run_id: &str) -> JourneyResult<UserJourneyRun> {
        self.store
            .load_run(run_id)
            .await?
            .ok_or_else(|| JourneyError::RunNotFound(run_id.to_string()))
    }

    /// Create a run for `user_id` on the graph's version and enter its start block.
    ///
    /// A graph whose start block does not exist is rejected before anything is
    /// persisted.
    pub async fn start_run(&self, user_id: &str, graph: &JourneyGraph) -> JourneyResult<UserJourneyRun> {
        if !graph.has_start_block() {
            warn!(
                version_id = graph.version_id(),
                start_block_id = graph.start_block_id(),
                "refusing to start run: start block missing"
            );
            return Err(JourneyError::MissingStartBlock(
                graph.start_block_id().to_string(),
            ));
        }

        let mut run = UserJourneyRun::new(
            self.context.next_id(),
            user_id,
            graph.version_id(),
            self.context.now(),
        );
        run.revision = self.store.create_run(&run).await?;
        info!(run_id = %run.id, user_id, version_id = graph.version_id(), "run created");

        let start = graph.start_block_id().to_string();
        self.enter(graph, &mut run, &start).await?;
        Ok(run)
    }

    /// Resume the learner's most recent unfinished run on this version, or start one.
    pub async fn start_or_resume(
        &self,
        user_id: &str,
        graph: &JourneyGraph,
    ) -> JourneyResult<UserJourneyRun> {
        match self
            .store
            .latest_active_run(user_id, graph.version_id())
            .await?
        {
            Some(mut run) => {
                debug!(run_id = %run.id, user_id, "resuming run");
                if run.current_block_id.is_none() {
                    // Created but never entered.
                    if !graph.has_start_block() {
                        return Err(JourneyError::MissingStartBlock(
                            graph.start_block_id().to_string(),
                        ));
                    }
                    let start = graph.start_block_id().to_string();
                    self.enter(graph, &mut run, &start).await?;
                }
                Ok(run)
            }
            None => self.start_run(user_id, graph).await,
        }
    }

    /// Make `block_id` the run's current block.
    ///
    /// First entry starts attempt 1. Re-entering a block the learner already
    /// finished (a retry loop) starts a new attempt. Entering the block the
    /// run is already on is a no-op.
    pub async fn enter(
        &self,
        graph: &JourneyGraph,
        run: &mut UserJourneyRun,
        block_id: &str,
    ) -> JourneyResult<UserBlockState> {
        check_version(graph, run)?;
        if run.status.is_terminal() {
            return Err(JourneyError::RunNotActive {
                run_id: run.id.clone(),
                status: run.status,
            });
        }
        graph.find_block(block_id)?;

        let existing = self.store.load_block_state(&run.id, block_id).await?;
        let already_here = run.status == RunStatus::InProgress
            && run.current_block_id.as_deref() == Some(block_id);
        if let Some(state) = &existing {
            if already_here && state.status == BlockStatus::InProgress {
                debug!(run_id = %run.id, block_id, "already in block");
                return Ok(state.clone());
            }
        }

        let now = self.context.now();
        let mut state = existing.unwrap_or_else(|| UserBlockState::new(&run.id, block_id));
        match state.status {
            BlockStatus::NotStarted => {
                state.status = BlockStatus::InProgress;
                state.attempts_count += 1;
            }
            BlockStatus::InProgress => {}
            BlockStatus::Completed | BlockStatus::Failed | BlockStatus::Skipped => {
                state.status = BlockStatus::InProgress;
                state.attempts_count += 1;
                state.completed_at = None;
            }
        }
        if state.started_at.is_none() {
            state.started_at = Some(now);
        }
        state.revision = self.store.save_block_state(&state).await?;

        let mut next = run.clone();
        next.current_block_id = Some(block_id.to_string());
        if next.status == RunStatus::NotStarted {
            next.status = RunStatus::InProgress;
            next.started_at = Some(now);
        }
        next.updated_at = now;
        next.revision = self.store.save_run(&next).await?;
        *run = next;

        info!(run_id = %run.id, block_id, attempt = state.attempts_count, "entered block");
        self.context.emit(JourneyEvent::BlockEntered {
            run_id: run.id.clone(),
            block_id: block_id.to_string(),
            attempt: state.attempts_count,
            timestamp: self.context.now_utc(),
        });
        Ok(state)
    }

    /// Record the learner's output for the current block and follow the first
    /// matching edge. Only the facts of this block are in scope for routing.
    pub async fn complete_block(
        &self,
        graph: &JourneyGraph,
        run: &mut UserJourneyRun,
        block_id: &str,
        output: BlockOutput,
    ) -> JourneyResult<StepOutcome> {
        let block = self.current_block(graph, run, block_id)?;
        self.ensure_latest(run).await?;

        let evaluation = block
            .content
            .fact_provider()
            .evaluate(&output, &self.config.scoring())
            .map_err(|e| JourneyError::InvalidOutput {
                block_id: block_id.to_string(),
                message: e.to_string(),
            })?;
        let status = if evaluation.passed == Some(false) {
            BlockStatus::Failed
        } else {
            BlockStatus::Completed
        };

        let now = self.context.now();
        let mut state = self.block_state_for_finish(run, block_id, now).await?;
        state.status = status;
        state.output_json = Some(output.payload);
        state.score = evaluation.score;
        state.weak_topics = evaluation.weak_topics;
        state.time_spent_seconds = if self.config.accumulate_time_spent {
            state
                .time_spent_seconds
                .saturating_add(output.time_spent_seconds)
        } else {
            output.time_spent_seconds
        };
        state.completed_at = Some(now);
        state.revision = self.store.save_block_state(&state).await?;

        info!(
            run_id = %run.id,
            block_id,
            status = %status,
            score = ?state.score,
            "block finished"
        );
        self.context.emit(JourneyEvent::BlockFinished {
            run_id: run.id.clone(),
            block_id: block_id.to_string(),
            status,
            score: state.score,
            timestamp: self.context.now_utc(),
        });

        self.advance(graph, run, block_id, &evaluation.facts, status)
            .await
    }

    /// Leave the current block without output. Routing sees only
    /// `<namespace>.skipped = true`.
    pub async fn skip_block(
        &self,
        graph: &JourneyGraph,
        run: &mut UserJourneyRun,
        block_id: &str,
    ) -> JourneyResult<StepOutcome> {
        let block = self.current_block(graph, run, block_id)?;
        self.ensure_latest(run).await?;
        let facts = block.content.fact_provider().skipped_facts();

        let now = self.context.now();
        let mut state = self.block_state_for_finish(run, block_id, now).await?;
        state.status = BlockStatus::Skipped;
        state.completed_at = Some(now);
        state.revision = self.store.save_block_state(&state).await?;

        info!(run_id = %run.id, block_id, "block skipped");
        self.context.emit(JourneyEvent::BlockFinished {
            run_id: run.id.clone(),
            block_id: block_id.to_string(),
            status: BlockStatus::Skipped,
            score: None,
            timestamp: self.context.now_utc(),
        });

        self.advance(graph, run, block_id, &facts, BlockStatus::Skipped)
            .await
    }

    /// Move an in-progress run to `abandoned`.
    pub async fn abandon(&self, run: &mut UserJourneyRun, reason: &str) -> JourneyResult<()> {
        if run.status != RunStatus::InProgress {
            return Err(JourneyError::RunNotActive {
                run_id: run.id.clone(),
                status: run.status,
            });
        }
        let mut next = run.clone();
        next.status = RunStatus::Abandoned;
        next.metadata
            .insert(ABANDON_REASON_KEY.to_string(), Value::String(reason.to_string()));
        next.updated_at = self.context.now();
        next.revision = self.store.save_run(&next).await?;
        *run = next;

        warn!(run_id = %run.id, reason, "run abandoned");
        self.context.emit(JourneyEvent::RunAbandoned {
            run_id: run.id.clone(),
            reason: reason.to_string(),
            timestamp: self.context.now_utc(),
        });
        Ok(())
    }

    /// Block-state counts for progress display.
    pub async fn progress(
        &self,
        graph: &JourneyGraph,
        run: &UserJourneyRun,
    ) -> JourneyResult<RunProgress> {
        check_version(graph, run)?;
        let states = self.store.block_states(&run.id).await?;
        let known: HashSet<&str> = graph.blocks().iter().map(|b| b.id.as_str()).collect();

        let mut progress = RunProgress {
            status: run.status,
            current_block_id: run.current_block_id.clone(),
            total_blocks: graph.blocks().len(),
            reachable_blocks: graph.reachable_from_start().len(),
            completed: 0,
            failed: 0,
            skipped: 0,
            in_progress: 0,
            time_spent_seconds: 0,
        };
        for state in states.iter().filter(|s| known.contains(s.block_id.as_str())) {
            match state.status {
                BlockStatus::Completed => progress.completed += 1,
                BlockStatus::Failed => progress.failed += 1,
                BlockStatus::Skipped => progress.skipped += 1,
                BlockStatus::InProgress => progress.in_progress += 1,
                BlockStatus::NotStarted => {}
            }
            progress.time_spent_seconds = progress
                .time_spent_seconds
                .saturating_add(state.time_spent_seconds);
        }
        Ok(progress)
    }

    /// Turn limit the UI should enforce for an AI-help block.
    pub fn ai_turn_limit(&self, block: &Block) -> Option<u32> {
        match &block.content {
            BlockContent::AiHelp(content) => {
                Some(content.max_turns.unwrap_or(self.config.ai_help.max_turns))
            }
            _ => None,
        }
    }

    fn current_block<'g>(
        &self,
        graph: &'g JourneyGraph,
        run: &UserJourneyRun,
        block_id: &str,
    ) -> JourneyResult<&'g Block> {
        check_version(graph, run)?;
        if run.status != RunStatus::InProgress {
            return Err(JourneyError::RunNotActive {
                run_id: run.id.clone(),
                status: run.status,
            });
        }
        if run.current_block_id.as_deref() != Some(block_id) {
            return Err(JourneyError::BlockNotCurrent {
                run_id: run.id.clone(),
                block_id: block_id.to_string(),
            });
        }
        graph.find_block(block_id)
    }

    /// Reject a stale copy of the run before anything is written for it.
    async fn ensure_latest(&self, run: &UserJourneyRun) -> JourneyResult<()> {
        let stored = self.load_run(&run.id).await?;
        if stored.revision != run.revision {
            return Err(StoreError::Conflict {
                key: run_key(&run.id),
                expected: run.revision,
                found: stored.revision,
            }
            .into());
        }
        Ok(())
    }

    async fn block_state_for_finish(
        &self,
        run: &UserJourneyRun,
        block_id: &str,
        now: i64,
    ) -> JourneyResult<UserBlockState> {
        Ok(match self.store.load_block_state(&run.id, block_id).await? {
            Some(state) => state,
            None => {
                // The current block always has a row once entered; tolerate
                // rows lost by an external cleanup.
                let mut state = UserBlockState::new(&run.id, block_id);
                state.attempts_count = 1;
                state.started_at = Some(now);
                state
            }
        })
    }

    async fn advance(
        &self,
        graph: &JourneyGraph,
        run: &mut UserJourneyRun,
        block_id: &str,
        facts: &FactTable,
        block_status: BlockStatus,
    ) -> JourneyResult<StepOutcome> {
        let target = match graph.route(block_id, facts) {
            Route::Follow(edge) => Some(edge.to.clone()),
            Route::DeadEnd => None,
        };

        match target {
            Some(to) if graph.get_block(&to).is_none() => {
                warn!(run_id = %run.id, from = block_id, edge_to = %to, "edge points at missing block");
                self.abandon(run, &format!("edge from '{}' points at missing block '{}'", block_id, to))
                    .await?;
                Err(JourneyError::DanglingEdge {
                    from: block_id.to_string(),
                    to,
                })
            }
            Some(to) => {
                debug!(run_id = %run.id, from = block_id, edge_to = %to, "edge selected");
                self.context.emit(JourneyEvent::EdgeSelected {
                    run_id: run.id.clone(),
                    from: block_id.to_string(),
                    to: to.clone(),
                    timestamp: self.context.now_utc(),
                });
                self.enter(graph, run, &to).await?;
                Ok(StepOutcome {
                    next: Some(to),
                    block_status,
                })
            }
            None => {
                let now = self.context.now();
                let mut next = run.clone();
                next.status = RunStatus::Completed;
                next.completed_at = Some(now);
                next.updated_at = now;
                next.revision = self.store.save_run(&next).await?;
                *run = next;

                info!(run_id = %run.id, last_block = block_id, "run completed");
                self.context.emit(JourneyEvent::RunCompleted {
                    run_id: run.id.clone(),
                    timestamp: self.context.now_utc(),
                });
                Ok(StepOutcome {
                    next: None,
                    block_status,
                })
            }
        }
    }
}

fn check_version(graph: &JourneyGraph, run: &UserJourneyRun) -> JourneyResult<()> {
    if run.journey_version_id != graph.version_id() {
        return Err(JourneyError::VersionMismatch {
            run_id: run.id.clone(),
            run_version: run.journey_version_id.clone(),
            graph_version: graph.version_id().to_string(),
        });
    }
    Ok(())
}
