use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};

use crate::domain::execution::{UserBlockState, UserJourneyRun};

use super::{block_state_key, check_revision, run_key, JourneyStore, StoreError};

#[derive(Default)]
struct Tables {
    runs: HashMap<String, UserJourneyRun>,
    /// Run ids in creation order.
    run_order: Vec<String>,
    /// run id -> block id -> state
    block_states: HashMap<String, BTreeMap<String, UserBlockState>>,
}

/// Process-local store, used in tests and single-node setups.
#[derive(Default)]
pub struct MemoryJourneyStore {
    data: tokio::sync::RwLock<Tables>,
}

impl MemoryJourneyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JourneyStore for MemoryJourneyStore {
    async fn create_run(&self, run: &UserJourneyRun) -> Result<u64, StoreError> {
        let mut data = self.data.write().await;
        if data.runs.contains_key(&run.id) {
            return Err(StoreError::AlreadyExists(run_key(&run.id)));
        }
        let mut stored = run.clone();
        stored.revision = 1;
        data.run_order.push(run.id.clone());
        data.runs.insert(run.id.clone(), stored);
        Ok(1)
    }

    async fn save_run(&self, run: &UserJourneyRun) -> Result<u64, StoreError> {
        let mut data = self.data.write().await;
        let current = data
            .runs
            .get_mut(&run.id)
            .ok_or_else(|| StoreError::NotFound(run_key(&run.id)))?;
        let revision = check_revision(run_key(&run.id), run.revision, current.revision)?;
        *current = run.clone();
        current.revision = revision;
        Ok(revision)
    }

    async fn load_run(&self, run_id: &str) -> Result<Option<UserJourneyRun>, StoreError> {
        Ok(self.data.read().await.runs.get(run_id).cloned())
    }

    async fn runs_for(
        &self,
        user_id: &str,
        journey_version_id: &str,
    ) -> Result<Vec<UserJourneyRun>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .run_order
            .iter()
            .filter_map(|id| data.runs.get(id))
            .filter(|run| run.user_id == user_id && run.journey_version_id == journey_version_id)
            .cloned()
            .collect())
    }

    async fn load_block_state(
        &self,
        run_id: &str,
        block_id: &str,
    ) -> Result<Option<UserBlockState>, StoreError> {
        Ok(self
            .data
            .read()
            .await
            .block_states
            .get(run_id)
            .and_then(|states| states.get(block_id))
            .cloned())
    }

    async fn save_block_state(&self, state: &UserBlockState) -> Result<u64, StoreError> {
        let mut data = self.data.write().await;
        let states = data.block_states.entry(state.run_id.clone()).or_default();
        let found = states.get(&state.block_id).map(|s| s.revision).unwrap_or(0);
        let revision = check_revision(
            block_state_key(&state.run_id, &state.block_id),
            state.revision,
            found,
        )?;
        let mut stored = state.clone();
        stored.revision = revision;
        states.insert(state.block_id.clone(), stored);
        Ok(revision)
    }

    async fn block_states(&self, run_id: &str) -> Result<Vec<UserBlockState>, StoreError> {
        Ok(self
            .data
            .read()
            .await
            .block_states
            .get(run_id)
            .map(|states| states.values().cloned().collect())
            .unwrap_or_default())
    }
}
