//! Run State Store and Block State Store.
//!
//! Both records carry a `revision`. Every save is a compare-and-swap on it:
//! the caller passes the revision it loaded, the store rejects the write with
//! [`StoreError::Conflict`] if someone else saved in between, and returns the
//! new revision on success. New records are saved with revision `0`.

mod file;
mod memory;

use async_trait::async_trait;

use crate::domain::execution::{UserBlockState, UserJourneyRun};

pub use file::FileJourneyStore;
pub use memory::MemoryJourneyStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Write conflict on {key}: expected revision {expected}, found {found}")]
    Conflict {
        key: String,
        expected: u64,
        found: u64,
    },
    #[error("Record already exists: {0}")]
    AlreadyExists(String),
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Record corrupted: {0}")]
    Corrupted(String),
}

#[async_trait]
pub trait JourneyStore: Send + Sync {
    /// Persist a new run. Returns the stored revision (always `1`).
    async fn create_run(&self, run: &UserJourneyRun) -> Result<u64, StoreError>;

    /// Update an existing run if its revision is still current.
    async fn save_run(&self, run: &UserJourneyRun) -> Result<u64, StoreError>;

    async fn load_run(&self, run_id: &str) -> Result<Option<UserJourneyRun>, StoreError>;

    /// All runs of a learner on one journey version, oldest first.
    async fn runs_for(
        &self,
        user_id: &str,
        journey_version_id: &str,
    ) -> Result<Vec<UserJourneyRun>, StoreError>;

    async fn load_block_state(
        &self,
        run_id: &str,
        block_id: &str,
    ) -> Result<Option<UserBlockState>, StoreError>;

    /// Insert (revision `0`) or update a block state.
    async fn save_block_state(&self, state: &UserBlockState) -> Result<u64, StoreError>;

    /// Block states of one run, ordered by block id.
    async fn block_states(&self, run_id: &str) -> Result<Vec<UserBlockState>, StoreError>;

    /// Most recently created run that is not completed or abandoned.
    async fn latest_active_run(
        &self,
        user_id: &str,
        journey_version_id: &str,
    ) -> Result<Option<UserJourneyRun>, StoreError> {
        Ok(self
            .runs_for(user_id, journey_version_id)
            .await?
            .into_iter()
            .rev()
            .find(|run| !run.status.is_terminal()))
    }
}

pub(crate) fn run_key(run_id: &str) -> String {
    format!("run:{}", run_id)
}

pub(crate) fn block_state_key(run_id: &str, block_id: &str) -> String {
    format!("block_state:{}/{}", run_id, block_id)
}

/// Compare the caller's revision with the stored one.
pub(crate) fn check_revision(key: String, expected: u64, found: u64) -> Result<u64, StoreError> {
    if expected != found {
        return Err(StoreError::Conflict {
            key,
            expected,
            found,
        });
    }
    Ok(found + 1)
}

#[cfg(test)]
pub(crate) mod contract {
    //! Behaviour every `JourneyStore` backend must share.

    use super::*;
    use crate::domain::execution::{BlockStatus, RunStatus};

    pub fn run(id: &str, user: &str, created_at: i64) -> UserJourneyRun {
        UserJourneyRun::new(id, user, "v1", created_at)
    }

    pub async fn run_revisions(store: &dyn JourneyStore) {
        let mut r = run("r1", "u1", 10);
        assert_eq!(store.create_run(&r).await.unwrap(), 1);
        assert!(matches!(
            store.create_run(&r).await,
            Err(StoreError::AlreadyExists(_))
        ));

        let stale = store.load_run("r1").await.unwrap().unwrap();
        assert_eq!(stale.revision, 1);

        r = stale.clone();
        r.status = RunStatus::InProgress;
        r.revision = store.save_run(&r).await.unwrap();
        assert_eq!(r.revision, 2);

        // A second writer holding the old revision loses.
        let mut other = stale;
        other.status = RunStatus::Abandoned;
        match store.save_run(&other).await {
            Err(StoreError::Conflict {
                expected, found, ..
            }) => {
                assert_eq!(expected, 1);
                assert_eq!(found, 2);
            }
            res => panic!("expected conflict, got {:?}", res),
        }
        let loaded = store.load_run("r1").await.unwrap().unwrap();
        assert_eq!(loaded.status, RunStatus::InProgress);
        assert_eq!(loaded.revision, 2);

        assert!(matches!(
            store.save_run(&run("ghost", "u1", 0)).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(store.load_run("ghost").await.unwrap().is_none());
    }

    pub async fn latest_active(store: &dyn JourneyStore) {
        let mut first = run("r1", "u1", 10);
        first.status = RunStatus::InProgress;
        store.create_run(&first).await.unwrap();
        let mut second = run("r2", "u1", 20);
        second.status = RunStatus::Completed;
        store.create_run(&second).await.unwrap();
        store.create_run(&run("r3", "u2", 30)).await.unwrap();

        let runs = store.runs_for("u1", "v1").await.unwrap();
        let ids: Vec<&str> = runs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);

        let active = store.latest_active_run("u1", "v1").await.unwrap().unwrap();
        assert_eq!(active.id, "r1");
        assert!(store.latest_active_run("u1", "v2").await.unwrap().is_none());
    }

    /// Runs created within the same second list in creation order, not id order.
    pub async fn creation_order(store: &dyn JourneyStore) {
        store.create_run(&run("b", "u1", 5)).await.unwrap();
        store.create_run(&run("a", "u1", 5)).await.unwrap();
        store.create_run(&run("c", "u1", 5)).await.unwrap();

        let runs = store.runs_for("u1", "v1").await.unwrap();
        let ids: Vec<&str> = runs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);

        let latest = store.latest_active_run("u1", "v1").await.unwrap().unwrap();
        assert_eq!(latest.id, "c");
    }

    pub async fn block_state_revisions(store: &dyn JourneyStore) {
        let mut state = UserBlockState::new("r1", "quiz");
        state.status = BlockStatus::InProgress;
        state.revision = store.save_block_state(&state).await.unwrap();
        assert_eq!(state.revision, 1);

        // Inserting again as new conflicts with the existing row.
        let fresh = UserBlockState::new("r1", "quiz");
        assert!(matches!(
            store.save_block_state(&fresh).await,
            Err(StoreError::Conflict { expected: 0, found: 1, .. })
        ));

        state.status = BlockStatus::Completed;
        state.score = Some(80.0);
        state.revision = store.save_block_state(&state).await.unwrap();
        assert_eq!(state.revision, 2);

        let mut intro = UserBlockState::new("r1", "intro");
        intro.status = BlockStatus::Completed;
        store.save_block_state(&intro).await.unwrap();
        store
            .save_block_state(&UserBlockState::new("r2", "intro"))
            .await
            .unwrap();

        let loaded = store.load_block_state("r1", "quiz").await.unwrap().unwrap();
        assert_eq!(loaded.score, Some(80.0));
        assert!(store.load_block_state("r1", "ghost").await.unwrap().is_none());

        let states = store.block_states("r1").await.unwrap();
        let ids: Vec<&str> = states.iter().map(|s| s.block_id.as_str()).collect();
        assert_eq!(ids, vec!["intro", "quiz"]);
    }
}
