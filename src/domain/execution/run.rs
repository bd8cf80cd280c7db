use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::status::{BlockStatus, RunStatus};

/// One learner's execution instance through one journey version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserJourneyRun {
    pub id: String,
    pub user_id: String,
    pub journey_version_id: String,
    pub current_block_id: Option<String>,
    pub status: RunStatus,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Optimistic concurrency token; bumped by the store on every save.
    #[serde(default)]
    pub revision: u64,
}

impl UserJourneyRun {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        journey_version_id: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            journey_version_id: journey_version_id.into(),
            current_block_id: None,
            status: RunStatus::NotStarted,
            started_at: None,
            completed_at: None,
            created_at,
            updated_at: created_at,
            metadata: Map::new(),
            revision: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == RunStatus::InProgress
    }
}

/// Persisted execution record of one block within one run. Unique per `(run_id, block_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBlockState {
    pub run_id: String,
    pub block_id: String,
    pub status: BlockStatus,
    pub attempts_count: u32,
    pub output_json: Option<Value>,
    pub score: Option<f64>,
    #[serde(default)]
    pub weak_topics: Vec<String>,
    pub time_spent_seconds: u64,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    #[serde(default)]
    pub revision: u64,
}

impl UserBlockState {
    pub fn new(run_id: impl Into<String>, block_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            block_id: block_id.into(),
            status: BlockStatus::NotStarted,
            attempts_count: 0,
            output_json: None,
            score: None,
            weak_topics: Vec::new(),
            time_spent_seconds: 0,
            started_at: None,
            completed_at: None,
            revision: 0,
        }
    }
}

/// What the learner submitted when finishing a block.
///
/// `payload` is persisted verbatim as the block state's `outputJson`; each
/// block type reads only the fields it understands from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockOutput {
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub time_spent_seconds: u64,
}

impl BlockOutput {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            time_spent_seconds: 0,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_time_spent(mut self, seconds: u64) -> Self {
        self.time_spent_seconds = seconds;
        self
    }
}

/// Continuation signal returned after a block is finished.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    /// The block the learner moves to, or `None` when the run completed.
    pub next: Option<String>,
    pub block_status: BlockStatus,
}

impl StepOutcome {
    pub fn run_completed(&self) -> bool {
        self.next.is_none()
    }
}

/// Snapshot of a run's progress for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunProgress {
    pub status: RunStatus,
    pub current_block_id: Option<String>,
    pub total_blocks: usize,
    pub reachable_blocks: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub in_progress: usize,
    pub time_spent_seconds: u64,
}
