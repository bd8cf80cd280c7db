//! Run and block execution states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a learner's run through one journey version.
///
/// `not_started -> in_progress -> {completed, abandoned}`. Both terminal
/// states are only reachable from `in_progress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    NotStarted,
    InProgress,
    Completed,
    Abandoned,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Abandoned)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::NotStarted => "not_started",
            RunStatus::InProgress => "in_progress",
            RunStatus::Completed => "completed",
            RunStatus::Abandoned => "abandoned",
        };
        f.write_str(s)
    }
}

/// Status of one block within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStatus {
    NotStarted,
    InProgress,
    Completed,
    Failed,
    Skipped,
}

impl BlockStatus {
    /// Completed, failed and skipped blocks have been left by the learner.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            BlockStatus::Completed | BlockStatus::Failed | BlockStatus::Skipped
        )
    }
}

impl fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BlockStatus::NotStarted => "not_started",
            BlockStatus::InProgress => "in_progress",
            BlockStatus::Completed => "completed",
            BlockStatus::Failed => "failed",
            BlockStatus::Skipped => "skipped",
        };
        f.write_str(s)
    }
}
