//! Execution records: runs, block states and their statuses.

mod run;
mod status;

pub use run::{BlockOutput, RunProgress, StepOutcome, UserBlockState, UserJourneyRun};
pub use status::{BlockStatus, RunStatus};
