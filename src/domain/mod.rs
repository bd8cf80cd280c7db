//! Domain layer — pure data model shared by every other layer.
//!
//! Submodules:
//! - [`model`] — Authoring-side types (blocks, edges, conditions, versions, modules).
//! - [`execution`] — Learner-side execution records (runs, block states, statuses).

pub mod execution;
pub mod model;
