//! Condition evaluation and fact production.
//!
//! - [`facts`] — [`FactTable`] and the per-block-type [`FactProvider`]s.
//! - [`condition`] — Pure, fail-closed evaluation of condition groups.

pub mod condition;
pub mod facts;
pub mod operators;
pub mod type_coercion;

pub use condition::{edge_matches, evaluate, evaluate_condition};
pub use facts::{
    fact_key, BlockEvaluation, FactProvider, FactTable, OutputShapeError, ScoringDefaults,
};
