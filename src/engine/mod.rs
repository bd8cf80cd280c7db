//! Engine layer.
//!
//! - [`executor`] — the per-run state machine ([`JourneyEngine`]).
//! - [`continuation`] — cross-module continuation within a track.
//! - [`config`] — engine-construction parameters.

pub mod config;
pub mod continuation;
pub mod executor;

pub use config::{AiHelpConfig, EngineConfig};
pub use continuation::{Continuation, ContinuationResolver};
pub use executor::{JourneyEngine, JourneyEngineBuilder, ABANDON_REASON_KEY};
