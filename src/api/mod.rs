//! Public API layer: the track-level entry point for UI callers.

mod navigator;

pub use navigator::{NavigationOutcome, TrackNavigator};
