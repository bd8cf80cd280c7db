//! Graph model.
//!
//! A [`JourneyGraph`] is built once per journey version by [`build_graph`].
//! It indexes blocks by id, keeps each block's outgoing edges in routing order
//! (priority ascending, unprioritised last, ties by declaration order) and a
//! `petgraph` topology for reachability and cycle analysis.

pub mod builder;
pub mod traversal;
pub mod types;

pub use builder::*;
pub use types::*;
