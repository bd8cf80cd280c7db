use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use std::collections::HashMap;

use crate::domain::model::Edge;

/// Block-level topology: node weights are block ids, edge weights are the
/// declaration index of the edge in `GraphDefinition::edges`.
pub type BlockTopology = StableDiGraph<String, usize>;

/// Block id to petgraph `NodeIndex`.
pub type BlockIndexMap = HashMap<String, NodeIndex>;

/// Routing decision after a block finishes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Route<'a> {
    /// Follow this edge to its target block.
    Follow(&'a Edge),
    /// No outgoing edge qualified; the run is complete.
    DeadEnd,
}

impl<'a> Route<'a> {
    pub fn target(&self) -> Option<&'a str> {
        match self {
            Route::Follow(edge) => Some(edge.to.as_str()),
            Route::DeadEnd => None,
        }
    }
}
