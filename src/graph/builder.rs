use std::collections::{HashMap, HashSet};

use crate::domain::model::{Block, Edge, GraphDefinition, JourneyVersion};
use crate::error::JourneyError;
use crate::evaluator::FactTable;

use super::traversal::{cyclic_components, reachable_blocks, select_route, sort_edge_indices};
use super::types::*;

/// Immutable in-memory form of one journey version's graph.
///
/// Dangling edges are kept (they are publish-time warnings, not build
/// failures); they are simply absent from the topology used for analysis.
#[derive(Debug, Clone)]
pub struct JourneyGraph {
    version_id: String,
    definition: GraphDefinition,
    block_positions: HashMap<String, usize>,
    /// Block id -> edge declaration indices in routing order.
    outgoing: HashMap<String, Vec<usize>>,
    topology: BlockTopology,
    node_index_map: BlockIndexMap,
}

impl JourneyGraph {
    pub fn from_version(version: &JourneyVersion) -> Result<Self, JourneyError> {
        build_graph(version.id.clone(), version.graph.clone())
    }

    pub fn version_id(&self) -> &str {
        &self.version_id
    }

    pub fn definition(&self) -> &GraphDefinition {
        &self.definition
    }

    pub fn start_block_id(&self) -> &str {
        &self.definition.start_block_id
    }

    pub fn has_start_block(&self) -> bool {
        self.block_positions
            .contains_key(&self.definition.start_block_id)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.definition.blocks
    }

    pub fn edges(&self) -> &[Edge] {
        &self.definition.edges
    }

    pub fn get_block(&self, block_id: &str) -> Option<&Block> {
        self.block_positions
            .get(block_id)
            .map(|pos| &self.definition.blocks[*pos])
    }

    /// Look up a block by id.
    pub fn find_block(&self, block_id: &str) -> Result<&Block, JourneyError> {
        self.get_block(block_id)
            .ok_or_else(|| JourneyError::BlockNotFound(block_id.to_string()))
    }

    /// Outgoing edges of `block_id` in routing order. Unknown blocks have none.
    pub fn resolve_outgoing(&self, block_id: &str) -> Vec<&Edge> {
        self.outgoing
            .get(block_id)
            .map(|indices| indices.iter().map(|i| &self.definition.edges[*i]).collect())
            .unwrap_or_default()
    }

    /// Pick the edge to follow out of `block_id` given the facts it produced.
    pub fn route(&self, block_id: &str, facts: &FactTable) -> Route<'_> {
        select_route(self.resolve_outgoing(block_id), facts)
    }

    /// Block ids reachable from the start block; empty when the start block is missing.
    pub fn reachable_from_start(&self) -> HashSet<String> {
        match self.node_index_map.get(&self.definition.start_block_id) {
            Some(start) => reachable_blocks(&self.topology, *start),
            None => HashSet::new(),
        }
    }

    pub fn cycles(&self) -> Vec<Vec<String>> {
        cyclic_components(&self.topology)
    }

    /// Edges (with declaration index) whose `from` or `to` names no block.
    pub fn dangling_edges(&self) -> Vec<(usize, &Edge)> {
        self.definition
            .edges
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                !self.block_positions.contains_key(&e.from)
                    || !self.block_positions.contains_key(&e.to)
            })
            .collect()
    }
}

/// Build a journey graph from a graph definition.
///
/// Fails only on duplicate block ids, which make block lookup ambiguous.
pub fn build_graph(
    version_id: impl Into<String>,
    definition: GraphDefinition,
) -> Result<JourneyGraph, JourneyError> {
    let mut block_positions = HashMap::with_capacity(definition.blocks.len());
    let mut topology = BlockTopology::default();
    let mut node_index_map = BlockIndexMap::new();

    for (pos, block) in definition.blocks.iter().enumerate() {
        if block_positions.insert(block.id.clone(), pos).is_some() {
            return Err(JourneyError::DuplicateBlock(block.id.clone()));
        }
        let idx = topology.add_node(block.id.clone());
        node_index_map.insert(block.id.clone(), idx);
    }

    let mut outgoing: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, edge) in definition.edges.iter().enumerate() {
        outgoing.entry(edge.from.clone()).or_default().push(i);
        if let (Some(from), Some(to)) = (node_index_map.get(&edge.from), node_index_map.get(&edge.to))
        {
            topology.add_edge(*from, *to, i);
        }
    }
    for indices in outgoing.values_mut() {
        sort_edge_indices(&definition.edges, indices);
    }

    Ok(JourneyGraph {
        version_id: version_id.into(),
        definition,
        block_positions,
        outgoing,
        topology,
        node_index_map,
    })
}
