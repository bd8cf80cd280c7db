use std::cmp::Ordering;
use std::collections::HashSet;

use petgraph::stable_graph::NodeIndex;
use petgraph::visit::Bfs;

use crate::domain::model::Edge;
use crate::evaluator::{edge_matches, FactTable};

use super::types::{BlockTopology, Route};

/// Priority ascending, unprioritised edges last, ties by declaration order.
pub fn compare_edges(a: (usize, &Edge), b: (usize, &Edge)) -> Ordering {
    let by_priority = match (a.1.priority, b.1.priority) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_priority.then(a.0.cmp(&b.0))
}

/// Sort edge declaration indices into routing order.
pub fn sort_edge_indices(edges: &[Edge], indices: &mut [usize]) {
    indices.sort_by(|a, b| compare_edges((*a, &edges[*a]), (*b, &edges[*b])));
}

/// Pick the first edge, in routing order, whose condition holds.
pub fn select_route<'a, I>(candidates: I, facts: &FactTable) -> Route<'a>
where
    I: IntoIterator<Item = &'a Edge>,
{
    candidates
        .into_iter()
        .find(|edge| edge_matches(edge, facts))
        .map(Route::Follow)
        .unwrap_or(Route::DeadEnd)
}

/// Block ids reachable from `start` (inclusive).
pub fn reachable_blocks(topology: &BlockTopology, start: NodeIndex) -> HashSet<String> {
    let mut reachable = HashSet::new();
    let mut bfs = Bfs::new(topology, start);
    while let Some(idx) = bfs.next(topology) {
        if let Some(id) = topology.node_weight(idx) {
            reachable.insert(id.clone());
        }
    }
    reachable
}

/// Strongly connected components that form a cycle, including self-loops.
/// Each component's ids are sorted; components are sorted by first id.
pub fn cyclic_components(topology: &BlockTopology) -> Vec<Vec<String>> {
    let mut cycles: Vec<Vec<String>> = petgraph::algo::tarjan_scc(topology)
        .into_iter()
        .filter(|scc| {
            scc.len() > 1
                || scc
                    .first()
                    .map(|idx| topology.find_edge(*idx, *idx).is_some())
                    .unwrap_or(false)
        })
        .map(|scc| {
            let mut ids: Vec<String> = scc
                .iter()
                .filter_map(|idx| topology.node_weight(*idx).cloned())
                .collect();
            ids.sort();
            ids
        })
        .collect();
    cycles.sort();
    cycles
}
