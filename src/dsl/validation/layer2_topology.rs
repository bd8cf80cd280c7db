use std::collections::HashSet;

use crate::domain::model::GraphDefinition;
use crate::graph::build_graph;

use super::types::Diagnostic;

/// Topology facts later layers can reuse.
#[derive(Debug, Default)]
pub struct TopologyInfo {
    pub reachable: HashSet<String>,
}

/// Reachability and cycle analysis. Expects block ids to be unique.
pub fn validate(graph: &GraphDefinition) -> (Vec<Diagnostic>, TopologyInfo) {
    let mut diags = Vec::new();

    let journey = match build_graph("validation", graph.clone()) {
        Ok(journey) => journey,
        Err(_) => return (diags, TopologyInfo::default()),
    };

    let reachable = journey.reachable_from_start();
    if journey.has_start_block() {
        for block in journey.blocks() {
            if !reachable.contains(&block.id) {
                diags.push(
                    Diagnostic::warning("W101", format!("Block '{}' is unreachable from start", block.id))
                        .on_block(&block.id),
                );
            }
        }
    }

    // Loops are legal (retry paths); they are reported so authors notice
    // unintended ones.
    for cycle in journey.cycles() {
        let first = cycle.first().cloned().unwrap_or_default();
        diags.push(
            Diagnostic::warning("W102", format!("Cycle through blocks: {}", cycle.join(" -> ")))
                .on_block(first),
        );
    }

    (diags, TopologyInfo { reachable })
}
