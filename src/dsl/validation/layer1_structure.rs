use std::collections::{HashMap, HashSet};

use crate::domain::model::GraphDefinition;

use super::types::Diagnostic;

/// Structural checks that need no graph traversal.
pub fn validate(graph: &GraphDefinition) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    if graph.blocks.is_empty() {
        diags.push(Diagnostic::warning("W006", "Graph defines no blocks"));
    }

    let mut ids = HashSet::new();
    let mut reported = HashSet::new();
    for (pos, block) in graph.blocks.iter().enumerate() {
        if block.id.trim().is_empty() {
            diags.push(
                Diagnostic::error("E002", "Block id is empty").at(format!("blocks[{}].id", pos)),
            );
        }
        if !ids.insert(block.id.as_str()) && reported.insert(block.id.as_str()) {
            diags.push(
                Diagnostic::error("E001", format!("Duplicate block id: {}", block.id))
                    .on_block(&block.id)
                    .at(format!("blocks[{}].id", pos)),
            );
        }
    }

    if !ids.contains(graph.start_block_id.as_str()) {
        diags.push(
            Diagnostic::warning(
                "W001",
                format!("Start block '{}' does not exist", graph.start_block_id),
            )
            .at("startBlockId"),
        );
    }

    let mut unconditional: HashMap<&str, usize> = HashMap::new();
    for (i, edge) in graph.edges.iter().enumerate() {
        if !ids.contains(edge.from.as_str()) {
            diags.push(
                Diagnostic::warning("W002", format!("Edge source '{}' does not exist", edge.from))
                    .on_edge(i)
                    .at(format!("edges[{}].from", i)),
            );
        }
        if !ids.contains(edge.to.as_str()) {
            diags.push(
                Diagnostic::warning("W003", format!("Edge target '{}' does not exist", edge.to))
                    .on_block(&edge.from)
                    .on_edge(i)
                    .at(format!("edges[{}].to", i)),
            );
        }
        match &edge.condition {
            Some(group) if group.is_empty() => {
                diags.push(
                    Diagnostic::warning(
                        "W005",
                        "Condition group is empty and always matches",
                    )
                    .on_block(&edge.from)
                    .on_edge(i)
                    .at(format!("edges[{}].condition", i)),
                );
                *unconditional.entry(edge.from.as_str()).or_default() += 1;
            }
            None => *unconditional.entry(edge.from.as_str()).or_default() += 1,
            Some(_) => {}
        }
    }

    let mut shadowed: Vec<(&str, usize)> = unconditional
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .collect();
    shadowed.sort();
    for (from, count) in shadowed {
        diags.push(
            Diagnostic::warning(
                "W004",
                format!(
                    "Block '{}' has {} unconditional edges; only the first in priority order is ever taken",
                    from, count
                ),
            )
            .on_block(from),
        );
    }

    diags
}
