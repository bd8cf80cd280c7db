//! Publish-time graph validation.
//!
//! Three layers run in order: structure (ids, endpoints, edge shape),
//! topology (reachability, cycles) and semantics (content and condition
//! facts). Only unparsable graphs and ambiguous block ids are errors; every
//! other finding is a warning and does not block publishing.

mod layer1_structure;
mod layer2_topology;
mod layer3_semantic;
mod types;

use crate::domain::model::GraphDefinition;
use crate::dsl::parser::{parse_graph, DocumentFormat};

pub use types::{Diagnostic, DiagnosticLevel, ValidationReport};

/// Parse and validate a graph document.
pub fn validate_graph_document(content: &str, format: DocumentFormat) -> ValidationReport {
    match parse_graph(content, format) {
        Ok(graph) => validate_graph(&graph),
        Err(err) => ValidationReport::from_diagnostics(vec![Diagnostic::error(
            "E000",
            err.to_string(),
        )]),
    }
}

pub fn validate_graph(graph: &GraphDefinition) -> ValidationReport {
    let mut diagnostics = layer1_structure::validate(graph);

    let has_fatal_structure = diagnostics
        .iter()
        .any(|d| d.is_error() && matches!(d.code.as_str(), "E001" | "E002"));

    let topo_info = if has_fatal_structure {
        layer2_topology::TopologyInfo::default()
    } else {
        let (layer2, info) = layer2_topology::validate(graph);
        diagnostics.extend(layer2);
        info
    };

    diagnostics.extend(layer3_semantic::validate(graph, &topo_info));

    ValidationReport::from_diagnostics(diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error() {
        let report = validate_graph_document("{{invalid", DocumentFormat::Json);
        assert!(!report.is_valid);
        assert!(report.has_code("E000"));
    }

    #[test]
    fn test_warnings_do_not_invalidate() {
        let json = r#"{
            "startBlockId": "intro",
            "blocks": [
                {"id": "intro", "type": "read"},
                {"id": "quiz", "type": "quiz", "content": {"questions": [{"id": "q1", "options": ["a", "b"], "correctOption": 0}]}},
                {"id": "later", "type": "read"}
            ],
            "edges": [
                {"from": "intro", "to": "quiz"},
                {"from": "quiz", "to": "intro", "condition": {"all": [{"fact": "quiz.passed", "op": "eq", "value": false}]}},
                {"from": "quiz", "to": "ghost"}
            ]
        }"#;
        let report = validate_graph_document(json, DocumentFormat::Json);
        assert!(report.is_valid, "{:?}", report.diagnostics);
        assert!(report.has_code("W003"));
        assert!(report.has_code("W101"));
        assert!(report.has_code("W102"));
        assert!(report.errors().is_empty());
    }

    #[test]
    fn test_duplicate_ids_skip_topology() {
        let json = r#"{
            "startBlockId": "a",
            "blocks": [{"id": "a", "type": "read"}, {"id": "a", "type": "video"}, {"id": "b", "type": "read"}],
            "edges": []
        }"#;
        let report = validate_graph_document(json, DocumentFormat::Json);
        assert!(!report.is_valid);
        assert!(report.has_code("E001"));
        assert!(!report.has_code("W101"));
    }
}
