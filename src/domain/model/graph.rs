use serde::{Deserialize, Serialize};

use super::block::Block;
use super::condition::ConditionGroup;

/// Directed, optionally conditional transition between two blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionGroup>,
    /// Lower runs first. Edges without a priority sort after all prioritised ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            condition: None,
            priority: None,
        }
    }

    pub fn when(mut self, condition: ConditionGroup) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_priority(mut self, priority: impl Into<f64>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn is_unconditional(&self) -> bool {
        self.condition.is_none()
    }
}

/// The `graph_json` document: the durable contract between authoring and the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDefinition {
    pub start_block_id: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{BlockType, ComparisonOperator, Condition};
    use serde_json::json;

    #[test]
    fn test_graph_definition_from_json() {
        let graph: GraphDefinition = serde_json::from_value(json!({
            "startBlockId": "intro",
            "blocks": [
                {"id": "intro", "type": "read", "content": {"title": "Welcome"}},
                {"id": "quiz", "type": "quiz", "content": {"passingScore": 50}}
            ],
            "edges": [
                {"from": "intro", "to": "quiz"},
                {"from": "quiz", "to": "intro", "priority": 2,
                 "condition": {"all": [{"fact": "quiz.scorePercent", "op": "lt", "value": 50}]}}
            ]
        }))
        .unwrap();

        assert_eq!(graph.start_block_id, "intro");
        assert_eq!(graph.blocks[1].block_type(), BlockType::Quiz);
        assert!(graph.edges[0].is_unconditional());
        assert_eq!(graph.edges[1].priority, Some(2.0));
        assert_eq!(
            graph.edges[1].condition.as_ref().unwrap().all[0].op,
            ComparisonOperator::Lt
        );
    }

    #[test]
    fn test_edge_builder_omits_empty_fields() {
        let edge = Edge::new("a", "b");
        let value = serde_json::to_value(&edge).unwrap();
        assert!(value.get("condition").is_none());
        assert!(value.get("priority").is_none());

        let gated = Edge::new("a", "b")
            .when(ConditionGroup::all(vec![Condition::new(
                "quiz.passed",
                ComparisonOperator::Eq,
                true,
            )]))
            .with_priority(1);
        assert!(!gated.is_unconditional());
        assert_eq!(gated.priority, Some(1.0));
    }

    #[test]
    fn test_fractional_priority() {
        let graph: GraphDefinition = serde_json::from_str(
            r#"{"startBlockId": "a", "blocks": [{"id": "a", "type": "read"}, {"id": "b", "type": "read"}],
                "edges": [{"from": "a", "to": "b", "priority": 1.5}]}"#,
        )
        .unwrap();
        assert_eq!(graph.edges[0].priority, Some(1.5));
        let value = serde_json::to_value(&graph.edges[0]).unwrap();
        assert_eq!(value["priority"], json!(1.5));
    }
}
