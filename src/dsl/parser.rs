//! Graph parser: converts raw JSON/YAML/TOML text into [`GraphDefinition`].
//!
//! JSON is the persisted `graph_json` contract. YAML and TOML are accepted for
//! hand-written fixtures and configuration files.

use serde::de::DeserializeOwned;

use crate::domain::model::GraphDefinition;
use crate::error::JourneyError;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON format (`.json`).
    Json,
    /// YAML format (`.yaml` / `.yml`).
    Yaml,
    /// TOML format (`.toml`).
    Toml,
}

impl DocumentFormat {
    /// Guess the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(DocumentFormat::Json),
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            "toml" => Some(DocumentFormat::Toml),
            _ => None,
        }
    }
}

/// Parse a graph document.
pub fn parse_graph(content: &str, format: DocumentFormat) -> Result<GraphDefinition, JourneyError> {
    parse_document(content, format)
}

/// Parse any serde document in one of the supported formats.
pub fn parse_document<T: DeserializeOwned>(
    content: &str,
    format: DocumentFormat,
) -> Result<T, JourneyError> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str(content).map_err(|e| JourneyError::GraphParse(e.to_string()))
        }
        DocumentFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|e| JourneyError::GraphParse(e.to_string()))
        }
        DocumentFormat::Toml => {
            // Go through serde_json::Value so untagged scalars (condition
            // values) deserialize the same way they do from JSON.
            let toml_val: toml::Value =
                toml::from_str(content).map_err(|e| JourneyError::GraphParse(e.to_string()))?;
            serde_json::from_value(toml_value_to_json(toml_val))
                .map_err(|e| JourneyError::GraphParse(e.to_string()))
        }
    }
}

/// Serialize a graph to its persisted `graph_json` form.
pub fn to_graph_json(graph: &GraphDefinition) -> Result<String, JourneyError> {
    serde_json::to_string(graph).map_err(|e| JourneyError::GraphParse(e.to_string()))
}

/// Convert a [`toml::Value`] into a [`serde_json::Value`].
///
/// TOML has no null; datetimes are stringified.
fn toml_value_to_json(val: toml::Value) -> serde_json::Value {
    match val {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_value_to_json).collect())
        }
        toml::Value::Table(tbl) => serde_json::Value::Object(
            tbl.into_iter()
                .map(|(k, v)| (k, toml_value_to_json(v)))
                .collect(),
        ),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{BlockType, FactValue};

    #[test]
    fn test_parse_json() {
        let json = r#"{"startBlockId":"a","blocks":[{"id":"a","type":"read"}],"edges":[]}"#;
        let graph = parse_graph(json, DocumentFormat::Json).unwrap();
        assert_eq!(graph.start_block_id, "a");
        assert_eq!(graph.blocks.len(), 1);
    }

    #[test]
    fn test_parse_fractional_priority() {
        let json = r#"{"startBlockId":"a","blocks":[{"id":"a","type":"read"},{"id":"b","type":"read"}],
"edges":[{"from":"a","to":"b","priority":1.5},{"from":"a","to":"a","priority":-0.5}]}"#;
        let graph = parse_graph(json, DocumentFormat::Json).unwrap();
        assert_eq!(graph.edges[0].priority, Some(1.5));
        assert_eq!(graph.edges[1].priority, Some(-0.5));

        let yaml = "startBlockId: a\nblocks:\n  - {id: a, type: read}\nedges:\n  - {from: a, to: a, priority: 0.75}\n";
        let graph = parse_graph(yaml, DocumentFormat::Yaml).unwrap();
        assert_eq!(graph.edges[0].priority, Some(0.75));
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
startBlockId: intro
blocks:
  - id: intro
    type: read
    content:
      title: Welcome
  - id: check
    type: quiz
    content:
      passingScore: 50
edges:
  - from: intro
    to: check
  - from: check
    to: intro
    condition:
      all:
        - fact: quiz.scorePercent
          op: lt
          value: 50
"#;
        let graph = parse_graph(yaml, DocumentFormat::Yaml).unwrap();
        assert_eq!(graph.blocks[1].block_type(), BlockType::Quiz);
        let cond = &graph.edges[1].condition.as_ref().unwrap().all[0];
        assert_eq!(cond.value, FactValue::Number(50.0));
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
startBlockId = "a"

[[blocks]]
id = "a"
type = "exercise"
[blocks.content]
passingScore = 80

[[edges]]
from = "a"
to = "a"
priority = 1
[edges.condition]
all = [{ fact = "exercise.passed", op = "eq", value = false }]
"#;
        let graph = parse_graph(toml_str, DocumentFormat::Toml).unwrap();
        assert_eq!(graph.edges[0].priority, Some(1.0));
        assert_eq!(
            graph.edges[0].condition.as_ref().unwrap().all[0].value,
            FactValue::Bool(false)
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            parse_graph("{{{invalid", DocumentFormat::Json),
            Err(JourneyError::GraphParse(_))
        ));
        assert!(parse_graph("[[[bad", DocumentFormat::Toml).is_err());
        assert!(parse_graph("blocks: [", DocumentFormat::Yaml).is_err());
    }

    #[test]
    fn test_graph_json_roundtrip_keeps_contract_names() {
        let json = r#"{"startBlockId":"a","blocks":[{"id":"a","type":"ai_help","content":{"maxTurns":3}}],"edges":[]}"#;
        let graph = parse_graph(json, DocumentFormat::Json).unwrap();
        let out = to_graph_json(&graph).unwrap();
        assert!(out.contains("\"startBlockId\":\"a\""));
        assert!(out.contains("\"maxTurns\":3"));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension("YML"), Some(DocumentFormat::Yaml));
        assert_eq!(DocumentFormat::from_extension("json"), Some(DocumentFormat::Json));
        assert_eq!(DocumentFormat::from_extension("xml"), None);
    }
}
