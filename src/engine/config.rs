use serde::{Deserialize, Serialize};

use crate::dsl::parser::{parse_document, DocumentFormat};
use crate::error::{JourneyError, JourneyResult};
use crate::evaluator::ScoringDefaults;

/// Engine-construction parameters. Nothing here is read from ambient state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pass threshold for quizzes and exercises that omit `passingScore`.
    /// With neither set, such blocks have no pass/fail outcome.
    pub default_passing_score: Option<f64>,
    pub ai_help: AiHelpConfig,
    /// Add each attempt's time to `timeSpentSeconds` instead of overwriting it.
    pub accumulate_time_spent: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_passing_score: None,
            ai_help: AiHelpConfig::default(),
            accumulate_time_spent: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiHelpConfig {
    pub model: String,
    /// Turn limit for AI-help blocks without their own `maxTurns`.
    /// Enforced by the calling UI.
    pub max_turns: u32,
}

impl Default for AiHelpConfig {
    fn default() -> Self {
        AiHelpConfig {
            model: "default".to_string(),
            max_turns: 10,
        }
    }
}

impl EngineConfig {
    /// Load a config document; missing keys take their defaults.
    pub fn from_str(content: &str, format: DocumentFormat) -> JourneyResult<Self> {
        parse_document(content, format).map_err(|e| match e {
            JourneyError::GraphParse(msg) => JourneyError::Config(msg),
            other => other,
        })
    }

    pub fn scoring(&self) -> ScoringDefaults {
        ScoringDefaults {
            passing_score: self.default_passing_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_passing_score, None);
        assert_eq!(config.ai_help.max_turns, 10);
        assert!(config.accumulate_time_spent);
        assert_eq!(config.scoring(), ScoringDefaults::default());
    }

    #[test]
    fn test_from_yaml_partial() {
        let yaml = "default_passing_score: 70\nai_help:\n  model: tutor-large\n";
        let config = EngineConfig::from_str(yaml, DocumentFormat::Yaml).unwrap();
        assert_eq!(config.default_passing_score, Some(70.0));
        assert_eq!(config.ai_help.model, "tutor-large");
        assert_eq!(config.ai_help.max_turns, 10);
        assert!(config.accumulate_time_spent);
    }

    #[test]
    fn test_from_toml() {
        let toml_str = r#"
accumulate_time_spent = false

[ai_help]
max_turns = 4
"#;
        let config = EngineConfig::from_str(toml_str, DocumentFormat::Toml).unwrap();
        assert!(!config.accumulate_time_spent);
        assert_eq!(config.ai_help.max_turns, 4);
        assert_eq!(config.ai_help.model, "default");
    }

    #[test]
    fn test_from_json_empty_and_invalid() {
        assert_eq!(
            EngineConfig::from_str("{}", DocumentFormat::Json).unwrap(),
            EngineConfig::default()
        );
        assert!(matches!(
            EngineConfig::from_str("{\"ai_help\": 3}", DocumentFormat::Json),
            Err(JourneyError::Config(_))
        ));
    }
}
