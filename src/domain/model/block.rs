//! Blocks: the typed units of learning content a journey is made of.
//!
//! On the wire a block is `{ "id", "type", "content" }`. In memory the
//! `type` tag and the payload are fused into [`BlockContent`], a closed sum
//! type with one variant per block type.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Block type tag as it appears in `graph_json`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Read,
    Video,
    Image,
    Quiz,
    Mission,
    Form,
    AiHelp,
    Checkpoint,
    Animation,
    Code,
    Exercise,
    Resource,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Read => "read",
            BlockType::Video => "video",
            BlockType::Image => "image",
            BlockType::Quiz => "quiz",
            BlockType::Mission => "mission",
            BlockType::Form => "form",
            BlockType::AiHelp => "ai_help",
            BlockType::Checkpoint => "checkpoint",
            BlockType::Animation => "animation",
            BlockType::Code => "code",
            BlockType::Exercise => "exercise",
            BlockType::Resource => "resource",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReadContent {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoContent {
    pub title: String,
    pub url: String,
    pub duration_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageContent {
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    /// Topic tag reported as a weak topic when this question is missed.
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuizContent {
    pub questions: Vec<QuizQuestion>,
    /// Percentage (0-100) a submission must reach to pass.
    pub passing_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MissionStep {
    pub id: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MissionContent {
    pub title: String,
    pub steps: Vec<MissionStep>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormField {
    pub id: String,
    pub label: String,
    pub required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormContent {
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AiHelpContent {
    pub prompt: String,
    /// Overrides the engine-wide turn limit for this block.
    pub max_turns: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckpointContent {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimationContent {
    pub url: String,
    pub duration_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CodeContent {
    pub language: String,
    pub starter_code: String,
    /// Names of the checks a submission is graded against.
    pub tests: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExerciseContent {
    pub instructions: String,
    pub passing_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceContent {
    pub title: String,
    pub url: String,
}

/// Type-specific payload of a block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Read(ReadContent),
    Video(VideoContent),
    Image(ImageContent),
    Quiz(QuizContent),
    Mission(MissionContent),
    Form(FormContent),
    AiHelp(AiHelpContent),
    Checkpoint(CheckpointContent),
    Animation(AnimationContent),
    Code(CodeContent),
    Exercise(ExerciseContent),
    Resource(ResourceContent),
}

impl BlockContent {
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockContent::Read(_) => BlockType::Read,
            BlockContent::Video(_) => BlockType::Video,
            BlockContent::Image(_) => BlockType::Image,
            BlockContent::Quiz(_) => BlockType::Quiz,
            BlockContent::Mission(_) => BlockType::Mission,
            BlockContent::Form(_) => BlockType::Form,
            BlockContent::AiHelp(_) => BlockType::AiHelp,
            BlockContent::Checkpoint(_) => BlockType::Checkpoint,
            BlockContent::Animation(_) => BlockType::Animation,
            BlockContent::Code(_) => BlockType::Code,
            BlockContent::Exercise(_) => BlockType::Exercise,
            BlockContent::Resource(_) => BlockType::Resource,
        }
    }

    /// Decode the payload that belongs to `block_type`. A `null` payload is
    /// read as the variant's defaults.
    pub fn from_parts(block_type: BlockType, content: Value) -> Result<Self, serde_json::Error> {
        let content = match content {
            Value::Null => Value::Object(serde_json::Map::new()),
            other => other,
        };
        Ok(match block_type {
            BlockType::Read => BlockContent::Read(serde_json::from_value(content)?),
            BlockType::Video => BlockContent::Video(serde_json::from_value(content)?),
            BlockType::Image => BlockContent::Image(serde_json::from_value(content)?),
            BlockType::Quiz => BlockContent::Quiz(serde_json::from_value(content)?),
            BlockType::Mission => BlockContent::Mission(serde_json::from_value(content)?),
            BlockType::Form => BlockContent::Form(serde_json::from_value(content)?),
            BlockType::AiHelp => BlockContent::AiHelp(serde_json::from_value(content)?),
            BlockType::Checkpoint => BlockContent::Checkpoint(serde_json::from_value(content)?),
            BlockType::Animation => BlockContent::Animation(serde_json::from_value(content)?),
            BlockType::Code => BlockContent::Code(serde_json::from_value(content)?),
            BlockType::Exercise => BlockContent::Exercise(serde_json::from_value(content)?),
            BlockType::Resource => BlockContent::Resource(serde_json::from_value(content)?),
        })
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        match self {
            BlockContent::Read(c) => serde_json::to_value(c),
            BlockContent::Video(c) => serde_json::to_value(c),
            BlockContent::Image(c) => serde_json::to_value(c),
            BlockContent::Quiz(c) => serde_json::to_value(c),
            BlockContent::Mission(c) => serde_json::to_value(c),
            BlockContent::Form(c) => serde_json::to_value(c),
            BlockContent::AiHelp(c) => serde_json::to_value(c),
            BlockContent::Checkpoint(c) => serde_json::to_value(c),
            BlockContent::Animation(c) => serde_json::to_value(c),
            BlockContent::Code(c) => serde_json::to_value(c),
            BlockContent::Exercise(c) => serde_json::to_value(c),
            BlockContent::Resource(c) => serde_json::to_value(c),
        }
    }
}

/// A block inside a journey graph. Immutable once its version is published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBlock", into = "RawBlock")]
pub struct Block {
    pub id: String,
    pub content: BlockContent,
}

impl Block {
    pub fn new(id: impl Into<String>, content: BlockContent) -> Self {
        Self {
            id: id.into(),
            content,
        }
    }

    pub fn block_type(&self) -> BlockType {
        self.content.block_type()
    }
}

/// Wire form of [`Block`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawBlock {
    id: String,
    #[serde(rename = "type")]
    block_type: BlockType,
    #[serde(default)]
    content: Value,
}

impl TryFrom<RawBlock> for Block {
    type Error = String;

    fn try_from(raw: RawBlock) -> Result<Self, Self::Error> {
        let content = BlockContent::from_parts(raw.block_type, raw.content)
            .map_err(|e| format!("invalid {} content for block '{}': {}", raw.block_type, raw.id, e))?;
        Ok(Block {
            id: raw.id,
            content,
        })
    }
}

impl From<Block> for RawBlock {
    fn from(block: Block) -> Self {
        RawBlock {
            block_type: block.block_type(),
            content: block.content.to_json().unwrap_or_default(),
            id: block.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quiz_block_from_json() {
        let block: Block = serde_json::from_value(json!({
            "id": "q1",
            "type": "quiz",
            "content": {
                "passingScore": 50,
                "questions": [
                    {"id": "a", "prompt": "2+2?", "options": ["3", "4"], "correctOption": 1, "topic": "arithmetic"}
                ]
            }
        }))
        .unwrap();
        assert_eq!(block.block_type(), BlockType::Quiz);
        match &block.content {
            BlockContent::Quiz(quiz) => {
                assert_eq!(quiz.passing_score, Some(50.0));
                assert_eq!(quiz.questions[0].correct_option, 1);
                assert_eq!(quiz.questions[0].topic.as_deref(), Some("arithmetic"));
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn test_missing_content_uses_defaults() {
        let block: Block = serde_json::from_value(json!({"id": "r", "type": "read"})).unwrap();
        assert_eq!(block.content, BlockContent::Read(ReadContent::default()));
    }

    #[test]
    fn test_ai_help_tag() {
        let block: Block =
            serde_json::from_value(json!({"id": "h", "type": "ai_help", "content": {"maxTurns": 4}}))
                .unwrap();
        assert_eq!(block.block_type(), BlockType::AiHelp);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = serde_json::from_value::<Block>(json!({"id": "x", "type": "poll"}));
        assert!(err.is_err());
    }

    #[test]
    fn test_wrong_payload_shape_rejected() {
        let err = serde_json::from_value::<Block>(json!({
            "id": "q", "type": "quiz", "content": {"questions": "none"}
        }));
        let msg = err.unwrap_err().to_string();
        assert!(msg.contains("block 'q'"));
    }

    #[test]
    fn test_serializes_back_to_wire_form() {
        let block = Block::new(
            "m",
            BlockContent::Mission(MissionContent {
                title: "Build".into(),
                steps: vec![MissionStep {
                    id: "s1".into(),
                    description: "do it".into(),
                }],
            }),
        );
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "mission");
        assert_eq!(value["content"]["steps"][0]["id"], "s1");
    }
}
