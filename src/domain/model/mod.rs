//! Authoring-side model: blocks, edges, conditions, graphs, versions and modules.

mod block;
mod condition;
mod graph;
mod journey;

pub use block::{
    AiHelpContent, AnimationContent, Block, BlockContent, BlockType, CheckpointContent,
    CodeContent, ExerciseContent, FormContent, FormField, ImageContent, MissionContent,
    MissionStep, QuizContent, QuizQuestion, ReadContent, ResourceContent, VideoContent,
};
pub use condition::{ComparisonOperator, Condition, ConditionGroup, FactValue};
pub use graph::{Edge, GraphDefinition};
pub use journey::{JourneyVersion, Module, Track, VersionStatus};
