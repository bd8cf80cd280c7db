//! Fact tables and the per-block-type providers that fill them.
//!
//! When a block finishes, its [`FactProvider`] reads the learner's
//! [`BlockOutput`] and produces a [`BlockEvaluation`]: the facts visible to
//! the outgoing edge conditions (namespaced under the block type, e.g.
//! `quiz.scorePercent`), plus the score, pass/fail verdict and weak topics
//! recorded on the block state. Each provider declares the exact fact keys it
//! can emit so publish-time validation can flag conditions that will never match.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::execution::BlockOutput;
use crate::domain::model::{
    AiHelpContent, AnimationContent, BlockContent, CheckpointContent, CodeContent,
    ExerciseContent, FactValue, FormContent, ImageContent, MissionContent, QuizContent,
    ReadContent, ResourceContent, VideoContent,
};

/// Flat map from dot-path (`namespace.name`) to scalar value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactTable {
    facts: BTreeMap<String, FactValue>,
}

impl FactTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<FactValue>) {
        self.facts.insert(path.into(), value.into());
    }

    pub fn get(&self, path: &str) -> Option<&FactValue> {
        self.facts.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.facts.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FactValue)> {
        self.facts.iter()
    }
}

impl<K: Into<String>, V: Into<FactValue>> FromIterator<(K, V)> for FactTable {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut table = FactTable::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

/// Scoring knobs that come from engine configuration rather than content.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoringDefaults {
    /// Threshold applied when a quiz or exercise omits `passingScore`.
    pub passing_score: Option<f64>,
}

/// Everything derived from one finished block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockEvaluation {
    pub facts: FactTable,
    pub score: Option<f64>,
    /// `Some(false)` only for block types with a pass/fail threshold.
    pub passed: Option<bool>,
    pub weak_topics: Vec<String>,
}

/// The submitted payload did not have the shape the block type expects.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct OutputShapeError(pub String);

/// Declares and produces the facts one block type contributes to routing.
pub trait FactProvider: Send + Sync {
    /// Semantic key facts are namespaced under.
    fn namespace(&self) -> &'static str;

    /// Local fact names (without the namespace) this provider can emit.
    fn fact_names(&self) -> Vec<String>;

    fn evaluate(
        &self,
        output: &BlockOutput,
        defaults: &ScoringDefaults,
    ) -> Result<BlockEvaluation, OutputShapeError>;

    /// Fully qualified fact keys, including `<ns>.skipped`.
    fn declared_facts(&self) -> Vec<String> {
        let ns = self.namespace();
        let mut keys: Vec<String> = self
            .fact_names()
            .iter()
            .map(|name| fact_key(ns, name))
            .collect();
        keys.push(fact_key(ns, "skipped"));
        keys
    }

    fn declares(&self, fact: &str) -> bool {
        self.declared_facts().iter().any(|k| k == fact)
    }

    /// Facts in scope when the learner skips the block instead of finishing it.
    fn skipped_facts(&self) -> FactTable {
        let mut facts = FactTable::new();
        facts.insert(fact_key(self.namespace(), "skipped"), true);
        facts
    }
}

pub fn fact_key(namespace: &str, name: &str) -> String {
    format!("{}.{}", namespace, name)
}

impl BlockContent {
    /// The fact provider for this block's type.
    pub fn fact_provider(&self) -> &dyn FactProvider {
        match self {
            BlockContent::Read(c) => c,
            BlockContent::Video(c) => c,
            BlockContent::Image(c) => c,
            BlockContent::Quiz(c) => c,
            BlockContent::Mission(c) => c,
            BlockContent::Form(c) => c,
            BlockContent::AiHelp(c) => c,
            BlockContent::Checkpoint(c) => c,
            BlockContent::Animation(c) => c,
            BlockContent::Code(c) => c,
            BlockContent::Exercise(c) => c,
            BlockContent::Resource(c) => c,
        }
    }
}

/// Deserialize the part of the payload a provider cares about; `null` reads as defaults.
fn view<T: DeserializeOwned + Default>(output: &BlockOutput) -> Result<T, OutputShapeError> {
    if output.payload.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(output.payload.clone()).map_err(|e| OutputShapeError(e.to_string()))
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Single-fact providers for consumption-only block types.
macro_rules! presence_provider {
    ($content:ty, $ns:literal, $fact:literal) => {
        impl FactProvider for $content {
            fn namespace(&self) -> &'static str {
                $ns
            }

            fn fact_names(&self) -> Vec<String> {
                vec![$fact.to_string()]
            }

            fn evaluate(
                &self,
                _output: &BlockOutput,
                _defaults: &ScoringDefaults,
            ) -> Result<BlockEvaluation, OutputShapeError> {
                let mut facts = FactTable::new();
                facts.insert(fact_key($ns, $fact), true);
                Ok(BlockEvaluation {
                    facts,
                    ..Default::default()
                })
            }
        }
    };
}

presence_provider!(ReadContent, "read", "completed");
presence_provider!(ImageContent, "image", "viewed");
presence_provider!(CheckpointContent, "checkpoint", "reached");
presence_provider!(AnimationContent, "animation", "completed");
presence_provider!(ResourceContent, "resource", "opened");

// ── video ──

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct VideoSubmission {
    watched_percent: Option<f64>,
}

impl FactProvider for VideoContent {
    fn namespace(&self) -> &'static str {
        "video"
    }

    fn fact_names(&self) -> Vec<String> {
        vec!["completed".into(), "watchedPercent".into()]
    }

    fn evaluate(
        &self,
        output: &BlockOutput,
        _defaults: &ScoringDefaults,
    ) -> Result<BlockEvaluation, OutputShapeError> {
        let submission: VideoSubmission = view(output)?;
        let mut facts = FactTable::new();
        facts.insert("video.completed", true);
        facts.insert("video.watchedPercent", submission.watched_percent.unwrap_or(100.0));
        Ok(BlockEvaluation {
            facts,
            ..Default::default()
        })
    }
}

// ── quiz ──

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct QuizSubmission {
    score_percent: Option<f64>,
    /// Question id -> chosen option index.
    answers: BTreeMap<String, usize>,
}

impl FactProvider for QuizContent {
    fn namespace(&self) -> &'static str {
        "quiz"
    }

    fn fact_names(&self) -> Vec<String> {
        vec![
            "scorePercent".into(),
            "passed".into(),
            "correctCount".into(),
            "questionCount".into(),
        ]
    }

    fn evaluate(
        &self,
        output: &BlockOutput,
        defaults: &ScoringDefaults,
    ) -> Result<BlockEvaluation, OutputShapeError> {
        let submission: QuizSubmission = view(output)?;

        let mut correct = 0usize;
        let mut weak = BTreeSet::new();
        if !submission.answers.is_empty() {
            for question in &self.questions {
                match submission.answers.get(&question.id) {
                    Some(choice) if *choice == question.correct_option => correct += 1,
                    _ => {
                        if let Some(topic) = &question.topic {
                            weak.insert(topic.clone());
                        }
                    }
                }
            }
        }

        let score = match submission.score_percent {
            Some(score) => Some(score),
            None if !submission.answers.is_empty() && !self.questions.is_empty() => {
                Some(percent(correct, self.questions.len()))
            }
            None => None,
        };
        let threshold = self.passing_score.or(defaults.passing_score);
        let passed = match (score, threshold) {
            (Some(score), Some(threshold)) => Some(score >= threshold),
            _ => None,
        };

        let mut facts = FactTable::new();
        if let Some(score) = score {
            facts.insert("quiz.scorePercent", score);
        }
        if let Some(passed) = passed {
            facts.insert("quiz.passed", passed);
        }
        facts.insert("quiz.correctCount", correct);
        facts.insert("quiz.questionCount", self.questions.len());

        Ok(BlockEvaluation {
            facts,
            score,
            passed,
            weak_topics: weak.into_iter().collect(),
        })
    }
}

// ── exercise ──

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ExerciseSubmission {
    score_percent: Option<f64>,
    weak_topics: Vec<String>,
}

impl FactProvider for ExerciseContent {
    fn namespace(&self) -> &'static str {
        "exercise"
    }

    fn fact_names(&self) -> Vec<String> {
        vec!["scorePercent".into(), "passed".into()]
    }

    fn evaluate(
        &self,
        output: &BlockOutput,
        defaults: &ScoringDefaults,
    ) -> Result<BlockEvaluation, OutputShapeError> {
        let submission: ExerciseSubmission = view(output)?;
        let threshold = self.passing_score.or(defaults.passing_score);
        let passed = match (submission.score_percent, threshold) {
            (Some(score), Some(threshold)) => Some(score >= threshold),
            _ => None,
        };

        let mut facts = FactTable::new();
        if let Some(score) = submission.score_percent {
            facts.insert("exercise.scorePercent", score);
        }
        if let Some(passed) = passed {
            facts.insert("exercise.passed", passed);
        }

        let weak: BTreeSet<String> = submission.weak_topics.into_iter().collect();
        Ok(BlockEvaluation {
            facts,
            score: submission.score_percent,
            passed,
            weak_topics: weak.into_iter().collect(),
        })
    }
}

// ── mission ──

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MissionSubmission {
    completed_steps: Vec<String>,
}

impl FactProvider for MissionContent {
    fn namespace(&self) -> &'static str {
        "mission"
    }

    fn fact_names(&self) -> Vec<String> {
        vec![
            "stepsCompleted".into(),
            "totalSteps".into(),
            "completed".into(),
        ]
    }

    fn evaluate(
        &self,
        output: &BlockOutput,
        _defaults: &ScoringDefaults,
    ) -> Result<BlockEvaluation, OutputShapeError> {
        let submission: MissionSubmission = view(output)?;
        let done = self
            .steps
            .iter()
            .filter(|step| submission.completed_steps.iter().any(|id| id == &step.id))
            .count();
        let total = self.steps.len();

        let mut facts = FactTable::new();
        facts.insert("mission.stepsCompleted", done);
        facts.insert("mission.totalSteps", total);
        facts.insert("mission.completed", done == total);

        Ok(BlockEvaluation {
            facts,
            score: (total > 0).then(|| percent(done, total)),
            ..Default::default()
        })
    }
}

// ── form ──

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FormSubmission {
    values: BTreeMap<String, Value>,
}

impl FactProvider for FormContent {
    fn namespace(&self) -> &'static str {
        "form"
    }

    /// `submitted`, `complete`, and one fact per declared field.
    fn fact_names(&self) -> Vec<String> {
        let mut names = vec!["submitted".to_string(), "complete".to_string()];
        names.extend(self.fields.iter().map(|f| f.id.clone()));
        names
    }

    fn evaluate(
        &self,
        output: &BlockOutput,
        _defaults: &ScoringDefaults,
    ) -> Result<BlockEvaluation, OutputShapeError> {
        let submission: FormSubmission = view(output)?;
        let mut facts = FactTable::new();
        facts.insert("form.submitted", true);

        let mut complete = true;
        for field in &self.fields {
            let value = submission.values.get(&field.id);
            let filled = match value {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.trim().is_empty(),
                Some(_) => true,
            };
            if field.required && !filled {
                complete = false;
            }
            // Only scalars become facts; undeclared keys in the payload are ignored.
            if let Some(fact) = value.and_then(FactValue::from_json) {
                facts.insert(fact_key("form", &field.id), fact);
            }
        }
        facts.insert("form.complete", complete);

        Ok(BlockEvaluation {
            facts,
            ..Default::default()
        })
    }
}

// ── ai_help ──

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AiHelpSubmission {
    turns: u32,
    resolved: bool,
}

impl FactProvider for AiHelpContent {
    fn namespace(&self) -> &'static str {
        "ai_help"
    }

    fn fact_names(&self) -> Vec<String> {
        vec!["turns".into(), "resolved".into()]
    }

    fn evaluate(
        &self,
        output: &BlockOutput,
        _defaults: &ScoringDefaults,
    ) -> Result<BlockEvaluation, OutputShapeError> {
        let submission: AiHelpSubmission = view(output)?;
        let mut facts = FactTable::new();
        facts.insert("ai_help.turns", submission.turns);
        facts.insert("ai_help.resolved", submission.resolved);
        Ok(BlockEvaluation {
            facts,
            ..Default::default()
        })
    }
}

// ── code ──

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CodeSubmission {
    passed_tests: Vec<String>,
}

impl FactProvider for CodeContent {
    fn namespace(&self) -> &'static str {
        "code"
    }

    fn fact_names(&self) -> Vec<String> {
        vec![
            "testsPassed".into(),
            "testsTotal".into(),
            "allTestsPassed".into(),
        ]
    }

    fn evaluate(
        &self,
        output: &BlockOutput,
        _defaults: &ScoringDefaults,
    ) -> Result<BlockEvaluation, OutputShapeError> {
        let submission: CodeSubmission = view(output)?;
        let passed = self
            .tests
            .iter()
            .filter(|t| submission.passed_tests.contains(t))
            .count();
        let total = self.tests.len();

        let mut facts = FactTable::new();
        facts.insert("code.testsPassed", passed);
        facts.insert("code.testsTotal", total);
        facts.insert("code.allTestsPassed", passed == total);

        Ok(BlockEvaluation {
            facts,
            score: (total > 0).then(|| percent(passed, total)),
            ..Default::default()
        })
    }
}
