use std::collections::HashMap;

use crate::domain::model::{Block, BlockContent, FactValue, GraphDefinition};
use crate::evaluator::type_coercion::to_f64;

use super::layer2_topology::TopologyInfo;
use super::types::Diagnostic;

/// Content and condition checks against each block's declared facts.
pub fn validate(graph: &GraphDefinition, topo: &TopologyInfo) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let blocks: HashMap<&str, &Block> = graph.blocks.iter().map(|b| (b.id.as_str(), b)).collect();

    for block in &graph.blocks {
        validate_content(block, &mut diags);
    }

    for (i, edge) in graph.edges.iter().enumerate() {
        let Some(group) = &edge.condition else {
            continue;
        };
        // Dangling sources are reported by the structure layer.
        let Some(source) = blocks.get(edge.from.as_str()) else {
            continue;
        };
        let provider = source.content.fact_provider();

        for (c, cond) in group.all.iter().enumerate() {
            let path = format!("edges[{}].condition.all[{}]", i, c);
            if !provider.declares(&cond.fact) {
                let mut d = Diagnostic::warning(
                    "W201",
                    format!(
                        "Fact '{}' is never produced by {} block '{}'; the condition will not match",
                        cond.fact,
                        source.block_type(),
                        source.id
                    ),
                )
                .on_block(&source.id)
                .on_edge(i)
                .at(format!("{}.fact", path));
                if !topo.reachable.is_empty() && !topo.reachable.contains(&source.id) {
                    d.message.push_str(" (source block is unreachable)");
                }
                diags.push(d);
            }
            if cond.op.is_numeric() {
                if let FactValue::Text(_) = &cond.value {
                    if to_f64(&cond.value).is_err() {
                        diags.push(
                            Diagnostic::warning(
                                "W205",
                                format!(
                                    "Operator '{}' compares numerically but value {} is not numeric",
                                    cond.op, cond.value
                                ),
                            )
                            .on_block(&source.id)
                            .on_edge(i)
                            .at(format!("{}.value", path)),
                        );
                    }
                }
            }
        }
    }

    diags
}

fn validate_content(block: &Block, diags: &mut Vec<Diagnostic>) {
    match &block.content {
        BlockContent::Quiz(quiz) => {
            check_passing_score(block, quiz.passing_score, diags);
            if quiz.questions.is_empty() {
                diags.push(
                    Diagnostic::warning("W203", "Quiz has no questions")
                        .on_block(&block.id)
                        .at("content.questions"),
                );
            }
            for (q, question) in quiz.questions.iter().enumerate() {
                if question.correct_option >= question.options.len() {
                    diags.push(
                        Diagnostic::warning(
                            "W206",
                            format!(
                                "Question '{}' marks option {} correct but has {} options",
                                question.id,
                                question.correct_option,
                                question.options.len()
                            ),
                        )
                        .on_block(&block.id)
                        .at(format!("content.questions[{}].correctOption", q)),
                    );
                }
            }
        }
        BlockContent::Exercise(exercise) => {
            check_passing_score(block, exercise.passing_score, diags);
        }
        BlockContent::Mission(mission) if mission.steps.is_empty() => {
            diags.push(
                Diagnostic::warning("W204", "Mission has no steps")
                    .on_block(&block.id)
                    .at("content.steps"),
            );
        }
        _ => {}
    }
}

fn check_passing_score(block: &Block, score: Option<f64>, diags: &mut Vec<Diagnostic>) {
    if let Some(score) = score {
        if !(0.0..=100.0).contains(&score) {
            diags.push(
                Diagnostic::warning(
                    "W202",
                    format!("Passing score {} is outside 0-100", score),
                )
                .on_block(&block.id)
                .at("content.passingScore"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        ComparisonOperator, Condition, ConditionGroup, Edge, MissionContent, QuizContent,
        QuizQuestion, ReadContent,
    };

    fn codes(diags: &[Diagnostic]) -> Vec<&str> {
        diags.iter().map(|d| d.code.as_str()).collect()
    }

    fn quiz(passing: Option<f64>) -> Block {
        Block::new(
            "quiz",
            BlockContent::Quiz(QuizContent {
                questions: vec![QuizQuestion {
                    id: "q1".into(),
                    options: vec!["a".into(), "b".into()],
                    correct_option: 1,
                    ..Default::default()
                }],
                passing_score: passing,
            }),
        )
    }

    fn graph(blocks: Vec<Block>, edges: Vec<Edge>) -> GraphDefinition {
        GraphDefinition {
            start_block_id: "quiz".into(),
            blocks,
            edges,
        }
    }

    #[test]
    fn test_declared_fact_ok() {
        let g = graph(
            vec![quiz(Some(50.0)), Block::new("next", BlockContent::Read(ReadContent::default()))],
            vec![Edge::new("quiz", "next").when(ConditionGroup::all(vec![Condition::new(
                "quiz.scorePercent",
                ComparisonOperator::Gte,
                50.0,
            )]))],
        );
        assert!(validate(&g, &TopologyInfo::default()).is_empty());
    }

    #[test]
    fn test_undeclared_fact() {
        let g = graph(
            vec![quiz(None), Block::new("next", BlockContent::Read(ReadContent::default()))],
            vec![Edge::new("quiz", "next").when(ConditionGroup::all(vec![Condition::new(
                "video.watchedPercent",
                ComparisonOperator::Gte,
                50.0,
            )]))],
        );
        let diags = validate(&g, &TopologyInfo::default());
        assert_eq!(codes(&diags), vec!["W201"]);
        assert_eq!(diags[0].edge_index, Some(0));
    }

    #[test]
    fn test_non_numeric_value() {
        let g = graph(
            vec![quiz(None), Block::new("next", BlockContent::Read(ReadContent::default()))],
            vec![Edge::new("quiz", "next").when(ConditionGroup::all(vec![Condition::new(
                "quiz.scorePercent",
                ComparisonOperator::Gt,
                "high",
            )]))],
        );
        assert_eq!(codes(&validate(&g, &TopologyInfo::default())), vec!["W205"]);
    }

    #[test]
    fn test_content_checks() {
        let g = graph(
            vec![
                quiz(Some(120.0)),
                Block::new("empty", BlockContent::Quiz(QuizContent::default())),
                Block::new("mission", BlockContent::Mission(MissionContent::default())),
            ],
            vec![],
        );
        let diags = validate(&g, &TopologyInfo::default());
        assert_eq!(codes(&diags), vec!["W202", "W203", "W204"]);
    }

    #[test]
    fn test_correct_option_out_of_range() {
        let mut block = quiz(None);
        if let BlockContent::Quiz(q) = &mut block.content {
            q.questions[0].correct_option = 5;
        }
        let diags = validate(&graph(vec![block], vec![]), &TopologyInfo::default());
        assert_eq!(codes(&diags), vec!["W206"]);
    }
}
