use crate::domain::model::{Condition, ConditionGroup, Edge};

use super::facts::FactTable;
use super::operators;

/// Evaluate a condition group against a fact table. All conditions must hold.
///
/// Never fails: a missing fact, or an operand that cannot be coerced to a
/// number, makes its condition false.
pub fn evaluate(group: &ConditionGroup, facts: &FactTable) -> bool {
    group.all.iter().all(|cond| evaluate_condition(cond, facts))
}

/// Evaluate a single condition
pub fn evaluate_condition(cond: &Condition, facts: &FactTable) -> bool {
    let Some(actual) = facts.get(&cond.fact) else {
        return false;
    };
    operators::apply(cond.op, actual, &cond.value).unwrap_or(false)
}

/// An edge qualifies when it has no condition or its condition holds.
pub fn edge_matches(edge: &Edge, facts: &FactTable) -> bool {
    match &edge.condition {
        None => true,
        Some(group) => evaluate(group, facts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ComparisonOperator, FactValue};

    fn quiz_facts(score: f64) -> FactTable {
        let mut facts = FactTable::new();
        facts.insert("quiz.scorePercent", score);
        facts.insert("quiz.passed", score >= 50.0);
        facts
    }

    #[test]
    fn test_missing_fact_is_false() {
        let facts = FactTable::new();
        for op in [
            ComparisonOperator::Eq,
            ComparisonOperator::Gte,
            ComparisonOperator::Gt,
            ComparisonOperator::Lte,
            ComparisonOperator::Lt,
        ] {
            let cond = Condition::new("quiz.scorePercent", op, 0.0);
            assert!(!evaluate_condition(&cond, &facts));
        }
    }

    #[test]
    fn test_boundary_routing() {
        let gte = Condition::new("quiz.scorePercent", ComparisonOperator::Gte, 50.0);
        let lt = Condition::new("quiz.scorePercent", ComparisonOperator::Lt, 50.0);

        let facts = quiz_facts(50.0);
        assert!(evaluate_condition(&gte, &facts));
        assert!(!evaluate_condition(&lt, &facts));

        let facts = quiz_facts(49.999);
        assert!(!evaluate_condition(&gte, &facts));
        assert!(evaluate_condition(&lt, &facts));
    }

    #[test]
    fn test_group_is_conjunction() {
        let facts = quiz_facts(80.0);
        let group = ConditionGroup::all(vec![
            Condition::new("quiz.scorePercent", ComparisonOperator::Gt, 70.0),
            Condition::new("quiz.passed", ComparisonOperator::Eq, true),
        ]);
        assert!(evaluate(&group, &facts));

        let group = ConditionGroup::all(vec![
            Condition::new("quiz.scorePercent", ComparisonOperator::Gt, 70.0),
            Condition::new("quiz.attempts", ComparisonOperator::Lt, 3.0),
        ]);
        assert!(!evaluate(&group, &facts));
    }

    #[test]
    fn test_empty_group_holds() {
        assert!(evaluate(&ConditionGroup::default(), &FactTable::new()));
    }

    #[test]
    fn test_uncoercible_operand_is_false() {
        let mut facts = FactTable::new();
        facts.insert("form.level", "advanced");
        let cond = Condition::new("form.level", ComparisonOperator::Gte, 3.0);
        assert!(!evaluate_condition(&cond, &facts));
        let cond = Condition::new("form.level", ComparisonOperator::Eq, FactValue::from("advanced"));
        assert!(evaluate_condition(&cond, &facts));
    }

    #[test]
    fn test_edge_matches() {
        let facts = quiz_facts(10.0);
        assert!(edge_matches(&Edge::new("a", "b"), &facts));
        let gated = Edge::new("a", "b").when(ConditionGroup::all(vec![Condition::new(
            "quiz.passed",
            ComparisonOperator::Eq,
            true,
        )]));
        assert!(!edge_matches(&gated, &facts));
    }
}
