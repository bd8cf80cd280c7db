use crate::domain::model::{ComparisonOperator, FactValue};

use super::type_coercion::{compare_numeric, CoercionError};

/// Strict-type equality: values of different types are never equal.
pub fn equal(value: &FactValue, target: &FactValue) -> bool {
    match (value, target) {
        (FactValue::Number(a), FactValue::Number(b)) => a == b,
        (FactValue::Text(a), FactValue::Text(b)) => a == b,
        (FactValue::Bool(a), FactValue::Bool(b)) => a == b,
        _ => false,
    }
}

/// Apply `op` to `value` (left) and `target` (right).
pub fn apply(
    op: ComparisonOperator,
    value: &FactValue,
    target: &FactValue,
) -> Result<bool, CoercionError> {
    match op {
        ComparisonOperator::Eq => Ok(equal(value, target)),
        ComparisonOperator::Gte => compare_numeric(value, target, |a, b| a >= b),
        ComparisonOperator::Gt => compare_numeric(value, target, |a, b| a > b),
        ComparisonOperator::Lte => compare_numeric(value, target, |a, b| a <= b),
        ComparisonOperator::Lt => compare_numeric(value, target, |a, b| a < b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_is_strict() {
        assert!(equal(&FactValue::Number(50.0), &FactValue::Number(50.0)));
        assert!(!equal(&FactValue::Number(50.0), &FactValue::Text("50".into())));
        assert!(!equal(&FactValue::Bool(true), &FactValue::Text("true".into())));
        assert!(!equal(&FactValue::Bool(true), &FactValue::Number(1.0)));
    }

    #[test]
    fn test_ordering_coerces() {
        let score = FactValue::Number(50.0);
        assert!(apply(ComparisonOperator::Gte, &score, &FactValue::Text("50".into())).unwrap());
        assert!(!apply(ComparisonOperator::Gt, &score, &FactValue::Number(50.0)).unwrap());
        assert!(apply(ComparisonOperator::Lte, &score, &FactValue::Number(50.0)).unwrap());
        assert!(apply(ComparisonOperator::Lt, &FactValue::Bool(false), &score).unwrap());
    }

    #[test]
    fn test_ordering_on_text_fails() {
        assert!(apply(
            ComparisonOperator::Gte,
            &FactValue::Text("high".into()),
            &FactValue::Number(1.0)
        )
        .is_err());
    }
}
