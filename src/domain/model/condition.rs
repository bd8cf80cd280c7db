use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operators used by edge conditions.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    #[serde(alias = "=", alias = "==", alias = "equal")]
    Eq,
    #[serde(alias = ">=", alias = "≥", alias = "greater_or_equal")]
    Gte,
    #[serde(alias = ">", alias = "greater_than")]
    Gt,
    #[serde(alias = "<=", alias = "≤", alias = "less_or_equal")]
    Lte,
    #[serde(alias = "<", alias = "less_than")]
    Lt,
}

impl ComparisonOperator {
    /// Ordering operators coerce both operands to numbers; `eq` does not.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, ComparisonOperator::Eq)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "eq",
            ComparisonOperator::Gte => "gte",
            ComparisonOperator::Gt => "gt",
            ComparisonOperator::Lte => "lte",
            ComparisonOperator::Lt => "lt",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scalar fact, or the right-hand operand of a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FactValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FactValue::Bool(_) => "bool",
            FactValue::Number(_) => "number",
            FactValue::Text(_) => "string",
        }
    }

    /// Convert a JSON scalar. Arrays, objects and null have no fact form.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(FactValue::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(FactValue::Number),
            serde_json::Value::String(s) => Some(FactValue::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Bool(b) => write!(f, "{}", b),
            FactValue::Number(n) => write!(f, "{}", n),
            FactValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for FactValue {
    fn from(value: bool) -> Self {
        FactValue::Bool(value)
    }
}

impl From<f64> for FactValue {
    fn from(value: f64) -> Self {
        FactValue::Number(value)
    }
}

impl From<u32> for FactValue {
    fn from(value: u32) -> Self {
        FactValue::Number(f64::from(value))
    }
}

impl From<usize> for FactValue {
    fn from(value: usize) -> Self {
        FactValue::Number(value as f64)
    }
}

impl From<&str> for FactValue {
    fn from(value: &str) -> Self {
        FactValue::Text(value.to_string())
    }
}

impl From<String> for FactValue {
    fn from(value: String) -> Self {
        FactValue::Text(value)
    }
}

/// A single comparison against a dot-path fact, e.g. `quiz.scorePercent >= 50`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub fact: String,
    pub op: ComparisonOperator,
    pub value: FactValue,
}

impl Condition {
    pub fn new(fact: impl Into<String>, op: ComparisonOperator, value: impl Into<FactValue>) -> Self {
        Self {
            fact: fact.into(),
            op,
            value: value.into(),
        }
    }
}

/// Conjunction of conditions. Only `all` exists; there is no OR/NOT.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionGroup {
    #[serde(default)]
    pub all: Vec<Condition>,
}

impl ConditionGroup {
    pub fn all(conditions: Vec<Condition>) -> Self {
        Self { all: conditions }
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_aliases() {
        let op: ComparisonOperator = serde_json::from_str("\">=\"").unwrap();
        assert_eq!(op, ComparisonOperator::Gte);
        let op: ComparisonOperator = serde_json::from_str("\"lt\"").unwrap();
        assert_eq!(op, ComparisonOperator::Lt);
        assert!(serde_json::from_str::<ComparisonOperator>("\"contains\"").is_err());
    }

    #[test]
    fn test_fact_value_untagged() {
        let v: FactValue = serde_json::from_str("50").unwrap();
        assert_eq!(v, FactValue::Number(50.0));
        let v: FactValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, FactValue::Bool(true));
        let v: FactValue = serde_json::from_str("\"50\"").unwrap();
        assert_eq!(v, FactValue::Text("50".into()));
    }

    #[test]
    fn test_condition_group_shape() {
        let json = r#"{"all":[{"fact":"quiz.scorePercent","op":"gte","value":50}]}"#;
        let group: ConditionGroup = serde_json::from_str(json).unwrap();
        assert_eq!(group.all.len(), 1);
        assert_eq!(group.all[0].fact, "quiz.scorePercent");
        assert_eq!(group.all[0].value, FactValue::Number(50.0));
    }
}
