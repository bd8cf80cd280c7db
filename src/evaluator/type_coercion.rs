use thiserror::Error;

use crate::domain::model::FactValue;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    #[error("Cannot convert '{0}' to number")]
    NotNumeric(String),
}

/// Coerce a fact to `f64` for ordering comparisons.
pub fn to_f64(value: &FactValue) -> Result<f64, CoercionError> {
    match value {
        FactValue::Number(n) => Ok(*n),
        FactValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        FactValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| CoercionError::NotNumeric(s.clone())),
    }
}

/// Compare two values numerically.
pub fn compare_numeric<F>(
    value: &FactValue,
    target: &FactValue,
    compare_fn: F,
) -> Result<bool, CoercionError>
where
    F: Fn(f64, f64) -> bool,
{
    let a = to_f64(value)?;
    let b = to_f64(target)?;
    Ok(compare_fn(a, b))
}
