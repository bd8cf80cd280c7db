//! Validation diagnostic types.

use serde::{Deserialize, Serialize};

/// Severity level of a validation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

/// A single validation finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub code: String,
    pub message: String,
    pub block_id: Option<String>,
    /// Declaration index of the edge in `GraphDefinition::edges`.
    pub edge_index: Option<usize>,
    pub field_path: Option<String>,
}

impl Diagnostic {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, code, message)
    }

    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warning, code, message)
    }

    fn new(level: DiagnosticLevel, code: &str, message: impl Into<String>) -> Self {
        Diagnostic {
            level,
            code: code.to_string(),
            message: message.into(),
            block_id: None,
            edge_index: None,
            field_path: None,
        }
    }

    pub fn on_block(mut self, block_id: impl Into<String>) -> Self {
        self.block_id = Some(block_id.into());
        self
    }

    pub fn on_edge(mut self, index: usize) -> Self {
        self.edge_index = Some(index);
        self
    }

    pub fn at(mut self, field_path: impl Into<String>) -> Self {
        self.field_path = Some(field_path.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == DiagnosticLevel::Error
    }
}

/// Aggregated result of graph validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let is_valid = diagnostics.iter().all(|d| !d.is_error());
        ValidationReport {
            is_valid,
            diagnostics,
        }
    }

    /// Return only the error-level diagnostics.
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error()).collect()
    }

    /// Return only the warning-level diagnostics.
    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warning)
            .collect()
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.diagnostics.iter().any(|d| d.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_validity_follows_errors() {
        let report = ValidationReport::from_diagnostics(vec![
            Diagnostic::warning("W101", "unreachable").on_block("b"),
        ]);
        assert!(report.is_valid);
        assert_eq!(report.warnings().len(), 1);
        assert!(report.errors().is_empty());

        let report = ValidationReport::from_diagnostics(vec![
            Diagnostic::error("E001", "dup").on_block("a"),
            Diagnostic::warning("W003", "dangling").on_edge(2),
        ]);
        assert!(!report.is_valid);
        assert_eq!(report.errors().len(), 1);
        assert!(report.has_code("W003"));
        assert!(!report.has_code("W004"));
    }

    #[test]
    fn test_diagnostic_builders() {
        let d = Diagnostic::warning("W202", "out of range")
            .on_block("quiz")
            .at("content.passingScore");
        assert_eq!(d.block_id.as_deref(), Some("quiz"));
        assert_eq!(d.field_path.as_deref(), Some("content.passingScore"));
        assert_eq!(d.edge_index, None);
        assert!(!d.is_error());
    }

    #[test]
    fn test_report_serde_roundtrip() {
        let report = ValidationReport::from_diagnostics(vec![Diagnostic::error("E000", "bad")]);
        let json = serde_json::to_string(&report).unwrap();
        let back: ValidationReport = serde_json::from_str(&json).unwrap();
        assert!(!back.is_valid);
        assert_eq!(back.diagnostics[0].code, "E000");
    }
}
