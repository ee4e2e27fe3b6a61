// ⚠️ Error Taxonomy - every failure the calculator can report
// Validation and registry errors surface at the dispatcher and never end the REPL

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CalcError>;

#[derive(Debug, Error)]
pub enum CalcError {
    /// Operand could not be turned into a decimal (non-numeric, boolean, composite, null)
    #[error("Invalid input for '{position}': {argument} (type: {type_name}) - {reason}")]
    Type {
        argument: String,
        position: String,
        type_name: String,
        reason: String,
    },

    #[error("Operation '{name}' already registered")]
    Duplicate { name: String },

    #[error("Operation '{name}' not found")]
    NotFound { name: String },

    #[error("Division by zero is not allowed")]
    DivideByZero,

    /// Wrong token or operand count
    #[error("Invalid format: {0}")]
    MalformedInput(String),

    /// Anything unexpected during computation (overflow, failed sqrt)
    #[error("Internal error: {0}")]
    Internal(String),

    /// History file could not be written
    #[error("History persistence failed: {0:#}")]
    Persistence(#[from] anyhow::Error),
}

impl CalcError {
    pub fn type_error(
        argument: impl Into<String>,
        position: impl Into<String>,
        type_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::Type {
            argument: argument.into(),
            position: position.into(),
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Short machine-friendly kind, used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            CalcError::Type { .. } => "type",
            CalcError::Duplicate { .. } => "duplicate",
            CalcError::NotFound { .. } => "not_found",
            CalcError::DivideByZero => "divide_by_zero",
            CalcError::MalformedInput(_) => "malformed_input",
            CalcError::Internal(_) => "internal",
            CalcError::Persistence(_) => "persistence",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_error_message_names_position_and_type() {
        let err = CalcError::type_error("abc", "a", "str", "Expected a number.");
        assert_eq!(
            err.to_string(),
            "Invalid input for 'a': abc (type: str) - Expected a number."
        );
        assert_eq!(err.kind(), "type");
    }

    #[test]
    fn test_persistence_wraps_anyhow_context() {
        let err: CalcError = anyhow::anyhow!("disk full").context("Failed to write history").into();
        assert_eq!(err.kind(), "persistence");
        assert!(err.to_string().contains("disk full"));
    }
}
