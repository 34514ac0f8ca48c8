//! Unified error hierarchy for SquadLoad
//!
//! Structured error types for import, validation, calculation and export,
//! with severity levels that map onto the tracing system.

use std::path::PathBuf;
use thiserror::Error;

use crate::export::ExportError;

/// Top-level error type for all SquadLoad operations
#[derive(Debug, Error)]
pub enum SquadLoadError {
    /// Table-level import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Row-level data validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Calculation errors
    #[error("Calculation error: {0}")]
    Calculation(#[from] CalculationError),

    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// CSV reader/writer errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Errors raised while reading and normalizing a tabular export
#[derive(Debug, Error)]
pub enum ImportError {
    /// File not found at specified path
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Export has no header row
    #[error("No header row found in {source_name}")]
    EmptyTable { source_name: String },

    /// A required canonical column is absent after normalization
    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    /// Two source headers normalized onto the same canonical column
    #[error("Duplicate column after normalization: {column}")]
    DuplicateColumn { column: String },

    /// Strict header mode rejected headers that are neither canonical nor mapped
    #[error("Unrecognized columns: {}", columns.join(", "))]
    UnrecognizedColumns { columns: Vec<String> },

    /// A row has a different number of cells than the header
    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Cell-level validation failures. Rows are 1-based data rows (header excluded).
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Numeric field could not be parsed, was negative, or was not a whole count
    #[error("Invalid number in row {row}, column '{column}': '{value}' ({reason})")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    /// Date could not be parsed in any supported format
    #[error("Invalid date in row {row}: '{value}'")]
    InvalidDate { row: usize, value: String },

    /// Required text field was blank
    #[error("Missing value in row {row}, column '{column}'")]
    MissingValue { row: usize, column: String },

    /// Enumerated field had an unknown value
    #[error("Invalid value in row {row}, column '{column}': {reason}")]
    InvalidValue {
        row: usize,
        column: String,
        reason: String,
    },
}

/// Calculation errors
#[derive(Debug, Error, PartialEq)]
pub enum CalculationError {
    /// Invalid parameter
    #[error("Invalid parameter for {calculation}: {parameter}={value}")]
    InvalidParameter {
        calculation: String,
        parameter: String,
        value: String,
    },

    /// Benchmark set lookup failed
    #[error("Unknown benchmark set: {name}")]
    UnknownBenchmarkSet { name: String },
}

/// Result type alias for SquadLoad operations
pub type Result<T> = std::result::Result<T, SquadLoadError>;

impl SquadLoadError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SquadLoadError::Import(ImportError::FileNotFound { .. }) => ErrorSeverity::Warning,
            SquadLoadError::Import(ImportError::EmptyTable { .. }) => ErrorSeverity::Warning,
            SquadLoadError::Validation(_) => ErrorSeverity::Error,
            SquadLoadError::Configuration(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Emit a tracing event for this error at its severity level
    pub fn log_event(&self) -> tracing::Level {
        let severity = self.severity();
        let level = severity.to_tracing_level();
        if level == tracing::Level::WARN {
            tracing::warn!(error = %self, ?severity, "Command failed");
        } else {
            tracing::error!(error = %self, ?severity, "Command failed");
        }
        level
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            SquadLoadError::Import(ImportError::FileNotFound { path }) => {
                format!("Could not find GPS export: {}", path.display())
            }
            SquadLoadError::Import(ImportError::MissingColumn { column }) => {
                format!(
                    "The export has no '{}' column. Check the vendor header names.",
                    column
                )
            }
            SquadLoadError::Validation(ValidationError::InvalidNumber {
                row, column, value, ..
            }) => {
                format!(
                    "Row {} has '{}' in '{}', which is not a valid measurement.",
                    row, value, column
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical error requiring immediate attention
    Critical,
    /// Error that prevents the operation
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
