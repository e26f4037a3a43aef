//! Error types for cellgrid core.

use thiserror::Error;

use cellgrid_engine::engine::{CycleError, FormulaError};

/// Errors that can occur while editing, loading or saving a sheet.
///
/// The first three abort a single edit and leave the sheet untouched.
/// Evaluation failures are not errors; they are stored as cell values.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("Invalid cell name: {0}")]
    InvalidName(String),

    #[error("Malformed formula in {name}: {source}")]
    MalformedFormula {
        name: String,
        #[source]
        source: FormulaError,
    },

    #[error("Malformed formula: {0}")]
    InvalidFormula(#[source] FormulaError),

    #[error("Circular dependency detected: {0}")]
    CircularDependency(#[from] CycleError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Version mismatch: expected '{expected}', found '{found}'")]
    VersionMismatch { expected: String, found: String },

    #[error("No file path set")]
    NoFilePath,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}

pub type Result<T> = std::result::Result<T, GridError>;
