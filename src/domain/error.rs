//! Domain-level errors (no external dependencies)

use std::path::PathBuf;
use thiserror::Error;

/// Domain errors represent tree construction failures.
/// A missing escape value or an empty tree is an outcome, never an error.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("cannot read tree description: {}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: parent value {value} does not name an existing node")]
    MalformedReference { line: usize, value: i64 },

    #[error("line {line}: not an integer: {token:?}")]
    InvalidToken { line: usize, token: String },

    #[error("node count must be at least 1, got {0}")]
    InvalidNodeCount(usize),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
