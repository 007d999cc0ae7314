//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::from(ApplicationError::Domain(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(ApplicationError::Config { .. }) => {
                    crate::exitcode::CONFIG
                }
                InfraError::Application(ApplicationError::Domain(d)) => match d {
                    DomainError::SourceUnavailable { .. } => crate::exitcode::NOINPUT,
                    DomainError::MalformedReference { .. } | DomainError::InvalidToken { .. } => {
                        crate::exitcode::DATAERR
                    }
                    DomainError::InvalidNodeCount(_) => crate::exitcode::USAGE,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn given_unreadable_source_then_noinput() {
        let err = CliError::from(DomainError::SourceUnavailable {
            path: PathBuf::from("missing.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        });
        assert_eq!(err.exit_code(), crate::exitcode::NOINPUT);
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn given_malformed_reference_then_dataerr() {
        let err = CliError::from(DomainError::MalformedReference { line: 3, value: 9 });
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_usage_error_then_usage_code() {
        assert_eq!(
            CliError::Usage("no tree file".into()).exit_code(),
            crate::exitcode::USAGE
        );
    }
}
