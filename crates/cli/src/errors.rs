//! CLI error types rendered through miette

use miette::Diagnostic;
use secretchain::SecretError;
use thiserror::Error;

/// Errors the CLI reports before exiting non-zero
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("No secret store configuration given")]
    #[diagnostic(
        code(secretchain::cli::missing_config),
        help("Pass --config <path> or set SECRETCHAIN_CONFIG")
    )]
    MissingConfig,

    #[error(transparent)]
    #[diagnostic(code(secretchain::cli::configuration))]
    Configuration(SecretError),

    #[error(transparent)]
    #[diagnostic(
        code(secretchain::cli::not_found),
        help("Run with --log-level trace to see why each backend skipped the secret")
    )]
    NotFound(SecretError),

    #[error(transparent)]
    #[diagnostic(code(secretchain::cli::invalid_argument))]
    InvalidArgument(SecretError),

    #[error(transparent)]
    #[diagnostic(code(secretchain::cli::resolution_failed))]
    ResolutionFailed(SecretError),

    #[error("Failed to write output")]
    #[diagnostic(code(secretchain::cli::output))]
    Output(#[from] std::io::Error),
}

impl From<SecretError> for CliError {
    fn from(error: SecretError) -> Self {
        match error {
            SecretError::Configuration { .. } => Self::Configuration(error),
            SecretError::NotFound { .. } => Self::NotFound(error),
            SecretError::InvalidArgument { .. } => Self::InvalidArgument(error),
            SecretError::ResolutionFailed { .. } => Self::ResolutionFailed(error),
        }
    }
}
