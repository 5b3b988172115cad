//! Runner error types.

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Hosting client errors outside per-repository processing.
    #[error(transparent)]
    Client(#[from] crate::client::ClientError),

    /// Repository listing errors.
    #[error(transparent)]
    Repository(#[from] crate::repository::RepositoryError),

    /// Declaration file errors.
    #[error(transparent)]
    Definition(#[from] crate::definition::DefinitionError),

    /// License rendering errors.
    #[error(transparent)]
    License(#[from] crate::license::LicenseError),

    /// The command needs an organization or user.
    #[error("either user or organization must be provided")]
    MissingScope,

    /// Writing progress or reading a prompt answer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
