//! Definition error types.

use thiserror::Error;

/// Errors raised while loading, saving or indexing definitions.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// Failed to read or write a declaration file.
    #[error("Failed to access file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("Failed to parse definitions in '{path}': {source}")]
    YamlError {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Failed to serialize definitions.
    #[error("Failed to serialize definitions: {0}")]
    SerializeError(#[from] serde_yaml::Error),

    /// Two definitions share a name (compared case-insensitively).
    #[error("duplicate definition for repository {name}")]
    Duplicate { name: String },
}
