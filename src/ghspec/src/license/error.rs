//! License error types.

use crate::client::ClientError;
use thiserror::Error;

/// Problems building a [`Registry`](super::Registry).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Keys and aliases must be lowercase.
    #[error("license identifier must be lowercase, but {value} != {lower}")]
    NotLowercase { value: String, lower: String },

    /// A key or alias was registered twice.
    #[error("failed to register {{{name}: {key}}} because entry already exists: {{{name}: {existing}}}")]
    Duplicate {
        name: String,
        key: String,
        existing: String,
    },
}

/// Errors produced while fetching, rendering or verifying licenses.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Repository has no detectable license.
    #[error("{message}")]
    Missing { message: String },

    /// Repository license does not match the expected content.
    #[error("{message}")]
    Incorrect { message: String, diff: String },

    /// The license template could not be fetched.
    #[error("failed to get license {key}: {source}")]
    Fetch {
        key: String,
        #[source]
        source: ClientError,
    },

    /// The fetched template does not hash to the registered checksum.
    #[error("SHA-256 sums for license {key} do not match: expected {expected}, was {actual}")]
    ChecksumMismatch {
        key: String,
        expected: String,
        actual: String,
    },

    /// Template requires an author but none was supplied.
    #[error("{key} license is templated with author information, but none was provided")]
    MissingAuthor { key: String },

    /// Repository license content could not be decoded.
    #[error("failed to decode license content of {path}: {message}")]
    Decode { path: String, message: String },
}

impl LicenseError {
    /// Whether the repository has no detectable license.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }

    /// Whether the repository license differs from the expected content.
    #[must_use]
    pub fn is_incorrect(&self) -> bool {
        matches!(self, Self::Incorrect { .. })
    }

    /// Unified diff for an incorrect license, empty otherwise.
    #[must_use]
    pub fn diff(&self) -> &str {
        match self {
            Self::Incorrect { diff, .. } => diff,
            _ => "",
        }
    }
}
