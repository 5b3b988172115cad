//! Hosting client error types.

use thiserror::Error;

/// Errors returned by a [`HostingClient`](super::HostingClient).
#[derive(Debug, Error)]
pub enum ClientError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),

    /// Resource does not exist (HTTP 404).
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Caller lacks permission for the resource (HTTP 403).
    #[error("access to {resource} is forbidden")]
    Forbidden { resource: String },

    /// Repository has no commits (HTTP 404 on contents with "This repository is empty.").
    #[error("repository {repository} is empty")]
    EmptyRepository { repository: String },

    /// Response could not be interpreted.
    #[error("unexpected response for {resource}: {message}")]
    Unexpected { resource: String, message: String },
}

impl ClientError {
    /// Whether the error means the resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the error means access was denied.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    /// Whether the error means the repository has no content.
    #[must_use]
    pub fn is_empty_repository(&self) -> bool {
        matches!(self, Self::EmptyRepository { .. })
    }
}
