//! Remediation error types.

use crate::client::ClientError;
use crate::license::LicenseError;
use crate::repository::ForkError;
use thiserror::Error;

/// Errors that abort a remediation, one variant per step.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// Rendering the expected license failed.
    #[error("failed to render license: {0}")]
    Render(#[from] LicenseError),

    /// Repository record has no default branch.
    #[error("repository {repository} has no default branch")]
    NoDefaultBranch { repository: String },

    /// Fetching the default branch failed.
    #[error("failed to get default branch {branch} for {repository}: {source}")]
    DefaultBranch {
        repository: String,
        branch: String,
        #[source]
        source: ClientError,
    },

    /// Fetching the head commit of the default branch failed.
    #[error("failed to get latest commit for branch {branch}: {source}")]
    LatestCommit {
        branch: String,
        #[source]
        source: ClientError,
    },

    /// Finding or creating a fork failed.
    #[error("failed to get fork of repository for current authenticated user: {0}")]
    Fork(#[from] ForkError),

    /// Checking the rate limit failed.
    #[error("failed to check rate limit: {0}")]
    RateLimit(#[source] ClientError),

    #[error("failed to create tree: {0}")]
    Tree(#[source] ClientError),

    #[error("failed to create commit: {0}")]
    Commit(#[source] ClientError),

    /// Creating the branch failed, e.g. because it already exists.
    #[error("failed to create reference {reference}: {source}")]
    Reference {
        reference: String,
        #[source]
        source: ClientError,
    },

    #[error("failed to create PR: {0}")]
    PullRequest(#[source] ClientError),

    /// Writing progress to the output sink failed.
    #[error("failed to write progress: {0}")]
    Output(#[from] std::io::Error),
}
