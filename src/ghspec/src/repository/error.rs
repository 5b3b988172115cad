//! Repository error types.

use crate::client::ClientError;
use thiserror::Error;

/// Errors raised while listing repositories or gathering their state.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Listing the repositories of a scope failed.
    #[error("failed to retrieve repositories of {scope}: {source}")]
    List {
        scope: String,
        #[source]
        source: ClientError,
    },

    /// A named repository could not be fetched.
    #[error("failed to get repository {repository}: {source}")]
    Get {
        repository: String,
        #[source]
        source: ClientError,
    },

    /// Fetching a piece of repository state failed.
    #[error("failed to get {what} for {repository}: {source}")]
    Gather {
        repository: String,
        what: &'static str,
        #[source]
        source: ClientError,
    },
}

/// Errors raised while finding, creating or waiting for a fork.
#[derive(Debug, Error)]
pub enum ForkError {
    /// Looking up existing forks failed.
    #[error("failed to look up forks of {repository}: {source}")]
    Lookup {
        repository: String,
        #[source]
        source: ClientError,
    },

    /// The fork request was rejected.
    #[error("failed to create fork of {repository}: {source}")]
    Create {
        repository: String,
        #[source]
        source: ClientError,
    },

    /// The fork did not become usable before the deadline.
    #[error("timed out after waiting {timeout_secs} seconds for fork to be created")]
    TimedOut { timeout_secs: u64 },

    /// The polling task ended without reporting a result.
    #[error("fork readiness check ended unexpectedly")]
    WaiterDropped,
}
