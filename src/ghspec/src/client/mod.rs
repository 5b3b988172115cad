//! Access to the repository hosting service.
//!
//! Everything that talks to GitHub goes through the [`HostingClient`] trait so
//! that the verification and remediation logic can run against an in-memory
//! implementation in tests. [`GitHubClient`] is the production implementation.

mod error;
mod github;
mod models;

pub use error::ClientError;
pub use github::GitHubClient;
pub use models::{
    Branch, Collaborator, Commit, CommitPointer, ContentEntry, License, LicenseRef,
    NewPullRequest, Owner, Permissions, PullRequest, RepoLicense, RepoRecord, TreeEntry,
    TreePointer,
};

use crate::rate_limit::RateLimitInfo;
use async_trait::async_trait;

/// Operations ghspec performs against the hosting service.
///
/// Listing operations return every page of results.
#[async_trait]
pub trait HostingClient: Send + Sync {
    /// Lists all repositories of an organization.
    async fn list_org_repos(&self, org: &str) -> Result<Vec<RepoRecord>, ClientError>;

    /// Lists all public repositories of a user.
    async fn list_user_repos(&self, user: &str) -> Result<Vec<RepoRecord>, ClientError>;

    /// Lists repositories owned by the authenticated user.
    async fn list_owned_repos(&self) -> Result<Vec<RepoRecord>, ClientError>;

    /// Fetches a single repository by owner and name.
    async fn get_repo(&self, owner: &str, name: &str) -> Result<RepoRecord, ClientError>;

    /// Fetches a single repository by numeric id. The record includes `source` for forks.
    async fn get_repo_by_id(&self, id: u64) -> Result<RepoRecord, ClientError>;

    /// Fetches the detected license file of a repository.
    async fn get_repo_license(&self, owner: &str, name: &str)
        -> Result<RepoLicense, ClientError>;

    /// Lists collaborators with their permissions.
    async fn list_collaborators(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Vec<Collaborator>, ClientError>;

    /// Lists the entries in the repository root directory.
    ///
    /// Returns [`ClientError::EmptyRepository`] when the repository has no commits.
    async fn list_root_entries(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Vec<ContentEntry>, ClientError>;

    /// Fetches a branch.
    async fn get_branch(&self, owner: &str, name: &str, branch: &str)
        -> Result<Branch, ClientError>;

    /// Fetches a git commit object.
    async fn get_commit(&self, owner: &str, name: &str, sha: &str) -> Result<Commit, ClientError>;

    /// Creates a tree on top of `base_tree`, returning its sha.
    async fn create_tree(
        &self,
        owner: &str,
        name: &str,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String, ClientError>;

    /// Creates a commit, returning its sha.
    async fn create_commit(
        &self,
        owner: &str,
        name: &str,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String, ClientError>;

    /// Creates a reference such as `refs/heads/<branch>`.
    async fn create_ref(
        &self,
        owner: &str,
        name: &str,
        reference: &str,
        sha: &str,
    ) -> Result<(), ClientError>;

    /// Opens a pull request against `owner/name`.
    async fn create_pull_request(
        &self,
        owner: &str,
        name: &str,
        request: &NewPullRequest,
    ) -> Result<PullRequest, ClientError>;

    /// Requests a fork of `owner/name` into the authenticated user's account.
    ///
    /// The fork is created asynchronously by the service, so the returned record
    /// may describe a repository that is not yet usable.
    async fn create_fork(&self, owner: &str, name: &str) -> Result<RepoRecord, ClientError>;

    /// Fetches a license template.
    async fn get_license(&self, key: &str) -> Result<License, ClientError>;

    /// Lists the license templates known to the service.
    async fn list_licenses(&self) -> Result<Vec<LicenseRef>, ClientError>;

    /// Returns the core API rate limit.
    async fn rate_limit(&self) -> Result<RateLimitInfo, ClientError>;
}
