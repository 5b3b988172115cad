//! Repository enumeration and observed state.

mod error;
mod fork;
mod info;

pub use error::{ForkError, RepositoryError};
pub use fork::{
    create_fork, find_user_fork, wait_until_ready, Backoff, ForkWait, ForkWaitState,
    DEFAULT_FORK_TIMEOUT, DEFAULT_INITIAL_BACKOFF,
};
pub use info::{Info, DEFAULT_LICENSE_PATH};

use crate::client::{ClientError, HostingClient, RepoRecord};
use crate::definition::sort_case_insensitive;
use std::fmt;
use tracing::{debug, info_span, warn, Instrument};

/// Account whose repositories are reconciled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryScope {
    Organization(String),
    User(String),
}

impl RepositoryScope {
    /// Login of the organization or user.
    #[must_use]
    pub fn owner(&self) -> &str {
        match self {
            Self::Organization(name) | Self::User(name) => name,
        }
    }
}

impl fmt::Display for RepositoryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Organization(name) => write!(f, "organization {name}"),
            Self::User(name) => write!(f, "user {name}"),
        }
    }
}

/// Position of a repository within a run, shown as `i/n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Zero-based index.
    pub index: usize,
    pub total: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index + 1, self.total)
    }
}

/// Pairs each repository with its [`Progress`].
pub fn with_progress(repos: &[RepoRecord]) -> impl Iterator<Item = (&RepoRecord, Progress)> {
    let total = repos.len();
    repos
        .iter()
        .enumerate()
        .map(move |(index, repo)| (repo, Progress { index, total }))
}

/// Lists the repositories to process.
///
/// With an empty `names` every repository of the scope is returned. Otherwise
/// each name is fetched individually; names without a `/` are resolved against
/// the scope owner.
///
/// # Errors
///
/// Returns an error if listing fails or a named repository cannot be fetched.
pub async fn list_repositories(
    client: &dyn HostingClient,
    scope: &RepositoryScope,
    names: &[String],
) -> Result<Vec<RepoRecord>, RepositoryError> {
    if names.is_empty() {
        let listed = match scope {
            RepositoryScope::Organization(org) => client.list_org_repos(org).await,
            RepositoryScope::User(user) => client.list_user_repos(user).await,
        };
        let repos = listed.map_err(|source| RepositoryError::List {
            scope: scope.to_string(),
            source,
        })?;
        debug!(scope = %scope, count = repos.len(), "Listed repositories");
        return Ok(repos);
    }

    let mut repos = Vec::with_capacity(names.len());
    for name in names {
        let (owner, repo) = name.split_once('/').unwrap_or((scope.owner(), name.as_str()));
        let record = client
            .get_repo(owner, repo)
            .await
            .map_err(|source| RepositoryError::Get {
                repository: format!("{owner}/{repo}"),
                source,
            })?;
        repos.push(record);
    }
    Ok(repos)
}

/// Collects the observed state of a repository.
///
/// An empty repository yields an [`Info`] with `is_empty` set and nothing else
/// filled in. Lack of permission to list collaborators leaves `owners` empty.
///
/// # Errors
///
/// Returns [`RepositoryError::Gather`] if any other lookup fails.
pub async fn gather_info(
    client: &dyn HostingClient,
    repo: &RepoRecord,
) -> Result<Info, RepositoryError> {
    let span = info_span!("gather_info", repo = %repo.full_name);

    async {
        let owner = repo.owner.login.as_str();
        let name = repo.name.as_str();
        let gather_error = |what: &'static str| {
            move |source: ClientError| RepositoryError::Gather {
                repository: repo.full_name.clone(),
                what,
                source,
            }
        };

        let entries = match client.list_root_entries(owner, name).await {
            Ok(entries) => entries,
            Err(e) if e.is_empty_repository() => {
                debug!("Repository is empty");
                return Ok(Info {
                    repo: repo.clone(),
                    repo_license: None,
                    is_empty: true,
                    owners: Vec::new(),
                    has_patents: false,
                });
            }
            Err(e) => return Err(gather_error("contents")(e)),
        };
        let has_patents = entries.iter().any(|entry| {
            let lower = entry.name.to_lowercase();
            lower == "patents" || lower == "patents.txt"
        });

        let repo_license = if repo.license.is_some() {
            match client.get_repo_license(owner, name).await {
                Ok(license) => Some(license),
                Err(e) if e.is_not_found() => None,
                Err(e) => return Err(gather_error("license")(e)),
            }
        } else {
            None
        };

        let mut owners = match client.list_collaborators(owner, name).await {
            Ok(collaborators) => collaborators
                .into_iter()
                .filter(|c| c.permissions.admin)
                .map(|c| c.login)
                .collect(),
            Err(e) if e.is_forbidden() => {
                warn!("No permission to list collaborators, owners unknown");
                Vec::new()
            }
            Err(e) => return Err(gather_error("collaborators")(e)),
        };
        sort_case_insensitive(&mut owners);

        Ok(Info {
            repo: repo.clone(),
            repo_license,
            is_empty: false,
            owners,
            has_patents,
        })
    }
    .instrument(span)
    .await
}
