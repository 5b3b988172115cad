//! Opening pull requests that replace a repository's license file.
//!
//! The change is committed directly when the authenticated user can push to
//! the repository. Otherwise it goes through the user's fork, which is created
//! and awaited if it does not exist yet. Each step is narrated to an output
//! sink as `Step...OK`.

mod error;

pub use error::ApplyError;

use crate::client::{HostingClient, NewPullRequest, PullRequest, RepoRecord, TreeEntry};
use crate::license::{create, AuthorInfo, LicenseCache};
use crate::rate_limit::ensure_core_rate_limit;
use crate::repository::{create_fork, find_user_fork, ForkWait, Info};
use std::io::Write;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

/// Message of the commit that replaces the license.
pub const COMMIT_MESSAGE: &str = "Update license";

/// Branch used when none is configured.
pub const DEFAULT_BRANCH: &str = "cli-update-license";

/// Pull request title used when none is configured.
pub const DEFAULT_TITLE: &str = "Update LICENSE";

/// Branch, title and body of a fix pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrParams {
    pub branch: String,
    pub title: String,
    pub body: String,
}

impl PrParams {
    /// Defaults for replacing a license with its standard text.
    #[must_use]
    pub fn standard(license_name: &str) -> Self {
        Self {
            branch: DEFAULT_BRANCH.to_string(),
            title: DEFAULT_TITLE.to_string(),
            body: format!("Use standard version of {license_name}."),
        }
    }
}

fn narrate(out: &mut (dyn Write + Send), text: &str) -> Result<(), ApplyError> {
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Opens license fix pull requests.
#[derive(Clone)]
pub struct Remediator {
    client: Arc<dyn HostingClient>,
    fork_wait: ForkWait,
}

impl Remediator {
    #[must_use]
    pub fn new(client: Arc<dyn HostingClient>) -> Self {
        Self {
            client,
            fork_wait: ForkWait::default(),
        }
    }

    /// Sets how long to wait for a newly created fork.
    #[must_use]
    pub fn with_fork_wait(mut self, fork_wait: ForkWait) -> Self {
        self.fork_wait = fork_wait;
        self
    }

    /// Replaces the license of a repository with the standard text of `license_id`.
    ///
    /// The text is rendered for `author` with the repository's created and
    /// updated years.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::Render`] if the license cannot be produced, and
    /// otherwise the errors of [`Remediator::apply`].
    pub async fn apply_standard(
        &self,
        info: &Info,
        license_id: &str,
        author: &str,
        params: &PrParams,
        cache: &mut LicenseCache,
        out: &mut (dyn Write + Send),
    ) -> Result<PullRequest, ApplyError> {
        let author = AuthorInfo::new(author, info.repo.created_year(), info.repo.updated_year());
        let content = create(license_id, cache, author.as_ref()).await?;
        self.apply(info, &content, params, out).await
    }

    /// Opens a pull request that sets the license file of a repository to `content`.
    ///
    /// # Arguments
    ///
    /// * `info` - Observed state of the target repository
    /// * `content` - New license text
    /// * `params` - Branch, title and body of the pull request
    /// * `out` - Sink for step narration
    ///
    /// # Errors
    ///
    /// Returns the [`ApplyError`] variant of the first step that failed.
    /// Later steps are not attempted.
    pub async fn apply(
        &self,
        info: &Info,
        content: &str,
        params: &PrParams,
        out: &mut (dyn Write + Send),
    ) -> Result<PullRequest, ApplyError> {
        let span = info_span!(
            "apply_license",
            repo = %info.full_name(),
            branch = %params.branch
        );

        async {
            let target = &info.repo;
            let owner = target.owner.login.as_str();
            let name = target.name.as_str();

            let default_branch =
                target
                    .default_branch
                    .as_deref()
                    .ok_or_else(|| ApplyError::NoDefaultBranch {
                        repository: target.full_name.clone(),
                    })?;
            let branch = self
                .client
                .get_branch(owner, name, default_branch)
                .await
                .map_err(|source| ApplyError::DefaultBranch {
                    repository: target.full_name.clone(),
                    branch: default_branch.to_string(),
                    source,
                })?;
            let head = self
                .client
                .get_commit(owner, name, &branch.commit.sha)
                .await
                .map_err(|source| ApplyError::LatestCommit {
                    branch: branch.name.clone(),
                    source,
                })?;

            let commit_repo = self.commit_repository(target, out).await?;
            let commit_owner = commit_repo.owner.login.as_str();
            let commit_name = commit_repo.name.as_str();

            ensure_core_rate_limit(self.client.as_ref())
                .await
                .map_err(ApplyError::RateLimit)?;

            narrate(out, "Creating tree...")?;
            let entries = [TreeEntry::file(info.license_path(), content)];
            let tree = self
                .client
                .create_tree(commit_owner, commit_name, &head.tree.sha, &entries)
                .await
                .map_err(ApplyError::Tree)?;
            narrate(out, "OK\n")?;

            narrate(out, "Creating commit...")?;
            let commit = self
                .client
                .create_commit(
                    commit_owner,
                    commit_name,
                    COMMIT_MESSAGE,
                    &tree,
                    std::slice::from_ref(&branch.commit.sha),
                )
                .await
                .map_err(ApplyError::Commit)?;
            narrate(out, "OK\n")?;

            narrate(out, "Creating branch...")?;
            let reference = format!("refs/heads/{}", params.branch);
            self.client
                .create_ref(commit_owner, commit_name, &reference, &commit)
                .await
                .map_err(|source| ApplyError::Reference {
                    reference: reference.clone(),
                    source,
                })?;
            narrate(out, "OK\n")?;

            let head_ref = if commit_repo.id == target.id {
                params.branch.clone()
            } else {
                format!("{commit_owner}:{}", params.branch)
            };

            narrate(out, "Creating pull request...")?;
            let request = NewPullRequest {
                title: params.title.clone(),
                body: params.body.clone(),
                head: head_ref,
                base: branch.name.clone(),
            };
            let pr = self
                .client
                .create_pull_request(owner, name, &request)
                .await
                .map_err(ApplyError::PullRequest)?;
            narrate(out, "OK\n")?;

            info!(pr_number = pr.number, url = %pr.url, "PR created successfully");
            Ok(pr)
        }
        .instrument(span)
        .await
    }

    /// Repository to commit to: the target itself, or the user's fork of it.
    async fn commit_repository(
        &self,
        target: &RepoRecord,
        out: &mut (dyn Write + Send),
    ) -> Result<RepoRecord, ApplyError> {
        if target.can_push() {
            narrate(out, "User has push permissions to repository\n")?;
            return Ok(target.clone());
        }

        if let Some(fork) = find_user_fork(self.client.as_ref(), target).await? {
            narrate(
                out,
                "User does not have push permissions to repository, but has an existing fork\n",
            )?;
            return Ok(fork);
        }

        narrate(
            out,
            "User does not have push permissions to repository and does not have an existing fork\n",
        )?;
        narrate(out, "Forking repository...")?;
        let fork = create_fork(&self.client, target, self.fork_wait).await?;
        narrate(out, "OK\n")?;
        Ok(fork)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Permissions;
    use crate::testing::{repo_license, repo_record, FakeClient};
    use std::time::Duration;

    fn info(repo: RepoRecord) -> Info {
        Info {
            repo,
            repo_license: None,
            is_empty: false,
            owners: Vec::new(),
            has_patents: false,
        }
    }

    fn read_only(mut repo: RepoRecord) -> RepoRecord {
        repo.permissions = Some(Permissions {
            pull: true,
            ..Permissions::default()
        });
        repo
    }

    #[test]
    fn standard_params() {
        let params = PrParams::standard("MIT License");
        assert_eq!(params.branch, "cli-update-license");
        assert_eq!(params.title, "Update LICENSE");
        assert_eq!(params.body, "Use standard version of MIT License.");
    }

    #[tokio::test]
    async fn direct_push_opens_pr_on_target() {
        let target = repo_record("acme/widget", 1);
        let fake = Arc::new(FakeClient::new().with_repo(target.clone()));
        let remediator = Remediator::new(fake.clone());
        let mut out = Vec::new();

        let pr = remediator
            .apply(&info(target), "new text", &PrParams::standard("MIT"), &mut out)
            .await
            .unwrap();

        assert_eq!(pr.number, 1);
        let narration = String::from_utf8(out).unwrap();
        assert_eq!(
            narration,
            "User has push permissions to repository\n\
             Creating tree...OK\n\
             Creating commit...OK\n\
             Creating branch...OK\n\
             Creating pull request...OK\n"
        );

        let trees = fake.trees();
        assert_eq!(trees[0].0, "acme/widget");
        assert_eq!(trees[0].1, vec![TreeEntry::file("LICENSE", "new text")]);
        assert_eq!(
            fake.refs(),
            vec![(
                "acme/widget".to_string(),
                "refs/heads/cli-update-license".to_string(),
                "new-commit".to_string()
            )]
        );
        let (repo, request) = &fake.pulls()[0];
        assert_eq!(repo, "acme/widget");
        assert_eq!(request.head, "cli-update-license");
        assert_eq!(request.base, "main");
    }

    #[tokio::test]
    async fn commit_uses_head_as_parent_and_detected_path() {
        let target = repo_record("acme/widget", 1);
        let fake = Arc::new(FakeClient::new().with_repo(target.clone()));
        let remediator = Remediator::new(fake.clone());
        let mut observed = info(target);
        let mut detected = repo_license("mit", "MIT License", "old");
        detected.path = "LICENSE.txt".to_string();
        observed.repo_license = Some(detected);

        remediator
            .apply(&observed, "new", &PrParams::standard("MIT"), &mut Vec::new())
            .await
            .unwrap();

        assert!(fake
            .calls()
            .contains(&"create_tree acme/widget tree-of-head-acme/widget".to_string()));
        assert!(fake
            .calls()
            .contains(&"create_commit acme/widget new-tree head-acme/widget Update license".to_string()));
        assert_eq!(fake.trees()[0].1[0].path, "LICENSE.txt");
    }

    #[tokio::test]
    async fn existing_fork_is_reused() {
        let target = read_only(repo_record("acme/widget", 1));
        let mut fork = repo_record("me/widget", 2);
        fork.fork = true;
        fork.source = Some(Box::new(target.clone()));
        let fake = Arc::new(
            FakeClient::new()
                .with_repo(target.clone())
                .with_owned_repo(fork),
        );
        let remediator = Remediator::new(fake.clone());
        let mut out = Vec::new();

        remediator
            .apply(&info(target), "text", &PrParams::standard("MIT"), &mut out)
            .await
            .unwrap();

        assert_eq!(fake.call_count("create_fork"), 0);
        assert_eq!(fake.trees()[0].0, "me/widget");
        let (repo, request) = &fake.pulls()[0];
        assert_eq!(repo, "acme/widget");
        assert_eq!(request.head, "me:cli-update-license");
        assert!(String::from_utf8(out).unwrap().contains("has an existing fork"));
    }

    #[tokio::test(start_paused = true)]
    async fn new_fork_is_created_and_awaited() {
        let target = read_only(repo_record("acme/widget", 1));
        let fork = repo_record("me/widget", 2);
        let fake = Arc::new(
            FakeClient::new()
                .with_repo(target.clone())
                .with_fork("acme/widget", fork),
        );
        let remediator = Remediator::new(fake.clone());
        let mut out = Vec::new();

        remediator
            .apply(&info(target), "text", &PrParams::standard("MIT"), &mut out)
            .await
            .unwrap();

        assert_eq!(fake.call_count("create_fork"), 1);
        assert!(fake
            .calls()
            .contains(&"get_branch me/widget main".to_string()));
        assert_eq!(fake.pulls()[0].1.head, "me:cli-update-license");
        assert!(String::from_utf8(out)
            .unwrap()
            .contains("Forking repository...OK\n"));
    }

    #[tokio::test(start_paused = true)]
    async fn fork_timeout_aborts_before_tree() {
        let target = read_only(repo_record("acme/widget", 1));
        let fork = repo_record("me/widget", 2);
        let fake = Arc::new(
            FakeClient::new()
                .with_repo(target.clone())
                .with_fork("acme/widget", fork)
                .never_ready("me/widget"),
        );
        let remediator = Remediator::new(fake.clone())
            .with_fork_wait(ForkWait::new(Duration::from_secs(2), Duration::from_secs(1)));

        let err = remediator
            .apply(&info(target), "text", &PrParams::standard("MIT"), &mut Vec::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplyError::Fork(crate::repository::ForkError::TimedOut { .. })
        ));
        assert_eq!(fake.call_count("create_tree"), 0);
    }

    #[tokio::test]
    async fn missing_branch_aborts() {
        let target = repo_record("acme/widget", 1);
        let fake = Arc::new(FakeClient::new());
        let remediator = Remediator::new(fake.clone());

        let err = remediator
            .apply(&info(target), "text", &PrParams::standard("MIT"), &mut Vec::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ApplyError::DefaultBranch { .. }));
        assert_eq!(fake.call_count("create_tree"), 0);
    }

    async fn apply_failing_on(method: &str, message: &str) -> (ApplyError, Arc<FakeClient>, String) {
        let target = repo_record("acme/widget", 1);
        let fake = Arc::new(
            FakeClient::new()
                .with_repo(target.clone())
                .fail_on(method, message),
        );
        let remediator = Remediator::new(fake.clone());
        let mut out = Vec::new();

        let err = remediator
            .apply(&info(target), "text", &PrParams::standard("MIT"), &mut out)
            .await
            .unwrap_err();
        (err, fake, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn tree_failure_stops_before_commit() {
        let (err, fake, out) = apply_failing_on("create_tree", "tree rejected").await;

        assert!(matches!(err, ApplyError::Tree(_)));
        assert_eq!(fake.call_count("create_commit"), 0);
        assert_eq!(fake.call_count("create_ref"), 0);
        assert_eq!(fake.call_count("create_pull_request"), 0);
        assert!(out.ends_with("Creating tree..."));
    }

    #[tokio::test]
    async fn commit_failure_stops_before_branch() {
        let (err, fake, _) = apply_failing_on("create_commit", "commit rejected").await;

        assert!(matches!(err, ApplyError::Commit(_)));
        assert_eq!(fake.call_count("create_tree"), 1);
        assert_eq!(fake.call_count("create_ref"), 0);
        assert_eq!(fake.call_count("create_pull_request"), 0);
    }

    #[tokio::test]
    async fn existing_branch_is_surfaced_once() {
        let (err, fake, out) = apply_failing_on("create_ref", "Reference already exists").await;

        match &err {
            ApplyError::Reference { reference, source } => {
                assert_eq!(reference, "refs/heads/cli-update-license");
                assert!(source.to_string().contains("Reference already exists"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fake.call_count("create_ref"), 1);
        assert_eq!(fake.call_count("create_pull_request"), 0);
        assert!(fake.refs().is_empty());
        assert!(out.ends_with("Creating branch..."));
    }

    #[tokio::test]
    async fn pull_request_failure_is_reported() {
        let (err, fake, _) =
            apply_failing_on("create_pull_request", "A pull request already exists").await;

        assert!(matches!(err, ApplyError::PullRequest(_)));
        assert_eq!(fake.call_count("create_pull_request"), 1);
        assert_eq!(fake.refs().len(), 1);
        assert!(fake.pulls().is_empty());
        assert!(err.to_string().starts_with("failed to create PR: "));
    }

    #[tokio::test]
    async fn apply_standard_renders_template() {
        let target = repo_record("acme/widget", 1);
        let fake = Arc::new(
            FakeClient::new()
                .with_repo(target.clone())
                .with_license("wtfpl", "WTFPL", "(c) [year] [fullname]"),
        );
        let remediator = Remediator::new(fake.clone());
        let mut cache = LicenseCache::new(fake.clone());

        remediator
            .apply_standard(
                &info(target),
                "WTFPL",
                "Acme Inc",
                &PrParams::standard("WTFPL"),
                &mut cache,
                &mut Vec::new(),
            )
            .await
            .unwrap();

        assert_eq!(fake.trees()[0].1[0].content, "(c) 2016 Acme Inc");
    }
}
