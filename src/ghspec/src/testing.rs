//! In-memory [`HostingClient`] for unit tests.

use crate::client::{
    Branch, ClientError, Collaborator, Commit, CommitPointer, ContentEntry, HostingClient, License,
    LicenseRef, NewPullRequest, Owner, Permissions, PullRequest, RepoLicense, RepoRecord,
    TreeEntry, TreePointer,
};
use crate::rate_limit::RateLimitInfo;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Repository record created in 2016 and last updated in 2016.
pub(crate) fn repo_record(full_name: &str, id: u64) -> RepoRecord {
    let (owner, name) = full_name.split_once('/').unwrap();
    let timestamp = Utc.with_ymd_and_hms(2016, 3, 1, 12, 0, 0).unwrap();
    RepoRecord {
        id,
        name: name.to_string(),
        full_name: full_name.to_string(),
        owner: Owner {
            login: owner.to_string(),
        },
        description: None,
        fork: false,
        default_branch: Some("main".to_string()),
        created_at: timestamp,
        updated_at: timestamp,
        permissions: Some(Permissions {
            admin: true,
            push: true,
            pull: true,
        }),
        license: None,
        source: None,
    }
}

/// Detected license file with base64 encoded `content`.
pub(crate) fn repo_license(key: &str, name: &str, content: &str) -> RepoLicense {
    RepoLicense {
        name: "LICENSE".to_string(),
        path: "LICENSE".to_string(),
        sha: "blob".to_string(),
        content: STANDARD.encode(content),
        encoding: Some("base64".to_string()),
        license: Some(license_ref(key, name)),
    }
}

pub(crate) fn license_ref(key: &str, name: &str) -> LicenseRef {
    LicenseRef {
        key: key.to_string(),
        name: name.to_string(),
        spdx_id: None,
    }
}

#[derive(Default)]
struct State {
    repos: HashMap<String, RepoRecord>,
    org_repos: HashMap<String, Vec<String>>,
    user_repos: HashMap<String, Vec<String>>,
    owned_repos: Vec<String>,
    licenses: HashMap<String, License>,
    repo_licenses: HashMap<String, RepoLicense>,
    collaborators: HashMap<String, Vec<Collaborator>>,
    forbidden_collaborators: HashSet<String>,
    root_entries: HashMap<String, Vec<ContentEntry>>,
    empty: HashSet<String>,
    fork_of: HashMap<String, RepoRecord>,
    unready: HashSet<String>,
    failing: HashMap<String, String>,
    calls: Vec<String>,
    pulls: Vec<(String, NewPullRequest)>,
    refs: Vec<(String, String, String)>,
    trees: Vec<(String, Vec<TreeEntry>)>,
}

/// Configurable fake. Unknown resources produce [`ClientError::NotFound`].
#[derive(Default)]
pub(crate) struct FakeClient {
    state: Mutex<State>,
}

impl FakeClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn with_state(self, f: impl FnOnce(&mut State)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub(crate) fn with_repo(self, repo: RepoRecord) -> Self {
        self.with_state(|s| {
            s.repos.insert(repo.full_name.clone(), repo);
        })
    }

    pub(crate) fn with_org_repo(self, org: &str, repo: RepoRecord) -> Self {
        let full_name = repo.full_name.clone();
        self.with_repo(repo).with_state(|s| {
            s.org_repos
                .entry(org.to_string())
                .or_default()
                .push(full_name);
        })
    }

    pub(crate) fn with_user_repo(self, user: &str, repo: RepoRecord) -> Self {
        let full_name = repo.full_name.clone();
        self.with_repo(repo).with_state(|s| {
            s.user_repos
                .entry(user.to_string())
                .or_default()
                .push(full_name);
        })
    }

    pub(crate) fn with_owned_repo(self, repo: RepoRecord) -> Self {
        let full_name = repo.full_name.clone();
        self.with_repo(repo)
            .with_state(|s| s.owned_repos.push(full_name))
    }

    pub(crate) fn with_license(self, key: &str, name: &str, body: &str) -> Self {
        self.with_state(|s| {
            s.licenses.insert(
                key.to_string(),
                License {
                    key: key.to_string(),
                    name: name.to_string(),
                    spdx_id: None,
                    body: body.to_string(),
                },
            );
        })
    }

    pub(crate) fn with_repo_license(self, full_name: &str, license: RepoLicense) -> Self {
        self.with_state(|s| {
            s.repo_licenses.insert(full_name.to_string(), license);
        })
    }

    pub(crate) fn with_admins(self, full_name: &str, logins: &[&str]) -> Self {
        self.with_state(|s| {
            s.collaborators.insert(
                full_name.to_string(),
                logins
                    .iter()
                    .map(|login| Collaborator {
                        login: (*login).to_string(),
                        permissions: Permissions {
                            admin: true,
                            push: true,
                            pull: true,
                        },
                    })
                    .collect(),
            );
        })
    }

    pub(crate) fn with_collaborators(self, full_name: &str, collaborators: Vec<Collaborator>) -> Self {
        self.with_state(|s| {
            s.collaborators.insert(full_name.to_string(), collaborators);
        })
    }

    pub(crate) fn forbid_collaborators(self, full_name: &str) -> Self {
        self.with_state(|s| {
            s.forbidden_collaborators.insert(full_name.to_string());
        })
    }

    pub(crate) fn with_root_files(self, full_name: &str, names: &[&str]) -> Self {
        self.with_state(|s| {
            s.root_entries.insert(
                full_name.to_string(),
                names
                    .iter()
                    .map(|name| ContentEntry {
                        name: (*name).to_string(),
                        path: (*name).to_string(),
                        kind: "file".to_string(),
                    })
                    .collect(),
            );
        })
    }

    pub(crate) fn with_empty_repo(self, full_name: &str) -> Self {
        self.with_state(|s| {
            s.empty.insert(full_name.to_string());
        })
    }

    /// `create_fork` of `upstream` returns `fork` and registers it.
    pub(crate) fn with_fork(self, upstream: &str, fork: RepoRecord) -> Self {
        self.with_state(|s| {
            s.fork_of.insert(upstream.to_string(), fork);
        })
    }

    /// Branch lookups on `full_name` keep failing.
    pub(crate) fn never_ready(self, full_name: &str) -> Self {
        self.with_state(|s| {
            s.unready.insert(full_name.to_string());
        })
    }

    /// Calls to `method` fail with [`ClientError::Unexpected`] carrying `message`.
    pub(crate) fn fail_on(self, method: &str, message: &str) -> Self {
        self.with_state(|s| {
            s.failing.insert(method.to_string(), message.to_string());
        })
    }

    /// Number of calls made to a trait method.
    pub(crate) fn call_count(&self, method: &str) -> usize {
        let state = self.state.lock().unwrap();
        state
            .calls
            .iter()
            .filter(|call| call.split(' ').next() == Some(method))
            .count()
    }

    /// Calls to trait methods, formatted as `method args`.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Pull requests opened, keyed by target repository.
    pub(crate) fn pulls(&self) -> Vec<(String, NewPullRequest)> {
        self.state.lock().unwrap().pulls.clone()
    }

    /// References created as `(repository, ref, sha)`.
    pub(crate) fn refs(&self) -> Vec<(String, String, String)> {
        self.state.lock().unwrap().refs.clone()
    }

    /// Trees created, keyed by repository.
    pub(crate) fn trees(&self) -> Vec<(String, Vec<TreeEntry>)> {
        self.state.lock().unwrap().trees.clone()
    }

    fn record(&self, call: String) -> std::sync::MutexGuard<'_, State> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
    }

    fn injected(state: &State, method: &str, resource: &str) -> Result<(), ClientError> {
        match state.failing.get(method) {
            Some(message) => Err(ClientError::Unexpected {
                resource: resource.to_string(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn records(state: &State, names: Option<&Vec<String>>) -> Vec<RepoRecord> {
        names
            .into_iter()
            .flatten()
            .filter_map(|name| state.repos.get(name).cloned())
            .collect()
    }
}

fn not_found(resource: impl Into<String>) -> ClientError {
    ClientError::NotFound {
        resource: resource.into(),
    }
}

#[async_trait]
impl HostingClient for FakeClient {
    async fn list_org_repos(&self, org: &str) -> Result<Vec<RepoRecord>, ClientError> {
        let state = self.record(format!("list_org_repos {org}"));
        if !state.org_repos.contains_key(org) {
            return Err(not_found(org));
        }
        Ok(Self::records(&state, state.org_repos.get(org)))
    }

    async fn list_user_repos(&self, user: &str) -> Result<Vec<RepoRecord>, ClientError> {
        let state = self.record(format!("list_user_repos {user}"));
        Ok(Self::records(&state, state.user_repos.get(user)))
    }

    async fn list_owned_repos(&self) -> Result<Vec<RepoRecord>, ClientError> {
        let state = self.record("list_owned_repos".to_string());
        Ok(Self::records(&state, Some(&state.owned_repos)))
    }

    async fn get_repo(&self, owner: &str, name: &str) -> Result<RepoRecord, ClientError> {
        let full_name = format!("{owner}/{name}");
        let state = self.record(format!("get_repo {full_name}"));
        state
            .repos
            .get(&full_name)
            .cloned()
            .ok_or_else(|| not_found(full_name))
    }

    async fn get_repo_by_id(&self, id: u64) -> Result<RepoRecord, ClientError> {
        let state = self.record(format!("get_repo_by_id {id}"));
        state
            .repos
            .values()
            .find(|repo| repo.id == id)
            .cloned()
            .ok_or_else(|| not_found(format!("repository {id}")))
    }

    async fn get_repo_license(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<RepoLicense, ClientError> {
        let full_name = format!("{owner}/{name}");
        let state = self.record(format!("get_repo_license {full_name}"));
        state
            .repo_licenses
            .get(&full_name)
            .cloned()
            .ok_or_else(|| not_found(format!("license of {full_name}")))
    }

    async fn list_collaborators(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Vec<Collaborator>, ClientError> {
        let full_name = format!("{owner}/{name}");
        let state = self.record(format!("list_collaborators {full_name}"));
        if state.forbidden_collaborators.contains(&full_name) {
            return Err(ClientError::Forbidden {
                resource: format!("collaborators of {full_name}"),
            });
        }
        Ok(state
            .collaborators
            .get(&full_name)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_root_entries(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Vec<ContentEntry>, ClientError> {
        let full_name = format!("{owner}/{name}");
        let state = self.record(format!("list_root_entries {full_name}"));
        if state.empty.contains(&full_name) {
            return Err(ClientError::EmptyRepository {
                repository: full_name,
            });
        }
        Ok(state
            .root_entries
            .get(&full_name)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_branch(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
    ) -> Result<Branch, ClientError> {
        let full_name = format!("{owner}/{name}");
        let state = self.record(format!("get_branch {full_name} {branch}"));
        if state.unready.contains(&full_name) || !state.repos.contains_key(&full_name) {
            return Err(not_found(format!("branch {branch} of {full_name}")));
        }
        Ok(Branch {
            name: branch.to_string(),
            commit: CommitPointer {
                sha: format!("head-{full_name}"),
            },
        })
    }

    async fn get_commit(&self, owner: &str, name: &str, sha: &str) -> Result<Commit, ClientError> {
        let _state = self.record(format!("get_commit {owner}/{name} {sha}"));
        Ok(Commit {
            sha: sha.to_string(),
            tree: TreePointer {
                sha: format!("tree-of-{sha}"),
            },
        })
    }

    async fn create_tree(
        &self,
        owner: &str,
        name: &str,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String, ClientError> {
        let full_name = format!("{owner}/{name}");
        let mut state = self.record(format!("create_tree {full_name} {base_tree}"));
        Self::injected(&state, "create_tree", &full_name)?;
        state.trees.push((full_name, entries.to_vec()));
        Ok("new-tree".to_string())
    }

    async fn create_commit(
        &self,
        owner: &str,
        name: &str,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String, ClientError> {
        let state = self.record(format!(
            "create_commit {owner}/{name} {tree} {} {message}",
            parents.join(",")
        ));
        Self::injected(&state, "create_commit", &format!("{owner}/{name}"))?;
        Ok("new-commit".to_string())
    }

    async fn create_ref(
        &self,
        owner: &str,
        name: &str,
        reference: &str,
        sha: &str,
    ) -> Result<(), ClientError> {
        let full_name = format!("{owner}/{name}");
        let mut state = self.record(format!("create_ref {full_name} {reference}"));
        Self::injected(&state, "create_ref", reference)?;
        state
            .refs
            .push((full_name, reference.to_string(), sha.to_string()));
        Ok(())
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        name: &str,
        request: &NewPullRequest,
    ) -> Result<PullRequest, ClientError> {
        let full_name = format!("{owner}/{name}");
        let mut state = self.record(format!("create_pull_request {full_name}"));
        Self::injected(&state, "create_pull_request", &full_name)?;
        state.pulls.push((full_name.clone(), request.clone()));
        let number = state.pulls.len() as u64;
        Ok(PullRequest {
            number,
            url: format!("https://github.com/{full_name}/pull/{number}"),
        })
    }

    async fn create_fork(&self, owner: &str, name: &str) -> Result<RepoRecord, ClientError> {
        let full_name = format!("{owner}/{name}");
        let mut state = self.record(format!("create_fork {full_name}"));
        let fork = state
            .fork_of
            .get(&full_name)
            .cloned()
            .ok_or_else(|| not_found(format!("forks of {full_name}")))?;
        state.repos.insert(fork.full_name.clone(), fork.clone());
        Ok(fork)
    }

    async fn get_license(&self, key: &str) -> Result<License, ClientError> {
        let state = self.record(format!("get_license {key}"));
        state
            .licenses
            .get(key)
            .cloned()
            .ok_or_else(|| not_found(format!("license {key}")))
    }

    async fn list_licenses(&self) -> Result<Vec<LicenseRef>, ClientError> {
        let state = self.record("list_licenses".to_string());
        let mut licenses: Vec<_> = state
            .licenses
            .values()
            .map(|l| license_ref(&l.key, &l.name))
            .collect();
        licenses.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(licenses)
    }

    async fn rate_limit(&self) -> Result<RateLimitInfo, ClientError> {
        let _state = self.record("rate_limit".to_string());
        Ok(RateLimitInfo {
            remaining: 5000,
            reset: 0,
            limit: 5000,
        })
    }
}
