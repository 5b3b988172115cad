//! [`HostingClient`] implementation backed by octocrab.

use super::{
    Branch, ClientError, Collaborator, Commit, ContentEntry, HostingClient, License, LicenseRef,
    NewPullRequest, PullRequest, RepoLicense, RepoRecord, TreeEntry,
};
use crate::rate_limit::RateLimitInfo;
use async_trait::async_trait;
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum page size accepted by the GitHub REST API.
const PER_PAGE: usize = 100;

/// GitHub REST client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    octocrab: Octocrab,
}

#[derive(Serialize)]
struct PageParams<'a> {
    per_page: usize,
    page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    affiliation: Option<&'a str>,
}

#[derive(Deserialize)]
struct ShaResponse {
    sha: String,
}

#[derive(Serialize)]
struct CreateTree<'a> {
    base_tree: &'a str,
    tree: &'a [TreeEntry],
}

#[derive(Serialize)]
struct CreateCommit<'a> {
    message: &'a str,
    tree: &'a str,
    parents: &'a [String],
}

#[derive(Serialize)]
struct CreateRef<'a> {
    #[serde(rename = "ref")]
    reference: &'a str,
    sha: &'a str,
}

impl GitHubClient {
    /// Builds a client, optionally authenticated and pointed at a non-default API root.
    ///
    /// # Arguments
    ///
    /// * `token` - Personal access token. Anonymous requests are used when `None`.
    /// * `base_uri` - API root such as `https://github.example.com/api/v3`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URI is invalid or the client cannot be built.
    pub fn new(token: Option<&str>, base_uri: Option<&str>) -> Result<Self, ClientError> {
        let mut builder = Octocrab::builder();
        if let Some(token) = token {
            builder = builder.personal_token(token.to_string());
        }
        if let Some(base_uri) = base_uri {
            builder = builder.base_uri(base_uri)?;
        }
        Ok(Self {
            octocrab: builder.build()?,
        })
    }

    /// Wraps an existing octocrab instance.
    #[must_use]
    pub fn from_octocrab(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }

    async fn get_json<R: DeserializeOwned>(
        &self,
        route: &str,
        resource: &str,
    ) -> Result<R, ClientError> {
        let response: Result<R, octocrab::Error> = self.octocrab.get(route, None::<&()>).await;
        response.map_err(|e| classify(e, resource))
    }

    async fn post_json<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        route: &str,
        body: &B,
        resource: &str,
    ) -> Result<R, ClientError> {
        let response: Result<R, octocrab::Error> = self.octocrab.post(route, Some(body)).await;
        response.map_err(|e| classify(e, resource))
    }

    /// Fetches every page of a list endpoint until a short page is returned.
    async fn get_all_pages<R: DeserializeOwned>(
        &self,
        route: &str,
        affiliation: Option<&str>,
        resource: &str,
    ) -> Result<Vec<R>, ClientError> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let params = PageParams {
                per_page: PER_PAGE,
                page,
                affiliation,
            };
            let batch: Vec<R> = self
                .octocrab
                .get(route, Some(&params))
                .await
                .map_err(|e| classify(e, resource))?;
            let count = batch.len();
            items.extend(batch);
            debug!(route, page, count, "Fetched page");
            if count < PER_PAGE {
                break;
            }
            page += 1;
        }
        Ok(items)
    }
}

/// Maps octocrab errors carrying a 403/404 status onto typed variants.
fn classify(error: octocrab::Error, resource: &str) -> ClientError {
    if let octocrab::Error::GitHub { source, .. } = &error {
        match source.status_code.as_u16() {
            404 if source.message.contains("empty") => {
                return ClientError::EmptyRepository {
                    repository: resource.to_string(),
                }
            }
            404 => {
                return ClientError::NotFound {
                    resource: resource.to_string(),
                }
            }
            403 => {
                return ClientError::Forbidden {
                    resource: resource.to_string(),
                }
            }
            _ => {}
        }
    }
    ClientError::GitHubError(error)
}

#[async_trait]
impl HostingClient for GitHubClient {
    async fn list_org_repos(&self, org: &str) -> Result<Vec<RepoRecord>, ClientError> {
        self.get_all_pages(&format!("/orgs/{org}/repos"), None, org)
            .await
    }

    async fn list_user_repos(&self, user: &str) -> Result<Vec<RepoRecord>, ClientError> {
        self.get_all_pages(&format!("/users/{user}/repos"), None, user)
            .await
    }

    async fn list_owned_repos(&self) -> Result<Vec<RepoRecord>, ClientError> {
        self.get_all_pages("/user/repos", Some("owner"), "authenticated user repositories")
            .await
    }

    async fn get_repo(&self, owner: &str, name: &str) -> Result<RepoRecord, ClientError> {
        let full_name = format!("{owner}/{name}");
        self.get_json(&format!("/repos/{full_name}"), &full_name)
            .await
    }

    async fn get_repo_by_id(&self, id: u64) -> Result<RepoRecord, ClientError> {
        self.get_json(&format!("/repositories/{id}"), &format!("repository {id}"))
            .await
    }

    async fn get_repo_license(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<RepoLicense, ClientError> {
        let full_name = format!("{owner}/{name}");
        self.get_json(
            &format!("/repos/{full_name}/license"),
            &format!("license of {full_name}"),
        )
        .await
    }

    async fn list_collaborators(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Vec<Collaborator>, ClientError> {
        let full_name = format!("{owner}/{name}");
        self.get_all_pages(
            &format!("/repos/{full_name}/collaborators"),
            None,
            &format!("collaborators of {full_name}"),
        )
        .await
    }

    async fn list_root_entries(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Vec<ContentEntry>, ClientError> {
        let full_name = format!("{owner}/{name}");
        self.get_json(&format!("/repos/{full_name}/contents"), &full_name)
            .await
    }

    async fn get_branch(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
    ) -> Result<Branch, ClientError> {
        let full_name = format!("{owner}/{name}");
        self.get_json(
            &format!("/repos/{full_name}/branches/{branch}"),
            &format!("branch {branch} of {full_name}"),
        )
        .await
    }

    async fn get_commit(&self, owner: &str, name: &str, sha: &str) -> Result<Commit, ClientError> {
        let full_name = format!("{owner}/{name}");
        self.get_json(
            &format!("/repos/{full_name}/git/commits/{sha}"),
            &format!("commit {sha} of {full_name}"),
        )
        .await
    }

    async fn create_tree(
        &self,
        owner: &str,
        name: &str,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String, ClientError> {
        let full_name = format!("{owner}/{name}");
        let body = CreateTree {
            base_tree,
            tree: entries,
        };
        let created: ShaResponse = self
            .post_json(
                &format!("/repos/{full_name}/git/trees"),
                &body,
                &format!("trees of {full_name}"),
            )
            .await?;
        Ok(created.sha)
    }

    async fn create_commit(
        &self,
        owner: &str,
        name: &str,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String, ClientError> {
        let full_name = format!("{owner}/{name}");
        let body = CreateCommit {
            message,
            tree,
            parents,
        };
        let created: ShaResponse = self
            .post_json(
                &format!("/repos/{full_name}/git/commits"),
                &body,
                &format!("commits of {full_name}"),
            )
            .await?;
        Ok(created.sha)
    }

    async fn create_ref(
        &self,
        owner: &str,
        name: &str,
        reference: &str,
        sha: &str,
    ) -> Result<(), ClientError> {
        let full_name = format!("{owner}/{name}");
        let body = CreateRef { reference, sha };
        let _: serde_json::Value = self
            .post_json(
                &format!("/repos/{full_name}/git/refs"),
                &body,
                &format!("references of {full_name}"),
            )
            .await?;
        Ok(())
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        name: &str,
        request: &NewPullRequest,
    ) -> Result<PullRequest, ClientError> {
        let pr = self
            .octocrab
            .pulls(owner, name)
            .create(&request.title, &request.head, &request.base)
            .body(&request.body)
            .send()
            .await
            .map_err(|e| classify(e, &format!("pull requests of {owner}/{name}")))?;

        let url = pr
            .html_url
            .as_ref()
            .map(|u| u.to_string())
            .unwrap_or_else(|| format!("https://github.com/{owner}/{name}/pull/{}", pr.number));

        Ok(PullRequest {
            number: pr.number,
            url,
        })
    }

    async fn create_fork(&self, owner: &str, name: &str) -> Result<RepoRecord, ClientError> {
        let full_name = format!("{owner}/{name}");
        self.post_json(
            &format!("/repos/{full_name}/forks"),
            &serde_json::json!({}),
            &format!("forks of {full_name}"),
        )
        .await
    }

    async fn get_license(&self, key: &str) -> Result<License, ClientError> {
        self.get_json(&format!("/licenses/{key}"), &format!("license {key}"))
            .await
    }

    async fn list_licenses(&self) -> Result<Vec<LicenseRef>, ClientError> {
        self.get_json("/licenses", "licenses").await
    }

    async fn rate_limit(&self) -> Result<RateLimitInfo, ClientError> {
        let rate_limit = self.octocrab.ratelimit().get().await?;
        let core = &rate_limit.resources.core;

        Ok(RateLimitInfo {
            remaining: core.remaining as u32,
            reset: core.reset,
            limit: core.limit as u32,
        })
    }
}
