//! Wire models for the subset of the GitHub REST API used by ghspec.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Account that owns a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// Login name of the user or organization.
    pub login: String,
}

/// Permissions of the authenticated user on a repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub pull: bool,
}

/// License identification as reported by the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRef {
    /// Lowercase license key, e.g. `mit`.
    pub key: String,
    /// Human readable name, e.g. `MIT License`.
    pub name: String,
    /// SPDX identifier when known.
    #[serde(default)]
    pub spdx_id: Option<String>,
}

/// Repository record returned by the repository endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRecord {
    pub id: u64,
    pub name: String,
    /// `owner/name`.
    pub full_name: String,
    pub owner: Owner,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub default_branch: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub permissions: Option<Permissions>,
    #[serde(default)]
    pub license: Option<LicenseRef>,
    /// Root of the fork network. Only populated on single-repository lookups.
    #[serde(default)]
    pub source: Option<Box<RepoRecord>>,
}

impl RepoRecord {
    /// Whether the authenticated user may push to this repository.
    #[must_use]
    pub fn can_push(&self) -> bool {
        self.permissions.is_some_and(|p| p.push)
    }

    /// Year the repository was created.
    #[must_use]
    pub fn created_year(&self) -> i32 {
        self.created_at.year()
    }

    /// Year the repository was last updated.
    #[must_use]
    pub fn updated_year(&self) -> i32 {
        self.updated_at.year()
    }

    /// Description, with an absent description treated as empty.
    #[must_use]
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

/// License file detected in a repository (`GET /repos/{owner}/{repo}/license`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoLicense {
    /// File name, e.g. `LICENSE`.
    pub name: String,
    /// Path of the file relative to the repository root.
    pub path: String,
    #[serde(default)]
    pub sha: String,
    /// File content, base64 encoded.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub license: Option<LicenseRef>,
}

/// Collaborator on a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub login: String,
    #[serde(default)]
    pub permissions: Permissions,
}

/// Entry in a repository directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    /// `file`, `dir`, `symlink` or `submodule`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Pointer to a commit object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitPointer {
    pub sha: String,
}

/// Branch with the commit at its head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub commit: CommitPointer,
}

/// Pointer to a tree object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreePointer {
    pub sha: String,
}

/// Git commit object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub tree: TreePointer,
}

/// Blob entry written into a new tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

impl TreeEntry {
    /// Regular (non-executable) file with the given content.
    #[must_use]
    pub fn file(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: "100644".to_string(),
            kind: "blob".to_string(),
            content: content.into(),
        }
    }
}

/// Pull request to open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    /// Source branch, `owner:branch` when it lives in a fork.
    pub head: String,
    /// Target branch in the base repository.
    pub base: String,
}

/// Pull request that was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub url: String,
}

/// License template served by `GET /licenses/{key}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub spdx_id: Option<String>,
    /// Template text with `[year]` and `[fullname]` placeholders.
    #[serde(default)]
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_repository_record() {
        let json = r#"{
            "id": 7,
            "name": "widget",
            "full_name": "acme/widget",
            "owner": { "login": "acme" },
            "description": null,
            "fork": false,
            "default_branch": "main",
            "created_at": "2015-04-01T10:00:00Z",
            "updated_at": "2017-06-02T10:00:00Z",
            "permissions": { "admin": true, "push": true, "pull": true },
            "license": { "key": "mit", "name": "MIT License", "spdx_id": "MIT" }
        }"#;

        let repo: RepoRecord = serde_json::from_str(json).unwrap();
        assert_eq!(repo.full_name, "acme/widget");
        assert_eq!(repo.description_or_empty(), "");
        assert!(repo.can_push());
        assert_eq!(repo.created_year(), 2015);
        assert_eq!(repo.updated_year(), 2017);
        assert_eq!(repo.license.unwrap().key, "mit");
        assert!(repo.source.is_none());
    }

    #[test]
    fn missing_permissions_cannot_push() {
        let json = r#"{
            "id": 1, "name": "r", "full_name": "o/r", "owner": { "login": "o" },
            "created_at": "2015-04-01T10:00:00Z", "updated_at": "2015-04-01T10:00:00Z"
        }"#;
        let repo: RepoRecord = serde_json::from_str(json).unwrap();
        assert!(!repo.can_push());
    }

    #[test]
    fn tree_entry_file_uses_blob_mode() {
        let entry = TreeEntry::file("LICENSE", "text");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["mode"], "100644");
        assert_eq!(json["type"], "blob");
    }
}
