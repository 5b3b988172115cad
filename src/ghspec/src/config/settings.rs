//! Settings file deserialization.

use super::ConfigError;
use crate::repository::{ForkWait, RepositoryScope};
use crate::templates::PrFormats;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Parsed contents of a `ghspec.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    /// Copyright holder used when rendering licenses.
    pub author: Option<String>,

    /// Organization whose repositories are processed.
    pub organization: Option<String>,

    /// User whose repositories are processed.
    pub user: Option<String>,

    /// Formats for license fix pull requests.
    #[serde(default)]
    pub pull_request: Option<PrFormats>,

    #[serde(default)]
    pub fork: ForkSettings,

    #[serde(default)]
    pub github: GitHubSettings,
}

/// `[fork]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ForkSettings {
    /// Seconds to wait for a new fork. Zero means the default.
    pub timeout_secs: u64,

    /// First sleep between readiness probes, in seconds.
    pub initial_backoff_secs: u64,
}

impl Default for ForkSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            initial_backoff_secs: 1,
        }
    }
}

impl ForkSettings {
    #[must_use]
    pub fn fork_wait(&self) -> ForkWait {
        ForkWait::new(
            Duration::from_secs(self.timeout_secs),
            Duration::from_secs(self.initial_backoff_secs),
        )
    }
}

/// `[github]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct GitHubSettings {
    /// REST API root, for GitHub Enterprise.
    pub api_base_url: Option<String>,
}

impl Settings {
    /// Parses and validates settings.
    ///
    /// # Arguments
    ///
    /// * `content` - TOML text
    /// * `path` - Origin used in error messages
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TomlError`] for malformed TOML and
    /// [`ConfigError::ValidationError`] for invalid values.
    pub fn parse(content: &str, path: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(content).map_err(|e| ConfigError::TomlError {
            path: path.to_string(),
            source: e,
        })?;
        settings.validate(path)?;
        Ok(settings)
    }

    fn validate(&self, path: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::ValidationError {
            path: path.to_string(),
            message,
        };

        if let Some(base) = &self.github.api_base_url {
            if Url::parse(base).is_err() {
                return Err(invalid(format!("api-base-url is not a valid URL: {base}")));
            }
        }

        if let Some(formats) = &self.pull_request {
            for (key, format) in [
                ("branch", &formats.branch),
                ("title", &formats.title),
                ("body", &formats.body),
            ] {
                if format.trim().is_empty() {
                    return Err(invalid(format!("pull-request.{key} must not be empty")));
                }
                if let Err(e) = handlebars::Template::compile(format) {
                    return Err(invalid(format!("pull-request.{key} is not a valid template: {e}")));
                }
            }
        }

        for (key, value) in [("user", &self.user), ("organization", &self.organization)] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(invalid(format!("{key} must not be empty")));
            }
        }

        Ok(())
    }

    /// Replaces the configured scope when either flag is given.
    pub fn override_scope(&mut self, organization: Option<String>, user: Option<String>) {
        if organization.is_some() || user.is_some() {
            self.organization = organization;
            self.user = user;
        }
    }

    /// The single organization or user to process.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Scope`] unless exactly one of them is set.
    pub fn scope(&self) -> Result<RepositoryScope, ConfigError> {
        match (&self.organization, &self.user) {
            (Some(org), None) => Ok(RepositoryScope::Organization(org.clone())),
            (None, Some(user)) => Ok(RepositoryScope::User(user.clone())),
            (None, None) => Err(ConfigError::Scope {
                message: "either user or organization must be provided".to_string(),
            }),
            (Some(_), Some(_)) => Err(ConfigError::Scope {
                message: "user and organization cannot both be provided".to_string(),
            }),
        }
    }

    /// Author name, empty when unset.
    #[must_use]
    pub fn author(&self) -> &str {
        self.author.as_deref().unwrap_or_default()
    }
}
