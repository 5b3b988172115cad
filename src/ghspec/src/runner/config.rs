//! Runner configuration.

use crate::config::Settings;
use crate::repository::{ForkWait, RepositoryScope};
use crate::templates::PrFormats;

/// Configuration for a ghspec run.
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// GitHub token used for API calls. Anonymous when unset.
    token: Option<String>,
    /// REST API root for GitHub Enterprise.
    api_base_url: Option<String>,
    /// Organization or user whose repositories are processed.
    scope: Option<RepositoryScope>,
    /// Copyright holder for rendered licenses.
    author: String,
    /// Pull request formats. Each command has its own default.
    pr_formats: Option<PrFormats>,
    /// How long to wait for new forks.
    fork_wait: ForkWait,
}

impl RunnerConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self {
            token,
            ..Self::default()
        }
    }

    /// Creates a configuration from loaded settings.
    ///
    /// The scope is not taken from `settings`, since not every command needs one.
    #[must_use]
    pub fn from_settings(settings: &Settings, token: Option<String>) -> Self {
        Self {
            token,
            api_base_url: settings.github.api_base_url.clone(),
            scope: None,
            author: settings.author().to_string(),
            pr_formats: settings.pull_request.clone(),
            fork_wait: settings.fork.fork_wait(),
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: RepositoryScope) -> Self {
        self.scope = Some(scope);
        self
    }

    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    #[must_use]
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = Some(api_base_url.into());
        self
    }

    #[must_use]
    pub fn with_pr_formats(mut self, pr_formats: PrFormats) -> Self {
        self.pr_formats = Some(pr_formats);
        self
    }

    #[must_use]
    pub fn with_fork_wait(mut self, fork_wait: ForkWait) -> Self {
        self.fork_wait = fork_wait;
        self
    }

    /// Returns the configured GitHub token.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url.as_deref()
    }

    pub fn scope(&self) -> Option<&RepositoryScope> {
        self.scope.as_ref()
    }

    /// Returns the copyright holder, empty when unknown.
    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn pr_formats(&self) -> Option<&PrFormats> {
        self.pr_formats.as_ref()
    }

    pub fn fork_wait(&self) -> ForkWait {
        self.fork_wait
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_settings_copies_values() {
        let settings = Settings::parse(
            "author = \"Jane\"\nuser = \"jane\"\n[fork]\ntimeout-secs = 5\n",
            "ghspec.toml",
        )
        .unwrap();

        let config = RunnerConfig::from_settings(&settings, Some("token".to_string()));
        assert_eq!(config.author(), "Jane");
        assert_eq!(config.token(), Some("token"));
        assert_eq!(config.fork_wait().timeout().as_secs(), 5);
        assert!(config.scope().is_none());
        assert!(config.pr_formats().is_none());
    }
}
