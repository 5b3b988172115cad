//! Pull request formats rendered with Handlebars.
//!
//! Formats may reference `{{license}}` (license display name) and
//! `{{repository}}` (full name of the target repository).

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{validate_branch_name, TemplateRenderer};

use crate::remediation::{DEFAULT_BRANCH, DEFAULT_TITLE};
use serde::Deserialize;

/// Body used by the standalone license tool.
pub const DEFAULT_BODY_FORMAT: &str = "Use standard version of {{license}}.";

/// Body used when fixing a repository that differs from its declaration.
pub const DECLARATION_FIX_BODY_FORMAT: &str =
    "Fix license for repository to match specification.";

/// Handlebars formats for the branch, title and body of a fix pull request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PrFormats {
    pub branch: String,
    pub title: String,
    pub body: String,
}

impl Default for PrFormats {
    fn default() -> Self {
        Self {
            branch: DEFAULT_BRANCH.to_string(),
            title: DEFAULT_TITLE.to_string(),
            body: DEFAULT_BODY_FORMAT.to_string(),
        }
    }
}

impl PrFormats {
    /// Defaults for fixes made while applying a declaration file.
    #[must_use]
    pub fn declaration_fix() -> Self {
        Self {
            body: DECLARATION_FIX_BODY_FORMAT.to_string(),
            ..Self::default()
        }
    }
}
