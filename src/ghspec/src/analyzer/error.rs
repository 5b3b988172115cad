//! Analyzer error types.

use crate::license::LicenseError;
use crate::remediation::ApplyError;
use crate::templates::TemplateError;
use thiserror::Error;

/// Errors returned by [`Analyzer`](super::Analyzer) operations.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The attribute is detected but cannot be changed automatically.
    #[error("not implemented: {analyzer} cannot be fixed automatically")]
    NotImplemented { analyzer: &'static str },

    /// The analyzer was built without a hosting client.
    #[error("{analyzer} analyzer has no hosting client")]
    Unconfigured { analyzer: &'static str },

    /// Verifying license content failed for a reason other than a mismatch.
    #[error("failed to verify license: {0}")]
    License(#[from] LicenseError),

    /// Opening the fix pull request failed.
    #[error("failed to fix license: {0}")]
    Apply(#[from] ApplyError),

    /// Rendering the pull request parameters failed.
    #[error("failed to render pull request: {0}")]
    Template(#[from] TemplateError),
}

impl AnalyzerError {
    /// Whether the failure is the expected "cannot fix" outcome.
    #[must_use]
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented { .. })
    }
}
