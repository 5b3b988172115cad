//! Template rendering error types.

/// Errors produced while rendering pull request formats.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Handlebars rendering error.
    #[error("Template rendering error: {0}")]
    RenderError(#[from] handlebars::RenderError),

    /// Rendered branch is not a valid git reference name.
    #[error("Invalid branch name '{branch}': {message}")]
    InvalidBranch { branch: String, message: String },
}
