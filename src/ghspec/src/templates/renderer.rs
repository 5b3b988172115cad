//! Template renderer.

use super::{PrFormats, TemplateError};
use crate::remediation::PrParams;
use bstr::ByteSlice;
use handlebars::{no_escape, Handlebars};
use serde_json::{json, Value};

/// Checks that `branch` can be created as `refs/heads/<branch>`.
///
/// # Errors
///
/// Returns [`TemplateError::InvalidBranch`] describing the first violation.
pub fn validate_branch_name(branch: &str) -> Result<(), TemplateError> {
    let reference = format!("refs/heads/{branch}");
    gix_validate::reference::name(reference.as_bytes().as_bstr()).map_err(|e| {
        TemplateError::InvalidBranch {
            branch: branch.to_string(),
            message: e.to_string(),
        }
    })?;
    Ok(())
}

/// Template renderer for pull request parameters.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Creates a renderer that leaves output unescaped and rejects unknown
    /// variables.
    #[must_use]
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(no_escape);
        handlebars.set_strict_mode(true);
        Self { handlebars }
    }

    /// Renders the branch, title and body of a license fix pull request.
    ///
    /// # Arguments
    ///
    /// * `formats` - Handlebars formats
    /// * `license` - Display name of the license being applied
    /// * `repository` - Full name of the target repository
    ///
    /// # Errors
    ///
    /// Returns an error if a format fails to render or the rendered branch is
    /// not a valid reference name.
    pub fn render_pr_params(
        &self,
        formats: &PrFormats,
        license: &str,
        repository: &str,
    ) -> Result<PrParams, TemplateError> {
        let data = json!({
            "license": license,
            "repository": repository,
        });

        let branch = self.render_template(&formats.branch, &data)?;
        validate_branch_name(&branch)?;

        Ok(PrParams {
            branch,
            title: self.render_template(&formats.title, &data)?,
            body: self.render_template(&formats.body, &data)?,
        })
    }

    /// Renders a template with the given data.
    fn render_template(&self, template: &str, data: &Value) -> Result<String, TemplateError> {
        Ok(self.handlebars.render_template(template, data)?)
    }
}
