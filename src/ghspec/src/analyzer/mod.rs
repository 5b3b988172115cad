//! Per-attribute comparison of declared and observed repository state.
//!
//! Each [`Analyzer`] reports a textual diff for one attribute and, where
//! supported, fixes it.

mod description;
mod error;
mod license;
mod owners;
mod patents;

pub use description::DescriptionAnalyzer;
pub use error::AnalyzerError;
pub use license::LicenseAnalyzer;
pub use owners::OwnersAnalyzer;
pub use patents::PatentsAnalyzer;

use crate::definition::Definition;
use crate::repository::Info;
use async_trait::async_trait;
use std::io::Write;

/// Compares one attribute of a repository with its definition.
#[async_trait]
pub trait Analyzer: Send {
    fn name(&self) -> &'static str;

    /// Describes how `info` differs from `definition`, or `None` when it matches.
    ///
    /// # Errors
    ///
    /// Returns an error if the attribute could not be inspected.
    async fn diff(
        &mut self,
        definition: &Definition,
        info: &Info,
    ) -> Result<Option<String>, AnalyzerError>;

    /// Whether [`Analyzer::fix`] can succeed.
    fn can_fix(&self) -> bool;

    /// Changes the repository to match `definition`, narrating progress to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::NotImplemented`] for attributes that cannot be
    /// changed, or the error of the failed fix.
    async fn fix(
        &mut self,
        definition: &Definition,
        info: &Info,
        out: &mut (dyn Write + Send),
    ) -> Result<(), AnalyzerError>;
}

/// Description, owners, license and patents analyzers, in that order.
#[must_use]
pub fn default_analyzers(license: LicenseAnalyzer) -> Vec<Box<dyn Analyzer>> {
    vec![
        Box::new(DescriptionAnalyzer),
        Box::new(OwnersAnalyzer),
        Box::new(license),
        Box::new(PatentsAnalyzer),
    ]
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::testing::repo_record;

    pub(crate) fn definition() -> Definition {
        Definition {
            full_name: "acme/widget".to_string(),
            description: "A widget".to_string(),
            owners: vec!["alice".to_string()],
            license: String::new(),
            has_patents: false,
        }
    }

    pub(crate) fn info() -> Info {
        let mut repo = repo_record("acme/widget", 1);
        repo.description = Some("A widget".to_string());
        Info {
            repo,
            repo_license: None,
            is_empty: false,
            owners: vec!["alice".to_string()],
            has_patents: false,
        }
    }

    #[test]
    fn default_analyzer_names() {
        let analyzers = default_analyzers(LicenseAnalyzer::new(""));
        let names: Vec<_> = analyzers.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["description", "owners", "license", "patents"]);
    }

    #[tokio::test]
    async fn matching_state_has_no_diffs() {
        let mut analyzers = default_analyzers(LicenseAnalyzer::new("Acme"));
        for analyzer in &mut analyzers {
            assert!(analyzer.diff(&definition(), &info()).await.unwrap().is_none());
        }
    }
}
