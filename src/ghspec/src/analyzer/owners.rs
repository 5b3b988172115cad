use super::{Analyzer, AnalyzerError};
use crate::definition::{Definition, OwnersDiff};
use crate::repository::Info;
use async_trait::async_trait;
use std::io::Write;

/// Reports declared owners that are not admins of the repository.
///
/// Only runs when both sides list owners. Handles are matched exactly, so a
/// declared `Alice` is missing when the repository reports `alice`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OwnersAnalyzer;

#[async_trait]
impl Analyzer for OwnersAnalyzer {
    fn name(&self) -> &'static str {
        "owners"
    }

    async fn diff(
        &mut self,
        definition: &Definition,
        info: &Info,
    ) -> Result<Option<String>, AnalyzerError> {
        Ok(OwnersDiff::between(&definition.owners, &info.owners).map(|diff| diff.to_string()))
    }

    fn can_fix(&self) -> bool {
        false
    }

    // TODO: add missing owners as admin collaborators once the client can invite users.
    async fn fix(
        &mut self,
        _definition: &Definition,
        _info: &Info,
        _out: &mut (dyn Write + Send),
    ) -> Result<(), AnalyzerError> {
        Err(AnalyzerError::NotImplemented {
            analyzer: self.name(),
        })
    }
}
