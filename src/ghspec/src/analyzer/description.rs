use super::{Analyzer, AnalyzerError};
use crate::definition::{Definition, StringDiff};
use crate::repository::Info;
use async_trait::async_trait;
use std::io::Write;

/// Compares the repository description.
#[derive(Debug, Default, Clone, Copy)]
pub struct DescriptionAnalyzer;

#[async_trait]
impl Analyzer for DescriptionAnalyzer {
    fn name(&self) -> &'static str {
        "description"
    }

    async fn diff(
        &mut self,
        definition: &Definition,
        info: &Info,
    ) -> Result<Option<String>, AnalyzerError> {
        Ok(StringDiff::between(
            self.name(),
            &definition.description,
            info.repo.description_or_empty(),
        )
        .map(|diff| diff.to_string()))
    }

    fn can_fix(&self) -> bool {
        false
    }

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
