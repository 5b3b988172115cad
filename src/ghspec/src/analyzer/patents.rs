use super::{Analyzer, AnalyzerError};
use crate::definition::{BoolDiff, Definition};
use crate::repository::Info;
use async_trait::async_trait;
use std::io::Write;

/// Checks for a `PATENTS` file at the repository root.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatentsAnalyzer;

#[async_trait]
impl Analyzer for PatentsAnalyzer {
    fn name(&self) -> &'static str {
        "patents"
    }

    async fn diff(
        &mut self,
        definition: &Definition,
        info: &Info,
    ) -> Result<Option<String>, AnalyzerError> {
        Ok(
            BoolDiff::between("has patents", definition.has_patents, info.has_patents)
                .map(|diff| diff.to_string()),
        )
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
