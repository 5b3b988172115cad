//! Run summary types.

use super::result::ProcessingResult;
use crate::definition::sort_case_insensitive;

/// Formats a count with the singular or plural noun.
#[must_use]
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Summary of a complete run. Every list is sorted case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Repositories that matched.
    pub ok: Vec<String>,

    /// Repositories that differ, with their diffs.
    pub differing: Vec<(String, Vec<String>)>,

    /// Repositories without a definition.
    pub unexpected: Vec<String>,

    /// Declared repositories that do not exist.
    pub missing: Vec<String>,

    /// Repositories whose license type was not detected, with the reason.
    pub undetermined: Vec<(String, String)>,

    /// Repositories fixed by pull requests.
    pub fixed: Vec<String>,

    /// Repositories skipped, with the reason.
    pub skipped: Vec<(String, String)>,

    /// Repositories that could not be processed or fixed, with the error.
    pub failed: Vec<(String, String)>,

    /// Number of pull requests opened.
    pub prs_opened: usize,
}

fn insert_sorted(list: &mut Vec<String>, repository: &str) {
    list.push(repository.to_string());
    sort_case_insensitive(list);
}

fn insert_sorted_pair<T>(list: &mut Vec<(String, T)>, repository: &str, value: T) {
    list.push((repository.to_string(), value));
    list.sort_by_key(|(name, _)| name.to_lowercase());
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the summary with a processing result.
    pub fn record_result(&mut self, result: &ProcessingResult) {
        let repository = result.repository();
        match result {
            ProcessingResult::Matches { .. } => insert_sorted(&mut self.ok, repository),
            ProcessingResult::Differs { diffs, .. } => {
                insert_sorted_pair(&mut self.differing, repository, diffs.clone());
            }
            ProcessingResult::Fixed { pull_requests, .. } => {
                insert_sorted(&mut self.fixed, repository);
                self.prs_opened += pull_requests;
            }
            ProcessingResult::Unexpected { .. } => insert_sorted(&mut self.unexpected, repository),
            ProcessingResult::Missing { .. } => insert_sorted(&mut self.missing, repository),
            ProcessingResult::Undetermined { reason, .. } => {
                insert_sorted_pair(&mut self.undetermined, repository, reason.clone());
            }
            ProcessingResult::Skipped { reason, .. } => {
                insert_sorted_pair(&mut self.skipped, repository, reason.clone());
            }
            ProcessingResult::Failed { error, .. } => {
                insert_sorted_pair(&mut self.failed, repository, error.clone());
            }
        }
    }

    /// Number of repositories examined.
    #[must_use]
    pub fn examined(&self) -> usize {
        self.ok.len()
            + self.differing.len()
            + self.unexpected.len()
            + self.undetermined.len()
            + self.fixed.len()
            + self.skipped.len()
            + self.failed.len()
    }

    /// Returns true if any repository differs, is unaccounted for, or failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.differing.is_empty()
            || !self.unexpected.is_empty()
            || !self.missing.is_empty()
            || !self.failed.is_empty()
    }

    /// Returns true if all repositories matched or were fixed.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures()
    }
}
