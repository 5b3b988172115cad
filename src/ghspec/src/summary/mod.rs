//! Run summary types and helpers.

mod result;
mod run_summary;

pub use result::ProcessingResult;
pub use run_summary::{pluralize, RunSummary};
