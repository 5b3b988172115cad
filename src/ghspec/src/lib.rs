#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod analyzer;
pub mod client;
pub mod config;
pub mod definition;
pub mod license;
pub mod rate_limit;
pub mod remediation;
pub mod repository;
pub mod runner;
pub mod summary;
pub mod templates;

#[cfg(test)]
pub(crate) mod testing;

pub use analyzer::{default_analyzers, Analyzer, AnalyzerError, LicenseAnalyzer};
pub use client::{ClientError, GitHubClient, HostingClient};
pub use config::{load_settings, ConfigError, Settings};
pub use definition::{
    load_definitions, save_definitions, Definition, DefinitionError, DefinitionSet,
};
pub use license::{AuthorInfo, LicenseCache, LicenseError};
pub use rate_limit::{check_core_rate_limit, ensure_core_rate_limit, wait_if_needed, RateLimitInfo};
pub use remediation::{ApplyError, PrParams, Remediator};
pub use repository::{ForkWait, Info, RepositoryScope};
pub use runner::{
    AlwaysConfirm, Confirm, LicenseListing, LicenseMode, Runner, RunnerConfig, RunnerError,
};
pub use summary::{ProcessingResult, RunSummary};
pub use templates::{PrFormats, TemplateError, TemplateRenderer};
