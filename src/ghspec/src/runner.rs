//! Orchestrates declaration and license runs over a set of repositories.
//!
//! Repositories are processed one at a time. Per-repository failures are
//! recorded in the [`RunSummary`] and the run continues; only failures to list
//! repositories or to write output abort it.

mod config;
mod confirm;
mod error;

pub use config::RunnerConfig;
pub use confirm::{parse_yes_no, prompt_text, AlwaysConfirm, Confirm};
pub use error::RunnerError;

use crate::analyzer::{default_analyzers, Analyzer, AnalyzerError, LicenseAnalyzer};
use crate::client::{GitHubClient, HostingClient, RepoLicense, RepoRecord};
use crate::definition::{join_diff, save_definitions, Definition, DefinitionSet};
use crate::license::{self, create, verify, AuthorInfo, LicenseCache, LicenseError};
use crate::rate_limit::RateLimitInfo;
use crate::remediation::Remediator;
use crate::repository::{gather_info, list_repositories, with_progress, Info, RepositoryScope};
use crate::summary::{pluralize, ProcessingResult, RunSummary};
use crate::templates::{PrFormats, TemplateRenderer};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};

const FIX_QUESTION: &str = "Open PR for fix";

/// What a license run does with incorrect licenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseMode {
    /// Report them.
    Verify,
    /// Open a pull request replacing them with the standard text.
    Fix,
}

/// A license offered by the hosting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseListing {
    pub id: String,
    /// Built-in aliases, empty for licenses ghspec does not know.
    pub aliases: Vec<String>,
}

/// Orchestrates ghspec commands against one hosting client.
pub struct Runner {
    config: RunnerConfig,
    client: Arc<dyn HostingClient>,
}

impl Runner {
    /// Builds a runner talking to GitHub.
    ///
    /// # Errors
    ///
    /// Returns an error if the GitHub client cannot be built.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let client = GitHubClient::new(config.token(), config.api_base_url())?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Builds a runner on top of an existing client.
    #[must_use]
    pub fn with_client(config: RunnerConfig, client: Arc<dyn HostingClient>) -> Self {
        Self { config, client }
    }

    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    fn scope(&self) -> Result<&RepositoryScope, RunnerError> {
        self.config.scope().ok_or(RunnerError::MissingScope)
    }

    async fn repositories(&self, names: &[String]) -> Result<Vec<RepoRecord>, RunnerError> {
        let scope = self.scope()?;
        info!(scope = %scope, "Listing repositories");
        Ok(list_repositories(self.client.as_ref(), scope, names).await?)
    }

    fn analyzers(&self) -> Vec<Box<dyn Analyzer>> {
        let formats = self
            .config
            .pr_formats()
            .cloned()
            .unwrap_or_else(PrFormats::declaration_fix);
        let license = LicenseAnalyzer::new(self.config.author())
            .with_client(Arc::clone(&self.client))
            .with_formats(formats)
            .with_fork_wait(self.config.fork_wait());
        default_analyzers(license)
    }

    /// Current core rate limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate limit cannot be fetched.
    pub async fn rate_limit(&self) -> Result<RateLimitInfo, RunnerError> {
        Ok(self.client.rate_limit().await?)
    }

    /// Licenses offered by the hosting service, sorted by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the licenses cannot be listed.
    pub async fn list_licenses(&self) -> Result<Vec<LicenseListing>, RunnerError> {
        let mut listings: Vec<LicenseListing> = self
            .client
            .list_licenses()
            .await?
            .into_iter()
            .map(|l| LicenseListing {
                aliases: license::aliases(&l.key).to_vec(),
                id: l.key,
            })
            .collect();
        listings.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(listings)
    }

    /// Text of license `id` for the configured author, dated `year`.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be fetched, or it needs an
    /// author and none is configured.
    pub async fn render_license(&self, id: &str, year: i32) -> Result<String, RunnerError> {
        let mut cache = LicenseCache::new(Arc::clone(&self.client));
        let author = AuthorInfo::new(self.config.author(), year, year);
        Ok(create(id, &mut cache, author.as_ref()).await?)
    }

    /// Writes a declaration file describing the current state of the repositories.
    ///
    /// # Arguments
    ///
    /// * `names` - Repositories to describe, all of the scope when empty
    /// * `output` - Declaration file to write
    /// * `out` - Progress sink
    ///
    /// # Errors
    ///
    /// Returns an error if any repository cannot be read or the file cannot be written.
    pub async fn create_spec(
        &self,
        names: &[String],
        output: &Path,
        out: &mut (dyn Write + Send),
    ) -> Result<Vec<Definition>, RunnerError> {
        let repos = self.repositories(names).await?;
        let mut definitions = Vec::with_capacity(repos.len());

        for (repo, _) in with_progress(&repos) {
            write!(out, "Generating definition for {}...", repo.full_name)?;
            match gather_info(self.client.as_ref(), repo).await {
                Ok(info) => {
                    definitions.push(info.to_definition());
                    writeln!(out, "done")?;
                }
                Err(e) => {
                    writeln!(out, "failed")?;
                    return Err(e.into());
                }
            }
        }

        save_definitions(output, &definitions)?;
        writeln!(
            out,
            "Wrote definitions for {} to {}",
            pluralize(definitions.len(), "repository", "repositories"),
            output.display()
        )?;
        Ok(definitions)
    }

    /// Compares repositories with their definitions.
    ///
    /// With an empty `names`, declared repositories that were not found are
    /// reported as missing.
    ///
    /// # Errors
    ///
    /// Returns an error if repositories cannot be listed or output cannot be written.
    pub async fn verify(
        &self,
        definitions: &DefinitionSet,
        names: &[String],
        out: &mut (dyn Write + Send),
    ) -> Result<RunSummary, RunnerError> {
        let span = info_span!("verify", definitions = definitions.len());

        async {
            let repos = self.repositories(names).await?;
            let mut analyzers = self.analyzers();
            let mut summary = RunSummary::new();
            let mut seen = HashSet::new();

            for (repo, progress) in with_progress(&repos) {
                write!(
                    out,
                    "Verifying repository {} against definition ({progress})...",
                    repo.name
                )?;
                let repository = repo.full_name.clone();

                let Some(definition) = definitions.get(&repo.full_name) else {
                    writeln!(out, "no definition for repository")?;
                    summary.record_result(&ProcessingResult::Unexpected { repository });
                    continue;
                };
                seen.insert(repo.full_name.to_lowercase());

                let result = match gather_info(self.client.as_ref(), repo).await {
                    Err(e) => {
                        writeln!(out, "failed to get repository info")?;
                        warn!(repo = %repository, error = %e, "Failed to gather repository info");
                        ProcessingResult::Failed {
                            repository,
                            error: e.to_string(),
                        }
                    }
                    Ok(info) => {
                        let analysis = diff_all(&mut analyzers, definition, &info).await;
                        match (analysis.diffs.is_empty(), analysis.errors.is_empty()) {
                            (true, true) => writeln!(out, "OK")?,
                            (false, true) => writeln!(out, "differs from definition")?,
                            (true, false) => writeln!(out, "failed to analyze repository")?,
                            (false, false) => writeln!(
                                out,
                                "differs from definition, failed to analyze repository"
                            )?,
                        }
                        if !analysis.errors.is_empty() {
                            summary.record_result(&ProcessingResult::Failed {
                                repository: repository.clone(),
                                error: analysis.errors.join("; "),
                            });
                        }
                        if analysis.diffs.is_empty() {
                            if analysis.errors.is_empty() {
                                summary.record_result(&ProcessingResult::Matches { repository });
                            }
                            continue;
                        }
                        ProcessingResult::Differs {
                            repository,
                            diffs: analysis.diffs.into_iter().map(|(_, diff)| diff).collect(),
                        }
                    }
                };
                summary.record_result(&result);
            }

            if names.is_empty() {
                record_missing(&mut summary, definitions, &seen);
            }
            Ok(summary)
        }
        .instrument(span)
        .await
    }

    /// Compares repositories with their definitions and fixes what differs.
    ///
    /// Each differing repository is confirmed through `confirm` before any
    /// pull request is opened. Attributes that cannot be fixed automatically
    /// mark the repository as failed.
    ///
    /// # Errors
    ///
    /// Returns an error if repositories cannot be listed, output cannot be
    /// written, or the confirmation cannot be read.
    pub async fn apply(
        &self,
        definitions: &DefinitionSet,
        names: &[String],
        confirm: &mut dyn Confirm,
        out: &mut (dyn Write + Send),
    ) -> Result<RunSummary, RunnerError> {
        let span = info_span!("apply", definitions = definitions.len());

        async {
            let repos = self.repositories(names).await?;
            let mut analyzers = self.analyzers();
            let mut summary = RunSummary::new();
            let mut seen = HashSet::new();

            for (repo, progress) in with_progress(&repos) {
                write!(
                    out,
                    "Verifying repository {} against definition ({progress})...",
                    repo.name
                )?;

                let Some(definition) = definitions.get(&repo.full_name) else {
                    writeln!(out, "no definition for repository")?;
                    summary.record_result(&ProcessingResult::Failed {
                        repository: repo.full_name.clone(),
                        error: "missing definition (deleting repositories not implemented)"
                            .to_string(),
                    });
                    continue;
                };
                seen.insert(repo.full_name.to_lowercase());

                let result = self
                    .apply_definition(repo, definition, &mut analyzers, confirm, out)
                    .await?;
                summary.record_result(&result);
            }

            if names.is_empty() {
                record_missing(&mut summary, definitions, &seen);
            }
            Ok(summary)
        }
        .instrument(span)
        .await
    }

    async fn apply_definition(
        &self,
        repo: &RepoRecord,
        definition: &Definition,
        analyzers: &mut [Box<dyn Analyzer>],
        confirm: &mut dyn Confirm,
        out: &mut (dyn Write + Send),
    ) -> Result<ProcessingResult, RunnerError> {
        let repository = repo.full_name.clone();
        let failed = |error: String| ProcessingResult::Failed {
            repository: repo.full_name.clone(),
            error,
        };

        let info = match gather_info(self.client.as_ref(), repo).await {
            Ok(info) => info,
            Err(e) => {
                writeln!(out, "failed to get repository info")?;
                return Ok(failed(format!("failed to get repository information: {e}")));
            }
        };
        if info.is_empty {
            writeln!(out, "repository is empty")?;
            return Ok(failed(
                "repository is empty (fixing empty repositories not implemented)".to_string(),
            ));
        }

        let Analysis { diffs, mut errors } = diff_all(analyzers, definition, &info).await;
        if diffs.is_empty() {
            if errors.is_empty() {
                writeln!(out, "OK")?;
                return Ok(ProcessingResult::Matches { repository });
            }
            writeln!(out, "failed to analyze repository")?;
            return Ok(failed(errors.join("; ")));
        }

        if errors.is_empty() {
            writeln!(out, "differs from definition")?;
        } else {
            writeln!(out, "differs from definition, failed to analyze repository")?;
        }
        for (_, diff) in &diffs {
            for line in diff.lines() {
                writeln!(out, "\t{line}")?;
            }
        }
        if !confirm.confirm(FIX_QUESTION, out)? {
            errors.insert(0, "user skipped fix".to_string());
            return Ok(failed(errors.join("; ")));
        }

        let mut pull_requests = 0;
        for (index, _) in &diffs {
            let analyzer = &mut analyzers[*index];
            let name = analyzer.name();
            let outcome = if analyzer.can_fix() {
                analyzer.fix(definition, &info, out).await
            } else {
                Err(AnalyzerError::NotImplemented { analyzer: name })
            };
            match outcome {
                Ok(()) => pull_requests += 1,
                Err(e) => {
                    warn!(repo = %repository, analyzer = name, error = %e, "Fix failed");
                    errors.push(format!("{name}: {e}"));
                }
            }
        }

        if errors.is_empty() {
            Ok(ProcessingResult::Fixed {
                repository,
                pull_requests,
            })
        } else {
            Ok(failed(errors.join("; ")))
        }
    }

    /// Verifies every repository's license file, optionally opening fix pull requests.
    ///
    /// # Errors
    ///
    /// Returns an error if repositories cannot be listed, output cannot be
    /// written, or the confirmation cannot be read.
    pub async fn check_licenses(
        &self,
        mode: LicenseMode,
        names: &[String],
        confirm: &mut dyn Confirm,
        out: &mut (dyn Write + Send),
    ) -> Result<RunSummary, RunnerError> {
        let span = info_span!("check_licenses", mode = ?mode);

        async {
            let repos = self.repositories(names).await?;
            let mut cache = LicenseCache::new(Arc::clone(&self.client));
            let formats = self.config.pr_formats().cloned().unwrap_or_default();
            let renderer = TemplateRenderer::new();
            let mut summary = RunSummary::new();

            for (repo, progress) in with_progress(&repos) {
                write!(
                    out,
                    "Verifying license for repository {} ({progress})...",
                    repo.name
                )?;
                let result = self
                    .check_license(repo, mode, &mut cache, &formats, &renderer, confirm, out)
                    .await?;
                summary.record_result(&result);
            }
            Ok(summary)
        }
        .instrument(span)
        .await
    }

    async fn detected_license(&self, repo: &RepoRecord) -> Result<Option<RepoLicense>, RunnerError> {
        match self
            .client
            .get_repo_license(&repo.owner.login, &repo.name)
            .await
        {
            Ok(license) => Ok(Some(license)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn check_license(
        &self,
        repo: &RepoRecord,
        mode: LicenseMode,
        cache: &mut LicenseCache,
        formats: &PrFormats,
        renderer: &TemplateRenderer,
        confirm: &mut dyn Confirm,
        out: &mut (dyn Write + Send),
    ) -> Result<ProcessingResult, RunnerError> {
        let repository = repo.full_name.clone();

        let observed = match self.detected_license(repo).await {
            Ok(observed) => observed,
            Err(e) => {
                writeln!(out)?;
                return Ok(ProcessingResult::Failed {
                    repository,
                    error: format!("failed to get license: {e}"),
                });
            }
        };

        match verify(observed.as_ref(), repo, self.config.author(), cache).await {
            Ok(_) => {
                writeln!(out, "OK")?;
                Ok(ProcessingResult::Matches { repository })
            }
            Err(e) if e.is_missing() => {
                writeln!(out, "unable to detect license")?;
                Ok(ProcessingResult::Undetermined {
                    repository,
                    reason: e.to_string(),
                })
            }
            Err(LicenseError::Incorrect { message, diff }) => {
                writeln!(out, "incorrect")?;
                if mode == LicenseMode::Verify {
                    return Ok(ProcessingResult::Differs {
                        repository,
                        diffs: vec![join_diff(&message, diff.lines())],
                    });
                }
                let Some(detected) = observed.and_then(|o| o.license) else {
                    return Ok(ProcessingResult::Failed {
                        repository,
                        error: "license type not detected".to_string(),
                    });
                };
                self.fix_license(
                    repo,
                    &detected.key,
                    &detected.name,
                    cache,
                    formats,
                    renderer,
                    confirm,
                    out,
                )
                .await
            }
            Err(e) => {
                writeln!(out)?;
                error!(repo = %repository, error = %e, "Failed to verify license");
                Ok(ProcessingResult::Failed {
                    repository,
                    error: format!("failed to verify license: {e}"),
                })
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn fix_license(
        &self,
        repo: &RepoRecord,
        key: &str,
        name: &str,
        cache: &mut LicenseCache,
        formats: &PrFormats,
        renderer: &TemplateRenderer,
        confirm: &mut dyn Confirm,
        out: &mut (dyn Write + Send),
    ) -> Result<ProcessingResult, RunnerError> {
        let repository = repo.full_name.clone();
        let failed = |error: String| ProcessingResult::Failed {
            repository: repo.full_name.clone(),
            error,
        };

        let info: Info = match gather_info(self.client.as_ref(), repo).await {
            Ok(info) => info,
            Err(e) => {
                writeln!(out, "Failed to get information required to fix repository: {e}")?;
                return Ok(failed(e.to_string()));
            }
        };
        if info.is_empty {
            return Ok(failed(format!("repository {} is an empty repository", repo.name)));
        }

        if !confirm.confirm(FIX_QUESTION, out)? {
            return Ok(ProcessingResult::Skipped {
                repository,
                reason: "user skipped fix".to_string(),
            });
        }

        let params = match renderer.render_pr_params(formats, name, &repo.full_name) {
            Ok(params) => params,
            Err(e) => return Ok(failed(e.to_string())),
        };
        let remediator =
            Remediator::new(Arc::clone(&self.client)).with_fork_wait(self.config.fork_wait());
        match remediator
            .apply_standard(&info, key, self.config.author(), &params, cache, out)
            .await
        {
            Ok(_) => Ok(ProcessingResult::Fixed {
                repository,
                pull_requests: 1,
            }),
            Err(e) => {
                writeln!(out)?;
                Ok(failed(format!("failed to fix license: {e}")))
            }
        }
    }
}

/// Outcome of running every analyzer against one repository.
#[derive(Debug, Default)]
struct Analysis {
    /// Index of each differing analyzer with its diff.
    diffs: Vec<(usize, String)>,
    /// Errors of analyzers that could not compare their attribute.
    errors: Vec<String>,
}

/// Runs every analyzer. A failing analyzer does not stop the others.
async fn diff_all(
    analyzers: &mut [Box<dyn Analyzer>],
    definition: &Definition,
    info: &Info,
) -> Analysis {
    let mut analysis = Analysis::default();
    for (index, analyzer) in analyzers.iter_mut().enumerate() {
        match analyzer.diff(definition, info).await {
            Ok(Some(diff)) => analysis.diffs.push((index, diff)),
            Ok(None) => {}
            Err(e) => {
                warn!(
                    repo = %info.full_name(),
                    analyzer = analyzer.name(),
                    error = %e,
                    "Analysis failed"
                );
                analysis.errors.push(e.to_string());
            }
        }
    }
    analysis
}

fn record_missing(summary: &mut RunSummary, definitions: &DefinitionSet, seen: &HashSet<String>) {
    for name in definitions.names() {
        if !seen.contains(&name.to_lowercase()) {
            summary.record_result(&ProcessingResult::Missing {
                repository: name.to_string(),
            });
        }
    }
}
