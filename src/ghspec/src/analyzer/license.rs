use super::{Analyzer, AnalyzerError};
use crate::client::HostingClient;
use crate::definition::{join_diff, DeclaredLicense, Definition, StringDiff};
use crate::license::{missing_license, verify, LicenseCache, LicenseError, Registry};
use crate::remediation::Remediator;
use crate::repository::{ForkWait, Info};
use crate::templates::{PrFormats, TemplateRenderer};
use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

/// Compares the license type and content, and opens pull requests to fix them.
///
/// Without a hosting client only the detected license type is compared and
/// [`Analyzer::can_fix`] is false.
pub struct LicenseAnalyzer {
    author: String,
    client: Option<Arc<dyn HostingClient>>,
    cache: Option<LicenseCache>,
    formats: PrFormats,
    fork_wait: ForkWait,
    renderer: TemplateRenderer,
}

impl LicenseAnalyzer {
    /// Creates an analyzer that renders templates for `author`.
    #[must_use]
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            client: None,
            cache: None,
            formats: PrFormats::declaration_fix(),
            fork_wait: ForkWait::default(),
            renderer: TemplateRenderer::new(),
        }
    }

    /// Enables content verification and fixes through `client`.
    #[must_use]
    pub fn with_client(self, client: Arc<dyn HostingClient>) -> Self {
        let cache = LicenseCache::new(Arc::clone(&client));
        self.with_cache(client, cache)
    }

    /// Like [`LicenseAnalyzer::with_client`], reusing an existing template cache.
    #[must_use]
    pub fn with_cache(mut self, client: Arc<dyn HostingClient>, cache: LicenseCache) -> Self {
        self.client = Some(client);
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn with_formats(mut self, formats: PrFormats) -> Self {
        self.formats = formats;
        self
    }

    #[must_use]
    pub fn with_fork_wait(mut self, fork_wait: ForkWait) -> Self {
        self.fork_wait = fork_wait;
        self
    }

    fn registry(&self) -> &'static Registry {
        self.cache
            .as_ref()
            .map_or_else(Registry::builtin, LicenseCache::registry)
    }

    fn missing(&self, info: &Info) -> String {
        join_diff(self.name(), [missing_license(&info.repo).to_string()])
    }
}

/// Display name of the detected license, falling back to its key.
fn detected_name(info: &Info) -> &str {
    info.repo_license
        .as_ref()
        .and_then(|l| l.license.as_ref())
        .or(info.repo.license.as_ref())
        .map_or("unknown", |l| l.name.as_str())
}

#[async_trait]
impl Analyzer for LicenseAnalyzer {
    fn name(&self) -> &'static str {
        "license"
    }

    async fn diff(
        &mut self,
        definition: &Definition,
        info: &Info,
    ) -> Result<Option<String>, AnalyzerError> {
        let declared = definition.declared_license();
        if declared == DeclaredLicense::Custom {
            return Ok(None);
        }

        let registry = self.registry();
        let want = declared
            .expected_id()
            .map(|id| registry.resolve(id))
            .unwrap_or_default();
        let got = info
            .license_id()
            .map(|id| registry.resolve(id))
            .unwrap_or_default();

        if want.is_empty() && got.is_empty() {
            return Ok(None);
        }
        if got.is_empty() {
            return Ok(Some(self.missing(info)));
        }
        if want != got {
            return Ok(StringDiff::between("license type", &want, &got).map(|d| d.to_string()));
        }

        let Some(cache) = self.cache.as_mut() else {
            debug!(repo = %info.full_name(), "No client, skipping license content check");
            return Ok(None);
        };
        match verify(info.repo_license.as_ref(), &info.repo, &self.author, cache).await {
            Ok(_) => Ok(None),
            Err(LicenseError::Incorrect { message, diff }) => {
                let header = format!("{} content ({})", info.license_path(), detected_name(info));
                let lines = std::iter::once(message.as_str()).chain(diff.lines());
                Ok(Some(join_diff(&header, lines)))
            }
            Err(e) if e.is_missing() => Ok(Some(join_diff(self.name(), [e.to_string()]))),
            Err(e) => Err(e.into()),
        }
    }

    fn can_fix(&self) -> bool {
        self.client.is_some() && self.cache.is_some()
    }

    async fn fix(
        &mut self,
        definition: &Definition,
        info: &Info,
        out: &mut (dyn Write + Send),
    ) -> Result<(), AnalyzerError> {
        let (Some(client), Some(cache)) = (self.client.as_ref(), self.cache.as_mut()) else {
            return Err(AnalyzerError::Unconfigured {
                analyzer: "license",
            });
        };
        let Some(id) = definition.declared_license().expected_id() else {
            return Err(AnalyzerError::NotImplemented {
                analyzer: "license",
            });
        };

        let key = cache.registry().resolve(id);
        let params = self
            .renderer
            .render_pr_params(&self.formats, &key, info.full_name())?;
        Remediator::new(Arc::clone(client))
            .with_fork_wait(self.fork_wait)
            .apply_standard(info, &key, &self.author, &params, cache, out)
            .await?;
        Ok(())
    }
}
