//! Memoized access to license templates.

use super::{LicenseError, Registry};
use crate::client::HostingClient;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Hex encoded SHA-256 of `content`.
#[must_use]
pub fn content_checksum(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Fetches license templates from the hosting service once per key.
///
/// Templates with a registered checksum are verified before they are cached.
pub struct LicenseCache {
    client: Arc<dyn HostingClient>,
    registry: &'static Registry,
    bodies: HashMap<String, String>,
}

impl LicenseCache {
    /// Creates a cache backed by the built-in registry.
    #[must_use]
    pub fn new(client: Arc<dyn HostingClient>) -> Self {
        Self::with_registry(client, Registry::builtin())
    }

    /// Creates a cache that verifies templates against `registry`.
    #[must_use]
    pub fn with_registry(client: Arc<dyn HostingClient>, registry: &'static Registry) -> Self {
        Self {
            client,
            registry,
            bodies: HashMap::new(),
        }
    }

    /// Registry used for checksums and alias resolution.
    #[must_use]
    pub fn registry(&self) -> &'static Registry {
        self.registry
    }

    /// Whether the template for `key` has been fetched already.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.bodies.contains_key(key)
    }

    /// Returns the template body for a canonical license key.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Fetch`] if the service call fails and
    /// [`LicenseError::ChecksumMismatch`] if the body does not match the
    /// registered checksum. Failed lookups are not cached.
    pub async fn get(&mut self, key: &str) -> Result<String, LicenseError> {
        if let Some(body) = self.bodies.get(key) {
            return Ok(body.clone());
        }

        let license = self
            .client
            .get_license(key)
            .await
            .map_err(|source| LicenseError::Fetch {
                key: key.to_string(),
                source,
            })?;

        if let Some(expected) = self.registry.lookup(key).and_then(|s| s.sha256.as_deref()) {
            let actual = content_checksum(&license.body);
            if actual != expected {
                return Err(LicenseError::ChecksumMismatch {
                    key: key.to_string(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        debug!(license = key, "Cached license template");
        self.bodies.insert(key.to_string(), license.body.clone());
        Ok(license.body)
    }
}
