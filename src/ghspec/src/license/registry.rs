//! Known licenses, their aliases and template checksums.

use super::RegistryError;
use std::collections::HashMap;
use std::sync::LazyLock;

/// `(key, sha256 of the template body, aliases)` for every built-in license.
///
/// `epl-1.0` has no checksum: the recorded value belonged to `bsd-3-clause`.
const BUILTIN: &[(&str, Option<&str>, &[&str])] = &[
    (
        "agpl-3.0",
        Some("76a97c878c9c7a8321bb395c2b44d3fe2f8d81314d219b20138ed0e2dddd5182"),
        &["agpl"],
    ),
    (
        "apache-2.0",
        Some("b40930bbcf80744c86c46a12bc9da056641d722716c378f5659b9e555ef833e1"),
        &["apache"],
    ),
    (
        "bsd-2-clause",
        Some("bc6da8e95c49652738b398592f5a89aaf1f168b478184d40b8177fdb49593ff5"),
        &["bsd-2"],
    ),
    (
        "bsd-3-clause",
        Some("c6bce241128aaf54728d86e9034e410385fda959073c467f377c4f4fa4253f69"),
        &["bsd-3"],
    ),
    ("epl-1.0", None, &["epl"]),
    (
        "gpl-2.0",
        Some("db296f2f7f35bca3a174efb0eb392b3b17bd94b341851429a3dff411b1c2fc73"),
        &[],
    ),
    (
        "gpl-3.0",
        Some("589ed823e9a84c56feb95ac58e7cf384626b9cbf4fda2a907bc36e103de1bad2"),
        &["gpl"],
    ),
    (
        "lgpl-2.1",
        Some("9b872a8a070b8ad329c4bd380fb1bf0000f564c75023ec8e1e6803f15364b9e9"),
        &[],
    ),
    (
        "lgpl-3.0",
        Some("da7eabb7bafdf7d3ae5e9f223aa5bdc1eece45ac569dc21b3b037520b4464768"),
        &["lgpl"],
    ),
    (
        "mit",
        Some("002c2696d92b5c8cf956c11072baa58eaf9f6ade995c031ea635c6a1ee342ad1"),
        &[],
    ),
    (
        "mpl-2.0",
        Some("1f256ecad192880510e84ad60474eab7589218784b9a50bc7ceee34c2b91f1d5"),
        &["mpl"],
    ),
    (
        "unlicense",
        Some("88d9b4eb60579c191ec391ca04c16130572d7eedc4a86daa58bf28c6e14c9bcd"),
        &[],
    ),
];

static BUILTIN_REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    let specs = BUILTIN
        .iter()
        .map(|(key, sha256, aliases)| LicenseSpec::new(key, *sha256, aliases));
    match Registry::new(specs) {
        Ok(registry) => registry,
        Err(e) => panic!("built-in license table is invalid: {e}"),
    }
});

/// A known license.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseSpec {
    /// Canonical lowercase identifier, e.g. `apache-2.0`.
    pub key: String,
    /// Hex SHA-256 of the unmodified template served by the hosting service.
    pub sha256: Option<String>,
    /// Alternative identifiers that resolve to `key`.
    pub aliases: Vec<String>,
}

impl LicenseSpec {
    #[must_use]
    pub fn new(key: &str, sha256: Option<&str>, aliases: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            sha256: sha256.map(str::to_string),
            aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
        }
    }
}

/// Lookup table from license identifiers and aliases to [`LicenseSpec`]s.
#[derive(Debug, Clone)]
pub struct Registry {
    specs: HashMap<String, LicenseSpec>,
    /// Alias (and key) to canonical key.
    names: HashMap<String, String>,
}

impl Registry {
    /// Builds a registry, rejecting non-lowercase or duplicate identifiers.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] if any key or alias is not lowercase or is
    /// registered more than once.
    pub fn new(specs: impl IntoIterator<Item = LicenseSpec>) -> Result<Self, RegistryError> {
        let mut registry = Self {
            specs: HashMap::new(),
            names: HashMap::new(),
        };
        for spec in specs {
            registry.add_name(&spec.key, &spec.key)?;
            for alias in &spec.aliases {
                registry.add_name(alias, &spec.key)?;
            }
            registry.specs.insert(spec.key.clone(), spec);
        }
        Ok(registry)
    }

    /// The registry of built-in licenses.
    #[must_use]
    pub fn builtin() -> &'static Registry {
        &BUILTIN_REGISTRY
    }

    fn add_name(&mut self, name: &str, key: &str) -> Result<(), RegistryError> {
        for value in [name, key] {
            let lower = value.to_lowercase();
            if lower != value {
                return Err(RegistryError::NotLowercase {
                    value: value.to_string(),
                    lower,
                });
            }
        }
        if let Some(existing) = self.names.get(name) {
            return Err(RegistryError::Duplicate {
                name: name.to_string(),
                key: key.to_string(),
                existing: existing.clone(),
            });
        }
        self.names.insert(name.to_string(), key.to_string());
        Ok(())
    }

    /// Lowercases `id` and maps an alias to its canonical key.
    ///
    /// Unknown identifiers are returned lowercased.
    #[must_use]
    pub fn resolve(&self, id: &str) -> String {
        let lower = id.to_lowercase();
        match self.names.get(&lower) {
            Some(key) => key.clone(),
            None => lower,
        }
    }

    /// Spec for a key or alias, case-insensitively.
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<&LicenseSpec> {
        self.specs.get(&self.resolve(id))
    }

    /// Aliases of a license, empty when unknown.
    #[must_use]
    pub fn aliases(&self, id: &str) -> &[String] {
        self.specs
            .get(&id.to_lowercase())
            .map(|spec| spec.aliases.as_slice())
            .unwrap_or_default()
    }
}

/// Resolves an identifier against the built-in registry.
#[must_use]
pub fn resolve(id: &str) -> String {
    Registry::builtin().resolve(id)
}

/// Looks up a license in the built-in registry.
#[must_use]
pub fn lookup(id: &str) -> Option<&'static LicenseSpec> {
    Registry::builtin().lookup(id)
}

/// Aliases of a license in the built-in registry.
#[must_use]
pub fn aliases(id: &str) -> &'static [String] {
    Registry::builtin().aliases(id)
}
