//! Declared repository state.
//!
//! A declaration file is a YAML sequence of [`Definition`]s. Definitions are
//! indexed by full name in a [`DefinitionSet`] and compared against observed
//! [`Info`](crate::repository::Info) with [`Definition::compare`].

mod diff;
mod error;
mod file;

pub use diff::{
    format_list, join_diff, sort_case_insensitive, BoolDiff, OwnersDiff, SpecDiff, StringDiff,
};
pub use error::DefinitionError;
pub use file::{load_definitions, parse_definitions, save_definitions, to_yaml};

use crate::license;
use crate::repository::Info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// License value meaning "custom license, do not verify".
pub const CUSTOM_LICENSE: &str = "custom";

/// Prefix for custom licenses derived from a known license.
pub const CUSTOM_LICENSE_PREFIX: &str = "custom-";

/// Desired state of one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// Full name, e.g. `octocat/Hello-World`.
    #[serde(rename = "name")]
    pub full_name: String,
    #[serde(default)]
    pub description: String,
    /// Handles of users that must be admins.
    #[serde(default)]
    pub owners: Vec<String>,
    /// License id, `custom`, or `custom-<id>` for a license derived from `<id>`.
    #[serde(default)]
    pub license: String,
    /// Whether the repository must contain a `PATENTS` file.
    #[serde(rename = "patents", default)]
    pub has_patents: bool,
}

/// Interpretation of [`Definition::license`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredLicense<'a> {
    /// No license declared.
    None,
    /// `custom`: never verified.
    Custom,
    /// `custom-<id>`: verified against `<id>`.
    Derived(&'a str),
    /// A license id or alias.
    Standard(&'a str),
}

impl<'a> DeclaredLicense<'a> {
    /// License id whose template the repository must match.
    #[must_use]
    pub fn expected_id(&self) -> Option<&'a str> {
        match self {
            Self::Derived(id) | Self::Standard(id) => Some(*id),
            Self::None | Self::Custom => None,
        }
    }
}

impl Definition {
    /// Classifies the declared license.
    #[must_use]
    pub fn declared_license(&self) -> DeclaredLicense<'_> {
        match self.license.as_str() {
            "" => DeclaredLicense::None,
            CUSTOM_LICENSE => DeclaredLicense::Custom,
            other => match other.strip_prefix(CUSTOM_LICENSE_PREFIX) {
                Some(id) => DeclaredLicense::Derived(id),
                None => DeclaredLicense::Standard(other),
            },
        }
    }

    /// Compares declared attributes with observed state.
    ///
    /// Names are compared case-insensitively and license ids after alias
    /// resolution. License content is not inspected here.
    #[must_use]
    pub fn compare(&self, info: &Info) -> SpecDiff {
        let full_name = (!self.full_name.eq_ignore_ascii_case(info.full_name()))
            .then(|| StringDiff::between("name", &self.full_name, info.full_name()))
            .flatten();

        let license = match self.declared_license() {
            DeclaredLicense::Custom => None,
            declared => {
                let want = declared.expected_id().map(license::resolve).unwrap_or_default();
                let got = info.license_id().map(license::resolve).unwrap_or_default();
                StringDiff::between("license type", &want, &got)
            }
        };

        SpecDiff {
            full_name,
            description: StringDiff::between(
                "description",
                &self.description,
                info.repo.description_or_empty(),
            ),
            license,
            owners: OwnersDiff::between(&self.owners, &info.owners),
            patents: BoolDiff::between("has patents", self.has_patents, info.has_patents),
        }
    }
}

/// Definitions indexed by lowercase full name.
#[derive(Debug, Clone, Default)]
pub struct DefinitionSet {
    by_name: BTreeMap<String, Definition>,
}

impl DefinitionSet {
    /// Indexes definitions, rejecting names that collide case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::Duplicate`] for the first repeated name.
    pub fn new(definitions: Vec<Definition>) -> Result<Self, DefinitionError> {
        let mut by_name = BTreeMap::new();
        for definition in definitions {
            let key = definition.full_name.to_lowercase();
            if by_name.contains_key(&key) {
                return Err(DefinitionError::Duplicate {
                    name: definition.full_name,
                });
            }
            by_name.insert(key, definition);
        }
        Ok(Self { by_name })
    }

    /// Finds the definition for a repository, case-insensitively.
    #[must_use]
    pub fn get(&self, full_name: &str) -> Option<&Definition> {
        self.by_name.get(&full_name.to_lowercase())
    }

    /// Declared full names, as written in the declaration.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.values().map(|d| d.full_name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{license_ref, repo_record};

    fn definition(license: &str) -> Definition {
        Definition {
            full_name: "acme/widget".to_string(),
            description: "A widget".to_string(),
            owners: vec!["alice".to_string()],
            license: license.to_string(),
            has_patents: false,
        }
    }

    fn info_for(definition: &Definition) -> Info {
        let mut repo = repo_record(&definition.full_name, 1);
        repo.description = Some(definition.description.clone());
        if let Some(id) = definition.declared_license().expected_id() {
            repo.license = Some(license_ref(id, id));
        }
        Info {
            repo,
            repo_license: None,
            is_empty: false,
            owners: definition.owners.clone(),
            has_patents: definition.has_patents,
        }
    }

    #[test]
    fn declared_license_variants() {
        assert_eq!(definition("").declared_license(), DeclaredLicense::None);
        assert_eq!(definition("custom").declared_license(), DeclaredLicense::Custom);
        assert_eq!(
            definition("custom-mit").declared_license(),
            DeclaredLicense::Derived("mit")
        );
        assert_eq!(
            definition("apache").declared_license(),
            DeclaredLicense::Standard("apache")
        );
    }

    #[test]
    fn compare_definition_derived_info_is_empty() {
        for license in ["", "mit", "custom-apache-2.0"] {
            let def = definition(license);
            assert!(def.compare(&info_for(&def)).is_empty(), "license {license:?}");
        }
    }

    #[test]
    fn compare_resolves_aliases() {
        let def = definition("apache");
        let mut info = info_for(&def);
        info.repo.license = Some(license_ref("apache-2.0", "Apache License 2.0"));
        assert!(def.compare(&info).license.is_none());
    }

    #[test]
    fn compare_custom_license_never_differs() {
        let def = definition("custom");
        let mut info = info_for(&def);
        info.repo.license = Some(license_ref("gpl-3.0", "GNU GPL v3"));
        assert!(def.compare(&info).license.is_none());
    }

    #[test]
    fn compare_reports_each_attribute() {
        let def = Definition {
            has_patents: true,
            ..definition("mit")
        };
        let mut info = info_for(&definition("gpl"));
        info.repo.description = Some("Other".to_string());
        info.owners = vec!["bob".to_string()];

        let diff = def.compare(&info);
        assert!(diff.full_name.is_none());
        assert_eq!(diff.description.unwrap().got, "Other");
        let license = diff.license.unwrap();
        assert_eq!((license.want.as_str(), license.got.as_str()), ("mit", "gpl-3.0"));
        assert_eq!(diff.owners.unwrap().missing, vec!["alice".to_string()]);
        assert!(diff.patents.is_some());
    }

    #[test]
    fn compare_name_is_case_insensitive() {
        let def = definition("");
        let mut info = info_for(&def);
        info.repo.full_name = "ACME/Widget".to_string();
        assert!(def.compare(&info).full_name.is_none());
    }

    #[test]
    fn definition_set_rejects_case_insensitive_duplicates() {
        let mut other = definition("");
        other.full_name = "ACME/widget".to_string();
        let err = DefinitionSet::new(vec![definition(""), other]).unwrap_err();
        assert!(matches!(err, DefinitionError::Duplicate { name } if name == "ACME/widget"));
    }

    #[test]
    fn definition_set_lookup_is_case_insensitive() {
        let set = DefinitionSet::new(vec![definition("")]).unwrap();
        assert!(set.get("Acme/Widget").is_some());
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["acme/widget"]);
    }
}
