//! Observed repository state.

use crate::client::{RepoLicense, RepoRecord};
use crate::definition::Definition;

/// File name used when a repository has no detected license file.
pub const DEFAULT_LICENSE_PATH: &str = "LICENSE";

/// Repository state as reported by the hosting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Info {
    pub repo: RepoRecord,
    /// Detected license file, if any.
    pub repo_license: Option<RepoLicense>,
    /// Repository has no commits. Other fields are left empty.
    pub is_empty: bool,
    /// Admin collaborators, sorted case-insensitively.
    pub owners: Vec<String>,
    /// A `patents` or `patents.txt` file exists at the root.
    pub has_patents: bool,
}

impl Info {
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.repo.full_name
    }

    /// Detected license key.
    #[must_use]
    pub fn license_id(&self) -> Option<&str> {
        self.repo.license.as_ref().map(|l| l.key.as_str())
    }

    /// Path of the license file, `LICENSE` when none was detected.
    #[must_use]
    pub fn license_path(&self) -> &str {
        self.repo_license
            .as_ref()
            .map_or(DEFAULT_LICENSE_PATH, |l| l.path.as_str())
    }

    /// Definition that exactly describes this state.
    #[must_use]
    pub fn to_definition(&self) -> Definition {
        Definition {
            full_name: self.repo.full_name.clone(),
            description: self.repo.description_or_empty().to_string(),
            owners: self.owners.clone(),
            license: self.license_id().unwrap_or_default().to_string(),
            has_patents: self.has_patents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{license_ref, repo_license, repo_record};

    fn info() -> Info {
        let mut repo = repo_record("acme/widget", 1);
        repo.description = Some("A widget".to_string());
        repo.license = Some(license_ref("mit", "MIT License"));
        Info {
            repo,
            repo_license: None,
            is_empty: false,
            owners: vec!["alice".to_string()],
            has_patents: true,
        }
    }

    #[test]
    fn to_definition_round_trips_through_compare() {
        let info = info();
        let definition = info.to_definition();
        assert_eq!(definition.license, "mit");
        assert!(definition.has_patents);
        assert!(definition.compare(&info).is_empty());
    }

    #[test]
    fn license_path_falls_back() {
        let mut info = info();
        assert_eq!(info.license_path(), "LICENSE");

        let mut detected = repo_license("mit", "MIT License", "text");
        detected.path = "LICENSE.md".to_string();
        info.repo_license = Some(detected);
        assert_eq!(info.license_path(), "LICENSE.md");
    }
}
