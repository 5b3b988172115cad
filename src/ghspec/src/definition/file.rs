//! Declaration file I/O.

use super::{sort_case_insensitive, Definition, DefinitionError};
use std::path::Path;
use tracing::{debug, info};

/// Parses a YAML sequence of definitions. Blank input yields no definitions.
///
/// # Errors
///
/// Returns [`DefinitionError::YamlError`] naming `origin` if the content is malformed.
pub fn parse_definitions(content: &str, origin: &str) -> Result<Vec<Definition>, DefinitionError> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_yaml::from_str(content).map_err(|source| DefinitionError::YamlError {
        path: origin.to_string(),
        source,
    })
}

/// Loads definitions from a declaration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_definitions(path: &Path) -> Result<Vec<Definition>, DefinitionError> {
    let origin = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| DefinitionError::IoError {
        path: origin.clone(),
        source,
    })?;
    let definitions = parse_definitions(&content, &origin)?;
    info!(path = %origin, count = definitions.len(), "Loaded definitions");
    Ok(definitions)
}

/// Serializes definitions sorted by name, case-insensitively.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_yaml(definitions: &[Definition]) -> Result<String, DefinitionError> {
    let mut sorted = definitions.to_vec();
    sorted.sort_by_key(|d| d.full_name.to_lowercase());
    for definition in &mut sorted {
        sort_case_insensitive(&mut definition.owners);
    }
    Ok(serde_yaml::to_string(&sorted)?)
}

/// Writes definitions to a declaration file.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn save_definitions(path: &Path, definitions: &[Definition]) -> Result<(), DefinitionError> {
    let content = to_yaml(definitions)?;
    std::fs::write(path, content).map_err(|source| DefinitionError::IoError {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), count = definitions.len(), "Saved definitions");
    Ok(())
}
