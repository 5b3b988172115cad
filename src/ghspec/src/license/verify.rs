//! Checking a repository's license file against the canonical template.

use super::render::{create, has_author_placeholders, AuthorInfo};
use super::{content_checksum, LicenseCache, LicenseError};
use crate::client::{RepoLicense, RepoRecord};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use similar::TextDiff;

/// Error for a repository without a detectable license.
#[must_use]
pub fn missing_license(repo: &RepoRecord) -> LicenseError {
    let message = if repo.fork {
        "license cannot be detected for forked repositories (this is a known GitHub API issue)"
    } else {
        "no license detected"
    };
    LicenseError::Missing {
        message: message.to_string(),
    }
}

/// Decodes the file content of a detected license.
///
/// # Errors
///
/// Returns [`LicenseError::Decode`] if the content is not valid base64 or UTF-8.
pub fn decode_content(license: &RepoLicense) -> Result<String, LicenseError> {
    let decode_error = |message: String| LicenseError::Decode {
        path: license.path.clone(),
        message,
    };

    if license.encoding.as_deref().is_some_and(|e| e != "base64") {
        return Ok(license.content.clone());
    }

    let compact: String = license
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| decode_error(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| decode_error(e.to_string()))
}

/// Verifies that the detected license of `repo` is the expected rendering of its template.
///
/// The expected text is the template of the detected license rendered with
/// `author_name` and the repository's created and updated years.
///
/// # Arguments
///
/// * `observed` - License detected by the hosting service, `None` if there was none
/// * `repo` - Repository the license belongs to
/// * `author_name` - Copyright holder, may be empty
/// * `cache` - Template cache
///
/// # Returns
///
/// The observed license when its content matches.
///
/// # Errors
///
/// Returns [`LicenseError::Missing`] when no license was detected,
/// [`LicenseError::Incorrect`] with a unified diff when the content differs, and
/// other variants when decoding or rendering fails.
pub async fn verify(
    observed: Option<&RepoLicense>,
    repo: &RepoRecord,
    author_name: &str,
    cache: &mut LicenseCache,
) -> Result<RepoLicense, LicenseError> {
    let Some((observed, detected)) = observed.and_then(|o| o.license.as_ref().map(|l| (o, l)))
    else {
        return Err(missing_license(repo));
    };

    let actual = decode_content(observed)?;
    let author = AuthorInfo::new(author_name, repo.created_year(), repo.updated_year());
    let expected = create(&detected.key, cache, author.as_ref()).await?;

    if actual == expected {
        return Ok(observed.clone());
    }

    let text_diff = TextDiff::from_lines(expected.as_str(), actual.as_str());
    let diff = text_diff
        .unified_diff()
        .context_radius(0)
        .header("Expected", "Actual")
        .to_string();

    let unmodified_template = cache
        .registry()
        .lookup(&detected.key)
        .and_then(|spec| spec.sha256.as_deref())
        .is_some_and(|sha| has_author_placeholders(&actual) && content_checksum(&actual) == sha);

    let message = if unmodified_template {
        format!(
            "uses unmodified version of {} license (copyright year and author should be filled out)",
            detected.name
        )
    } else {
        "actual content of license does not match expected content".to_string()
    };

    Err(LicenseError::Incorrect { message, diff })
}
