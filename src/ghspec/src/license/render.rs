//! Filling author information into license templates.

use super::{LicenseCache, LicenseError};

/// Placeholder replaced by the author's full name.
pub const FULLNAME_PLACEHOLDER: &str = "[fullname]";

/// Placeholder replaced by the copyright year.
pub const YEAR_PLACEHOLDER: &str = "[year]";

/// Copyright holder and year rendered into a license template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorInfo {
    full_name: String,
    year: String,
}

impl AuthorInfo {
    /// Creates author information, or `None` when `full_name` is empty.
    ///
    /// The year is `created` alone when both years match and
    /// `created-updated` otherwise.
    #[must_use]
    pub fn new(full_name: &str, created: i32, updated: i32) -> Option<Self> {
        if full_name.is_empty() {
            return None;
        }
        let year = if created == updated {
            created.to_string()
        } else {
            format!("{created}-{updated}")
        };
        Some(Self {
            full_name: full_name.to_string(),
            year,
        })
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub fn year(&self) -> &str {
        &self.year
    }
}

/// Whether `content` contains an author or year placeholder.
#[must_use]
pub fn has_author_placeholders(content: &str) -> bool {
    content.contains(FULLNAME_PLACEHOLDER) || content.contains(YEAR_PLACEHOLDER)
}

/// Replaces the placeholders in a single left-to-right pass.
///
/// Substituted text is never scanned again, so an author name containing
/// `[year]` is written verbatim.
#[must_use]
pub fn render(content: &str, author: &AuthorInfo) -> String {
    let mut rendered = String::with_capacity(content.len());
    let mut rest = content;
    loop {
        let next = [
            (rest.find(FULLNAME_PLACEHOLDER), FULLNAME_PLACEHOLDER, author.full_name()),
            (rest.find(YEAR_PLACEHOLDER), YEAR_PLACEHOLDER, author.year()),
        ]
        .into_iter()
        .filter_map(|(pos, placeholder, value)| pos.map(|p| (p, placeholder, value)))
        .min_by_key(|(pos, _, _)| *pos);

        let Some((pos, placeholder, value)) = next else {
            rendered.push_str(rest);
            return rendered;
        };
        rendered.push_str(&rest[..pos]);
        rendered.push_str(value);
        rest = &rest[pos + placeholder.len()..];
    }
}

/// Produces the text of license `id` (key or alias) for the given author.
///
/// # Errors
///
/// Returns an error if the template cannot be fetched or if it contains
/// placeholders and no author was supplied.
pub async fn create(
    id: &str,
    cache: &mut LicenseCache,
    author: Option<&AuthorInfo>,
) -> Result<String, LicenseError> {
    let key = cache.registry().resolve(id);
    let body = cache.get(&key).await?;
    if !has_author_placeholders(&body) {
        return Ok(body);
    }
    match author {
        Some(author) => Ok(render(&body, author)),
        None => Err(LicenseError::MissingAuthor { key }),
    }
}
