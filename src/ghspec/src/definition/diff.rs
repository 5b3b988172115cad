//! Field-level differences between a definition and observed state.

use std::collections::HashSet;
use std::fmt;

/// Joins diff lines under a `name:` header, indenting each line with a tab.
#[must_use]
pub fn join_diff<I, S>(name: &str, lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = format!("{name}:");
    for line in lines {
        out.push_str("\n\t");
        out.push_str(line.as_ref());
    }
    out
}

/// Sorts strings by their lowercase form.
pub fn sort_case_insensitive(values: &mut [String]) {
    values.sort_by_key(|v| v.to_lowercase());
}

/// Formats a list the way the reports show it: `[a b c]`.
#[must_use]
pub fn format_list(values: &[String]) -> String {
    format!("[{}]", values.join(" "))
}

/// Differing string attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringDiff {
    pub label: String,
    pub want: String,
    pub got: String,
}

impl StringDiff {
    /// Diff of `want` and `got`, or `None` when they are equal.
    #[must_use]
    pub fn between(label: &str, want: &str, got: &str) -> Option<Self> {
        (want != got).then(|| Self {
            label: label.to_string(),
            want: want.to_string(),
            got: got.to_string(),
        })
    }
}

impl fmt::Display for StringDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = join_diff(
            &self.label,
            [format!("want: {}", self.want), format!("got:  {}", self.got)],
        );
        f.write_str(&text)
    }
}

/// Declared owners that are not admins of the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnersDiff {
    pub required: Vec<String>,
    pub present: Vec<String>,
    /// `required` minus `present`, sorted case-insensitively.
    pub missing: Vec<String>,
}

impl OwnersDiff {
    /// Computes the diff, or `None` when either side is empty or nothing is missing.
    ///
    /// Membership is an exact string match, so `Alice` does not satisfy `alice`.
    #[must_use]
    pub fn between(required: &[String], present: &[String]) -> Option<Self> {
        if required.is_empty() || present.is_empty() {
            return None;
        }
        let present_set: HashSet<&str> = present.iter().map(String::as_str).collect();
        let mut missing: Vec<String> = required
            .iter()
            .filter(|owner| !present_set.contains(owner.as_str()))
            .cloned()
            .collect();
        if missing.is_empty() {
            return None;
        }
        sort_case_insensitive(&mut missing);
        Some(Self {
            required: required.to_vec(),
            present: present.to_vec(),
            missing,
        })
    }
}

impl fmt::Display for OwnersDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = join_diff(
            "owners",
            [
                format!("required: {}", format_list(&self.required)),
                format!("got:      {}", format_list(&self.present)),
                format!("missing:  {}", format_list(&self.missing)),
            ],
        );
        f.write_str(&text)
    }
}

/// Differing boolean attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolDiff {
    pub label: String,
    pub want: bool,
    pub got: bool,
}

impl BoolDiff {
    #[must_use]
    pub fn between(label: &str, want: bool, got: bool) -> Option<Self> {
        (want != got).then(|| Self {
            label: label.to_string(),
            want,
            got,
        })
    }
}

impl fmt::Display for BoolDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = join_diff(
            &self.label,
            [format!("want: {}", self.want), format!("got:  {}", self.got)],
        );
        f.write_str(&text)
    }
}

/// All attribute differences of one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecDiff {
    pub full_name: Option<StringDiff>,
    pub description: Option<StringDiff>,
    pub license: Option<StringDiff>,
    pub owners: Option<OwnersDiff>,
    pub patents: Option<BoolDiff>,
}

impl SpecDiff {
    /// True when no attribute differs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.description.is_none()
            && self.license.is_none()
            && self.owners.is_none()
            && self.patents.is_none()
    }

    /// Rendered sub-diffs in attribute order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(d) = &self.full_name {
            lines.push(d.to_string());
        }
        if let Some(d) = &self.description {
            lines.push(d.to_string());
        }
        if let Some(d) = &self.license {
            lines.push(d.to_string());
        }
        if let Some(d) = &self.owners {
            lines.push(d.to_string());
        }
        if let Some(d) = &self.patents {
            lines.push(d.to_string());
        }
        lines
    }
}
