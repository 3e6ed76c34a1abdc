//! Tag normalization

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([a-zA-Z][a-zA-Z0-9_-]*)").expect("Invalid regex"));

/// Normalize a single tag: trim, strip a leading `#`, lowercase.
///
/// Returns `None` when nothing is left.
#[must_use]
pub fn normalize_tag(raw: &str) -> Option<String> {
    let tag = raw.trim().trim_start_matches('#').trim().to_lowercase();
    if tag.is_empty() {
        None
    } else {
        Some(tag)
    }
}

/// Normalize a list of tags, dropping empties and duplicates.
///
/// The first occurrence of each tag keeps its position.
#[must_use]
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter_map(|tag| normalize_tag(tag.as_ref()))
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

/// Extract #tags from free text
///
/// Valid tags match the pattern: `#[a-zA-Z][a-zA-Z0-9_-]*`
/// Tags are returned in lowercase and deduplicated.
///
/// # Examples
///
/// ```
/// use ideabox_core::models::extract_tags;
///
/// let tags = extract_tags("Read this #book then #Rust-lang");
/// assert_eq!(tags, vec!["book", "rust-lang"]);
/// ```
#[must_use]
pub fn extract_tags(text: &str) -> Vec<String> {
    normalize_tags(TAG_PATTERN.captures_iter(text).map(|cap| cap[1].to_string()))
}
