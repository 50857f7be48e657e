//! Tag normalization.
//!
//! Tags are compared case-insensitively by upper-casing them at every
//! boundary: create, edit, add/remove and every query parameter. The mapping
//! is Unicode's default (locale-independent) uppercase.

/// Canonical form of a single tag.
pub fn normalize_tag(tag: &str) -> String {
    tag.to_uppercase()
}

/// Normalize an optional tag payload.
///
/// A missing payload becomes an empty list so storage never sees "no value"
/// where it could be read as "all tags".
pub fn normalize_tags(tags: Option<Vec<String>>) -> Vec<String> {
    tags.unwrap_or_default()
        .iter()
        .map(|t| normalize_tag(t))
        .collect()
}

/// Normalize variadic tag arguments (add/remove, query parameters).
pub fn normalize_tag_args<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    tags.iter().map(|t| normalize_tag(t.as_ref())).collect()
}

/// Normalize and de-duplicate, keeping the first occurrence of each tag.
pub fn normalize_distinct<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = normalize_tag(tag.as_ref());
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Distinct union of tag lists in first-seen order.
pub fn distinct_union<'a, I>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for list in lists {
        for tag in list {
            if seen.insert(tag.as_str()) {
                out.push(tag.clone());
            }
        }
    }
    out
}
