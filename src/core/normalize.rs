use std::collections::BTreeSet;

/// Trimmed, lowercased form used for every comparison
#[inline]
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Case-insensitive set of the non-blank items in a list
pub fn normalized_set(items: &[String]) -> BTreeSet<String> {
    items
        .iter()
        .map(|item| normalize(item))
        .filter(|item| !item.is_empty())
        .collect()
}

/// True when both values are non-blank and equal ignoring case
#[inline]
pub fn eq_ignore_case_non_empty(a: &str, b: &str) -> bool {
    let a = a.trim();
    let b = b.trim();
    !a.is_empty() && !b.is_empty() && a.to_lowercase() == b.to_lowercase()
}

#[inline]
pub fn is_filled(value: &str) -> bool {
    !value.trim().is_empty()
}
