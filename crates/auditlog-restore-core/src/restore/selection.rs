//! Subset include/exclude matching.

use crate::config::SubsetSelection;

impl SubsetSelection {
    /// Whether a subset id passes the include and exclude patterns.
    pub fn matches(&self, subset_id: &str) -> bool {
        let included = self.include.is_empty()
            || self
                .include
                .iter()
                .any(|pattern| pattern_match(pattern, subset_id));

        let excluded = self
            .exclude
            .iter()
            .any(|pattern| pattern_match(pattern, subset_id));

        included && !excluded
    }
}

/// Match a subset id against a glob (`2024-*`, `2024-0?`) or, when prefixed
/// with `~`, a regex (`~^2024-(01|02)$`).
pub fn pattern_match(pattern: &str, text: &str) -> bool {
    if let Some(regex_pattern) = pattern.strip_prefix('~') {
        match regex::Regex::new(regex_pattern) {
            Ok(re) => re.is_match(text),
            Err(_) => false,
        }
    } else {
        glob_match(pattern, text)
    }
}

/// Glob matching supporting `*` and `?`
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern_chars: Vec<char> = pattern.chars().collect();
    let text_chars: Vec<char> = text.chars().collect();

    glob_match_impl(&pattern_chars, &text_chars)
}

fn glob_match_impl(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('*', rest)) => (0..=text.len()).any(|i| glob_match_impl(rest, &text[i..])),
        Some(('?', rest)) => !text.is_empty() && glob_match_impl(rest, &text[1..]),
        Some((c, rest)) => text.first() == Some(c) && glob_match_impl(rest, &text[1..]),
    }
}
