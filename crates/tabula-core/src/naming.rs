//! Table and attribute naming helpers.

use convert_case::{Case, Casing};

/// Pluralize an entity name into its table name.
///
/// Intentionally small: regular English plurals only, which matches the
/// convention-over-configuration table naming this engine promises.
/// Irregular nouns should freeze their table name instead.
#[must_use]
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let lower = word.to_lowercase();
    if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        return format!("{word}es");
    }

    if let Some(stem) = word.strip_suffix('y') {
        let preceded_by_vowel = stem
            .chars()
            .last()
            .is_some_and(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'));
        if !preceded_by_vowel {
            return format!("{stem}ies");
        }
    }

    format!("{word}s")
}

/// Apply the underscored-naming option to a generated attribute name.
#[must_use]
pub fn underscored_if(name: &str, underscored: bool) -> String {
    if underscored {
        name.to_case(Case::Snake)
    } else {
        name.to_string()
    }
}
