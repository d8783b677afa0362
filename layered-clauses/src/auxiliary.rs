//! Surface normalization for auxiliary groups and negated predicates.
//!
//! Parsers split contractions into separate tokens (`do` + `n't`,
//! `ca` + `n't`). The group text glues them back together and then expands
//! modal contractions through the configured table.

use std::collections::BTreeMap;

fn is_clitic(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower == "n't" || lower == "n’t" || lower.starts_with('\'') || lower.starts_with('’')
}

/// Join token texts, attaching clitics to the preceding word.
pub fn join_clitics<'a>(texts: impl IntoIterator<Item = &'a str>) -> String {
    let mut joined = String::new();
    for text in texts {
        if !joined.is_empty() && !is_clitic(text) {
            joined.push(' ');
        }
        joined.push_str(text);
    }
    joined
}

/// Expand a single word through the contraction table, keeping an initial
/// capital.
pub fn expand_contraction(word: &str, contractions: &BTreeMap<String, String>) -> Option<String> {
    let expansion = contractions.get(&word.to_lowercase())?;
    let starts_upper = word.chars().next().map_or(false, char::is_uppercase);
    if !starts_upper {
        return Some(expansion.clone());
    }
    let mut chars = expansion.chars();
    Some(match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    })
}

/// Text of an auxiliary group or negated predicate.
pub fn normalize_surface<'a>(
    texts: impl IntoIterator<Item = &'a str>,
    contractions: &BTreeMap<String, String>,
) -> String {
    join_clitics(texts)
        .split(' ')
        .map(|word| expand_contraction(word, contractions).unwrap_or_else(|| word.to_string()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleConfig;

    fn table() -> BTreeMap<String, String> {
        RuleConfig::default().contractions
    }

    #[test]
    fn split_negation_is_merged() {
        assert_eq!(normalize_surface(["do", "n't"], &table()), "don't");
        assert_eq!(normalize_surface(["has", "n't", "been"], &table()), "hasn't been");
        assert_eq!(normalize_surface(["is", "not"], &table()), "is not");
    }

    #[test]
    fn modal_contractions_expand() {
        assert_eq!(normalize_surface(["ca", "n't"], &table()), "can not");
        assert_eq!(normalize_surface(["wo", "n't"], &table()), "will not");
        assert_eq!(normalize_surface(["sha", "n't"], &table()), "shall not");
        assert_eq!(normalize_surface(["cannot"], &table()), "can not");
        assert_eq!(normalize_surface(["would", "'ve"], &table()), "would've");
    }

    #[test]
    fn capitalization_is_preserved() {
        assert_eq!(normalize_surface(["Wo", "n't"], &table()), "Will not");
        assert_eq!(normalize_surface(["Cannot"], &table()), "Can not");
    }
}
