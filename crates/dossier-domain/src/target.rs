//! Target queries - the person under investigation

use std::collections::BTreeSet;

/// The subject of an investigation: a display name plus derived aliases.
///
/// Immutable once created. Aliases are the name variants sources tend to
/// use for the same person (URL slugs, collapsed handles, initial+surname)
/// and are computed exactly once, at investigation start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetQuery {
    /// Normalized display name ("Jane Doe")
    pub name: String,

    /// Derived name variants, all lowercase
    pub aliases: BTreeSet<String>,
}

impl TargetQuery {
    /// Build a target from free-form input, normalizing whitespace and
    /// deriving aliases.
    pub fn new(raw_name: &str) -> Self {
        let name = normalize_display_name(raw_name);
        let aliases = derive_aliases(&name);
        Self { name, aliases }
    }

    /// Whether `candidate` (a handle, slug, or name) is one of the target's
    /// known variants.
    pub fn matches_alias(&self, candidate: &str) -> bool {
        let lowered = candidate.trim().to_lowercase();
        lowered == self.name.to_lowercase() || self.aliases.contains(&lowered)
    }
}

/// Collapse whitespace and title-case each word.
fn normalize_display_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derive the lowercase variants sources use for a person's name.
fn derive_aliases(name: &str) -> BTreeSet<String> {
    let lowered = name.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();

    let mut aliases = BTreeSet::new();
    aliases.insert(lowered.clone());
    aliases.insert(words.join("-"));
    aliases.insert(words.concat());

    // initial + surname ("jdoe"), a common handle shape
    if words.len() >= 2 {
        if let Some(initial) = words[0].chars().next() {
            let surname = words[words.len() - 1];
            aliases.insert(format!("{}{}", initial, surname));
            aliases.insert(format!("{}-{}", initial, surname));
        }
    }

    aliases
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_whitespace_and_case() {
        let target = TargetQuery::new("  jane   DOE ");
        assert_eq!(target.name, "Jane Doe");
    }

    #[test]
    fn test_derives_slug_and_collapsed_aliases() {
        let target = TargetQuery::new("Jane Doe");
        assert!(target.aliases.contains("jane doe"));
        assert!(target.aliases.contains("jane-doe"));
        assert!(target.aliases.contains("janedoe"));
        assert!(target.aliases.contains("jdoe"));
    }

    #[test]
    fn test_matches_alias_is_case_insensitive() {
        let target = TargetQuery::new("Jane Doe");
        assert!(target.matches_alias("JaneDoe"));
        assert!(target.matches_alias("jane-doe"));
        assert!(!target.matches_alias("john-doe"));
    }

    #[test]
    fn test_single_word_name() {
        let target = TargetQuery::new("Prince");
        assert_eq!(target.name, "Prince");
        assert!(target.aliases.contains("prince"));
    }
}
