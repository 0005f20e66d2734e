//! Scope identifier matching.
//!
//! Identifiers look like `a2p:professional.skills`: a namespace, `:`, then a
//! dot-delimited path. Patterns are identifiers that may end in a wildcard.

/// Characters that separate hierarchy levels.
const DELIMITERS: [char; 2] = ['.', ':'];

/// Whether `identifier` is covered by `pattern`.
///
/// - `*` covers everything.
/// - `base.*` (or `base:*`) covers `base` itself and anything below it.
/// - A trailing `*` not preceded by a delimiter is a plain prefix match.
/// - Anything else requires exact equality.
pub fn matches(identifier: &str, pattern: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    let Some(stem) = pattern.strip_suffix('*') else {
        return identifier == pattern;
    };

    match stem.chars().last() {
        Some(delim) if DELIMITERS.contains(&delim) => {
            let base = &stem[..stem.len() - delim.len_utf8()];
            identifier == base
                || (identifier.len() > stem.len() && identifier.starts_with(stem))
        }
        _ => identifier.starts_with(stem),
    }
}

/// Whether `identifier` matches at least one of `patterns`.
pub fn matches_any<S: AsRef<str>>(identifier: &str, patterns: &[S]) -> bool {
    patterns.iter().any(|p| matches(identifier, p.as_ref()))
}

/// Whether `identifier` equals `granted` or sits below it in the hierarchy.
///
/// Used to decide whether a record fragment (e.g. a memory categorized
/// `a2p:professional.title`) falls under a granted scope (`a2p:professional`).
pub fn is_within(identifier: &str, granted: &str) -> bool {
    if granted == "*" || identifier == granted {
        return true;
    }
    if granted.ends_with('*') {
        return matches(identifier, granted);
    }
    identifier.len() > granted.len()
        && identifier.starts_with(granted)
        && identifier[granted.len()..].starts_with(DELIMITERS)
}

/// Glob match where each `*` stands for any run of characters.
///
/// Agent patterns use this form (`did:a2p:agent:local:work-*`), so the wildcard
/// may sit anywhere, not only at a hierarchy boundary.
pub fn glob_matches(value: &str, pattern: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if !pattern.contains('*') {
        return value == pattern;
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    let (first, rest) = match parts.split_first() {
        Some(split) => split,
        None => return value.is_empty(),
    };
    let (last, middle) = match rest.split_last() {
        Some(split) => split,
        None => return value == *first,
    };

    if !value.starts_with(first) {
        return false;
    }
    let mut cursor = first.len();

    for part in middle {
        if part.is_empty() {
            continue;
        }
        match value[cursor..].find(part) {
            Some(pos) => cursor += pos + part.len(),
            None => return false,
        }
    }

    // The tail must fit after everything already consumed.
    value.len() >= cursor + last.len() && value.ends_with(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_wildcard_matches_everything() {
        assert!(matches("a2p:health.allergies", "*"));
        assert!(matches("", "*"));
    }

    #[test]
    fn exact_pattern_requires_equality() {
        assert!(matches("a2p:identity.name", "a2p:identity.name"));
        assert!(!matches("a2p:identity.name.first", "a2p:identity.name"));
        assert!(!matches("a2p:identity", "a2p:identity.name"));
    }

    #[test]
    fn dotted_wildcard_covers_base_and_descendants() {
        assert!(matches("a2p:professional", "a2p:professional.*"));
        assert!(matches("a2p:professional.title", "a2p:professional.*"));
        assert!(matches("a2p:professional.skills.rust", "a2p:professional.*"));
        assert!(!matches("a2p:professionalism", "a2p:professional.*"));
        assert!(!matches("a2p:health", "a2p:professional.*"));
    }

    #[test]
    fn namespace_wildcard_covers_namespace() {
        assert!(matches("a2p:health.allergy", "a2p:*"));
        assert!(matches("a2p", "a2p:*"));
        assert!(!matches("other:health", "a2p:*"));
    }

    #[test]
    fn undelimited_wildcard_is_prefix() {
        assert!(matches("a2p:prefs", "a2p:pref*"));
        assert!(matches("a2p:preferences.ui", "a2p:pref*"));
        assert!(!matches("a2p:health", "a2p:pref*"));
    }

    #[test]
    fn within_respects_hierarchy_boundary() {
        assert!(is_within("a2p:professional.title", "a2p:professional"));
        assert!(is_within("a2p:professional", "a2p:professional"));
        assert!(!is_within("a2p:professionalism", "a2p:professional"));
        assert!(is_within("a2p:preferences.ui", "a2p:preferences.*"));
        assert!(is_within("anything", "*"));
    }

    #[test]
    fn glob_handles_wildcards_anywhere() {
        assert!(glob_matches(
            "did:a2p:agent:local:work-slack",
            "did:a2p:agent:local:work-*"
        ));
        assert!(glob_matches("agent:local:work-slack", "agent:*:work-*"));
        assert!(glob_matches("agent:local:work-slack", "*slack"));
        assert!(glob_matches("abc", "a*b*c"));
        assert!(!glob_matches("agent:local:health-bot", "agent:local:work-*"));
        assert!(!glob_matches("aXb", "a*bb"));
        assert!(!glob_matches("ab", "ab*b"));
        assert!(glob_matches("exact", "exact"));
        assert!(!glob_matches("exact2", "exact"));
    }
}
