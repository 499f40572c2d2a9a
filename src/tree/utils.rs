//! Shared utility functions for tree walking

use std::cmp::Ordering;

use glob::Pattern;

use super::config::WalkerConfig;

/// Check if an entry name is excluded by the hidden flag or the ignore list.
pub fn should_ignore_name(name: &str, config: &WalkerConfig) -> bool {
    if config.filter_hidden && is_hidden(name) {
        return true;
    }

    config
        .ignore_patterns
        .iter()
        .any(|pattern| name == pattern || glob_match(pattern, name))
}

pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Match a glob pattern against a name.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    Pattern::new(pattern)
        .map(|p| p.matches(name))
        .unwrap_or(false)
}

/// Case-insensitive name ordering, falling back to byte order so equal
/// lowercase names still sort deterministically.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*.json", "sub-01_T1w.json"));
        assert!(!glob_match("*.json", "sub-01_T1w.nii.gz"));
        assert!(glob_match("sub-0?", "sub-01"));
        assert!(!glob_match("sub-0?", "sub-010"));
        assert!(glob_match("[ab].txt", "a.txt"));
        assert!(!glob_match("[ab].txt", "c.txt"));
        assert!(glob_match("exact", "exact"));
        assert!(!glob_match("exact", "notexact"));
    }

    #[test]
    fn test_hidden_only_when_enabled() {
        let mut config = WalkerConfig::default();
        assert!(!should_ignore_name(".git", &config));
        config.filter_hidden = true;
        assert!(should_ignore_name(".git", &config));
        assert!(!should_ignore_name("git", &config));
    }

    #[test]
    fn test_ignore_list_exact_and_glob() {
        let config = WalkerConfig {
            ignore_patterns: vec!["derivatives".to_string(), "*.log".to_string()],
            ..Default::default()
        };
        assert!(should_ignore_name("derivatives", &config));
        assert!(should_ignore_name("run.log", &config));
        assert!(!should_ignore_name("sub-01", &config));
    }

    #[test]
    fn test_compare_names_case_insensitive() {
        let mut names = vec!["b", "A", "a", "C"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(names, vec!["A", "a", "b", "C"]);
    }
}
