//! The two-level configuration map.
//!
//! A [`ConfigMap`] maps section names to [`SectionMap`]s, which map keys to
//! values. Everything is a string; numeric and boolean interpretation happens
//! at the edges.

use std::collections::BTreeMap;

/// Keys to values within one section.
pub type SectionMap = BTreeMap<String, String>;

/// Section names to sections.
pub type ConfigMap = BTreeMap<String, SectionMap>;

/// Returned by value lookups that miss.
pub const NOT_FOUND: &str = "[NOT FOUND]";

/// Leading character of hidden (system) section names.
pub const RESERVED_PREFIX: char = '_';

/// Section holding the login credentials.
pub const AUTH_SECTION: &str = "_auth";

/// Shared empty section handed out for read-only lookups that miss.
pub static EMPTY_SECTION: SectionMap = BTreeMap::new();

/// Whether a section is hidden from user-facing listings.
pub fn is_hidden(section: &str) -> bool {
    section.starts_with(RESERVED_PREFIX)
}

/// A section name with its reserved prefix stripped, if it has one.
pub fn display_name(section: &str) -> &str {
    section.strip_prefix(RESERVED_PREFIX).unwrap_or(section)
}

/// Look up one value.
pub fn lookup<'a>(map: &'a ConfigMap, section: &str, key: &str) -> Option<&'a str> {
    map.get(section)
        .and_then(|entries| entries.get(key))
        .map(String::as_str)
}

/// Approximate footprint: the byte length of every section name, key and
/// value held.
pub fn memory_usage(map: &ConfigMap) -> usize {
    map.iter()
        .map(|(section, entries)| {
            section.len()
                + entries
                    .iter()
                    .map(|(key, value)| key.len() + value.len())
                    .sum::<usize>()
        })
        .sum()
}

/// Human-readable dump, one `[section]` header followed by indented
/// `key: value` lines.
pub fn render(map: &ConfigMap) -> String {
    let mut out = String::new();
    for (section, entries) in map {
        out.push('[');
        out.push_str(section);
        out.push_str("]\n");
        for (key, value) in entries {
            out.push_str("  ");
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use collection_literals::btree;

    fn sample() -> ConfigMap {
        btree! {
            "_auth".to_string() => btree! {
                "user".to_string() => "admin".to_string(),
            },
            "wifi".to_string() => btree! {
                "ssid".to_string() => "net".to_string(),
                "channel".to_string() => "6".to_string(),
            },
        }
    }

    #[test]
    fn hidden_sections() {
        assert!(is_hidden("_auth"));
        assert!(!is_hidden("wifi"));
        assert!(!is_hidden(""));
    }

    #[test]
    fn display_name_strips_one_prefix() {
        assert_eq!(display_name("_auth"), "auth");
        assert_eq!(display_name("__sys"), "_sys");
        assert_eq!(display_name("wifi"), "wifi");
        assert_eq!(display_name("_"), "");
    }

    #[test]
    fn lookup_misses_are_none() {
        let map = sample();
        assert_eq!(lookup(&map, "wifi", "ssid"), Some("net"));
        assert_eq!(lookup(&map, "wifi", "missing"), None);
        assert_eq!(lookup(&map, "missing", "ssid"), None);
    }

    #[test]
    fn memory_usage_counts_every_string() {
        // "_auth" + "user" + "admin" + "wifi" + "ssid" + "net" + "channel" + "6"
        assert_eq!(memory_usage(&sample()), 5 + 4 + 5 + 4 + 4 + 3 + 7 + 1);
        assert_eq!(memory_usage(&ConfigMap::new()), 0);
    }

    #[test]
    fn render_lists_sections_and_keys() {
        let text = render(&sample());
        assert!(text.contains("[_auth]\n  user: admin\n"));
        assert!(text.contains("[wifi]\n  channel: 6\n  ssid: net\n"));
    }

    #[test]
    fn empty_section_is_empty() {
        assert!(EMPTY_SECTION.is_empty());
    }
}
