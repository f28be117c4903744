//! Proxy bypass (exception) list editing
//!
//! The store keeps the exception list as one string of patterns joined by `;`.
//! Edits parse it into an ordered list, change it, and join it back. Pattern
//! comparison is exact and case-sensitive; no wildcard interpretation happens
//! here.

use std::fmt;

pub const SEPARATOR: char = ';';

/// Ordered list of bypass patterns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BypassList {
    patterns: Vec<String>,
}

impl BypassList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a stored bypass string, dropping empty tokens and surrounding whitespace
    pub fn parse(s: &str) -> Self {
        let patterns = s
            .split(SEPARATOR)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();

        Self { patterns }
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.patterns.iter().any(|p| p == pattern)
    }

    pub fn push(&mut self, pattern: impl Into<String>) {
        self.patterns.push(pattern.into());
    }

    /// Remove every occurrence of `pattern`, returning how many were removed
    pub fn remove_all(&mut self, pattern: &str) -> usize {
        let before = self.patterns.len();
        self.patterns.retain(|p| p != pattern);
        before - self.patterns.len()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }
}

impl fmt::Display for BypassList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pattern) in self.patterns.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(pattern)?;
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for BypassList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            patterns: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Add,
    Delete,
}

/// Result of editing a bypass list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BypassEdit {
    /// New bypass string to write back
    Updated { bypass: String, removed: usize },
    /// Add of a pattern the list already holds; nothing to write
    AlreadyPresent,
    /// Delete against an absent or empty list; nothing to write
    NothingToDelete,
}

/// Compute the new bypass string for an add or delete of `pattern`
///
/// `current` is `None` when the store holds no bypass value at all. An empty
/// string is handled the same way. A delete of a pattern that is not in a
/// non-empty list still yields `Updated` with the list unchanged.
pub fn edit(current: Option<&str>, pattern: &str, mode: EditMode) -> BypassEdit {
    let current = match current {
        Some(s) if !s.is_empty() => s,
        _ => {
            return match mode {
                EditMode::Add => BypassEdit::Updated {
                    bypass: pattern.to_string(),
                    removed: 0,
                },
                EditMode::Delete => BypassEdit::NothingToDelete,
            };
        }
    };

    let mut list = BypassList::parse(current);

    match mode {
        EditMode::Add => {
            if list.contains(pattern) {
                return BypassEdit::AlreadyPresent;
            }
            list.push(pattern);
            BypassEdit::Updated {
                bypass: list.to_string(),
                removed: 0,
            }
        }
        EditMode::Delete => {
            let removed = list.remove_all(pattern);
            BypassEdit::Updated {
                bypass: list.to_string(),
                removed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn updated(s: &str) -> BypassEdit {
        BypassEdit::Updated {
            bypass: s.to_string(),
            removed: 0,
        }
    }

    #[test]
    fn test_add_appends_at_end() {
        assert_eq!(
            edit(Some("a.com;b.com"), "c.com", EditMode::Add),
            updated("a.com;b.com;c.com")
        );
    }

    #[test]
    fn test_add_existing_is_noop() {
        assert_eq!(
            edit(Some("a.com;b.com"), "a.com", EditMode::Add),
            BypassEdit::AlreadyPresent
        );
    }

    #[test]
    fn test_add_matches_whole_tokens_only() {
        // Substrings and case variants are different patterns
        assert_eq!(
            edit(Some("www.a.com;A.COM"), "a.com", EditMode::Add),
            updated("www.a.com;A.COM;a.com")
        );
    }

    #[test]
    fn test_add_to_absent_or_empty() {
        assert_eq!(edit(None, "x.com", EditMode::Add), updated("x.com"));
        assert_eq!(edit(Some(""), "x.com", EditMode::Add), updated("x.com"));
    }

    #[test]
    fn test_delete_keeps_order() {
        assert_eq!(
            edit(Some("a.com;b.com;c.com"), "b.com", EditMode::Delete),
            BypassEdit::Updated {
                bypass: "a.com;c.com".to_string(),
                removed: 1
            }
        );
    }

    #[test]
    fn test_delete_removes_every_occurrence() {
        assert_eq!(
            edit(Some("b.com;a.com;b.com;c.com;b.com"), "b.com", EditMode::Delete),
            BypassEdit::Updated {
                bypass: "a.com;c.com".to_string(),
                removed: 3
            }
        );
    }

    #[test]
    fn test_delete_last_pattern_leaves_empty_string() {
        assert_eq!(
            edit(Some("a.com"), "a.com", EditMode::Delete),
            BypassEdit::Updated {
                bypass: String::new(),
                removed: 1
            }
        );
    }

    #[test]
    fn test_delete_missing_pattern_still_rewrites() {
        assert_eq!(
            edit(Some("a.com;b.com"), "x.com", EditMode::Delete),
            updated("a.com;b.com")
        );
    }

    #[test]
    fn test_delete_from_absent_or_empty() {
        assert_eq!(edit(None, "x.com", EditMode::Delete), BypassEdit::NothingToDelete);
        assert_eq!(
            edit(Some(""), "x.com", EditMode::Delete),
            BypassEdit::NothingToDelete
        );
    }

    #[test]
    fn test_parse_drops_empty_tokens() {
        let list = BypassList::parse(";a.com;; b.com ;");
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["a.com", "b.com"]);
        assert_eq!(list.to_string(), "a.com;b.com");
    }

    #[test]
    fn test_separators_only() {
        // Non-empty but tokenless: add starts a fresh list, delete writes it empty
        assert_eq!(edit(Some(";;"), "x.com", EditMode::Add), updated("x.com"));
        assert_eq!(edit(Some(";;"), "x.com", EditMode::Delete), updated(""));
    }

    #[test]
    fn test_join_split_identity() {
        for s in ["a.com", "a.com;b.com", "<local>;*.corp;10.*;host"] {
            assert_eq!(BypassList::parse(s).to_string(), s);
        }
    }

    #[test]
    fn test_collect() {
        let list: BypassList = ["a.com", "b.com"].into_iter().collect();
        assert_eq!(list.len(), 2);
        assert!(!list.is_empty());
        assert!(BypassList::new().is_empty());
        assert_eq!(BypassList::new().to_string(), "");
    }
}
