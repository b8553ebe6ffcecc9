//! Key patterns for enumeration.
//!
//! Patterns are regular expressions with one convenience rewrite: `*` stands
//! for "one or more of any character" (`.+`). A pattern matches a key when a
//! match starts at position 0; the rest of the key is unconstrained, so
//! `a.` matches both `apple` and `airplane`. Alternation with `|` unions the
//! branches, each anchored at the start.

use crate::error::Result;
use regex::Regex;

/// A compiled key pattern.
#[derive(Debug, Clone)]
pub struct KeyPattern {
    regex: Option<Regex>,
}

impl KeyPattern {
    /// Compiles a pattern. The empty pattern matches every key.
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Ok(Self { regex: None });
        }

        let rewritten = pattern.replace('*', ".+");
        let regex = Regex::new(&format!("^(?:{rewritten})"))?;
        Ok(Self { regex: Some(regex) })
    }

    /// Returns true if `key` starts with a match.
    #[inline]
    pub fn matches(&self, key: &str) -> bool {
        self.regex.as_ref().map_or(true, |re| re.is_match(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_matches_all() {
        let pattern = KeyPattern::new("").unwrap();
        assert!(pattern.matches("anything"));
        assert!(pattern.matches("x"));
    }

    #[test]
    fn test_prefix_anchored() {
        let pattern = KeyPattern::new("a.").unwrap();
        assert!(pattern.matches("apple"));
        assert!(pattern.matches("airplane"));
        assert!(!pattern.matches("a"));
        assert!(!pattern.matches("banana"));
    }

    #[test]
    fn test_alternation() {
        let pattern = KeyPattern::new("a.|grass").unwrap();
        assert!(pattern.matches("apple"));
        assert!(pattern.matches("grass"));
        assert!(pattern.matches("grasshopper"));
        assert!(!pattern.matches("b"));
        assert!(!pattern.matches("seagrass"));
    }

    #[test]
    fn test_star_is_one_or_more() {
        let pattern = KeyPattern::new("regex;*;item").unwrap();
        assert!(pattern.matches("regex;val1;item"));
        assert!(pattern.matches("regex;val2;item"));
        assert!(!pattern.matches("regex;val3;nothing"));
        assert!(!pattern.matches("regex;;item"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = KeyPattern::new("(unclosed").unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
