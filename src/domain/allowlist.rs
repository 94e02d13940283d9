//! Field allowlist for redaction.
//!
//! Only fields named in the allowlist survive redaction. Entries come in
//! three shapes:
//! - a plain name (`"id"`) matches a key with that name at any depth
//! - a dotted path (`"data.user_id"`) matches the key at exactly that path
//! - a regular expression matches either the key name or its dotted path
//!
//! All matching is ASCII case-insensitive.

use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Fields shown when no allowlist is configured.
pub const DEFAULT_ALLOWED_FIELDS: &[&str] = &["id"];

/// One allowlist entry.
#[derive(Debug, Clone)]
pub enum FieldPattern {
    /// Exact key name, lowercased
    Name(String),
    /// Exact dotted path from the payload root, lowercased
    Path(String),
    /// Regular expression tested against key and path
    Regex(Regex),
}

impl FieldPattern {
    /// Classify a literal entry as a name or a dotted path.
    pub fn literal(field: &str) -> Self {
        let lowered = field.to_ascii_lowercase();
        if lowered.contains('.') {
            FieldPattern::Path(lowered)
        } else {
            FieldPattern::Name(lowered)
        }
    }

    /// Compile a case-insensitive regular expression entry.
    ///
    /// # Errors
    /// Returns the regex error if the pattern does not compile.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(FieldPattern::Regex)
    }
}

/// An immutable set of allowed field patterns.
///
/// # Examples
///
/// ```
/// use workflow_logger::AllowList;
///
/// let allowlist = AllowList::new(["id", "data.user_id"])
///     .with_patterns([r".*_id$"])
///     .unwrap();
///
/// assert!(allowlist.allows("ID", "ID"));
/// assert!(allowlist.allows("user_id", "data.user_id"));
/// assert!(allowlist.allows("account_id", "account_id"));
/// assert!(!allowlist.allows("password", "password"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    names: HashSet<String>,
    paths: HashSet<String>,
    regexes: Vec<Regex>,
}

impl AllowList {
    /// Build an allowlist from literal field names and dotted paths.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fields
            .into_iter()
            .map(|field| FieldPattern::literal(field.as_ref()))
            .collect()
    }

    /// Add regular expression entries.
    ///
    /// # Errors
    /// Returns the first regex that fails to compile.
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.push(FieldPattern::regex(pattern.as_ref())?);
        }
        Ok(self)
    }

    fn push(&mut self, pattern: FieldPattern) {
        match pattern {
            FieldPattern::Name(name) => {
                self.names.insert(name);
            }
            FieldPattern::Path(path) => {
                self.paths.insert(path);
            }
            FieldPattern::Regex(regex) => self.regexes.push(regex),
        }
    }

    /// Check whether a key, found at `path`, is exempt from redaction.
    pub fn allows(&self, key: &str, path: &str) -> bool {
        let key_lower = key.to_ascii_lowercase();
        if self.names.contains(&key_lower) {
            return true;
        }

        if !self.paths.is_empty() && self.paths.contains(&path.to_ascii_lowercase()) {
            return true;
        }

        self.regexes
            .iter()
            .any(|regex| regex.is_match(key) || regex.is_match(path))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.names.len() + self.paths.len() + self.regexes.len()
    }

    /// True if nothing is allowed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<FieldPattern> for AllowList {
    fn from_iter<T: IntoIterator<Item = FieldPattern>>(iter: T) -> Self {
        let mut allowlist = AllowList::default();
        for pattern in iter {
            allowlist.push(pattern);
        }
        allowlist
    }
}
