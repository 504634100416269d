//! Normalized session aliases.

use std::fmt;

/// A session alias, compared case- and whitespace-insensitively.
///
/// `"My Server"`, `"myserver"` and `"MY SERVER"` are the same alias. The
/// original spelling is kept for display.
#[derive(Debug, Clone)]
pub struct Alias {
    original: String,
    key: String,
}

impl Alias {
    /// Create an alias from its caller spelling.
    pub fn new(alias: impl Into<String>) -> Self {
        let original = alias.into();
        let key = Self::normalize(&original);
        Self { original, key }
    }

    /// Normalize an alias for lookup.
    pub fn normalize(alias: &str) -> String {
        alias
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    }

    /// Get the normalized lookup key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the alias as the caller wrote it.
    pub fn as_str(&self) -> &str {
        &self.original
    }
}

impl PartialEq for Alias {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Alias {}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}
