//! Key validation.
//!
//! Valid keys:
//! - May carry a single leading `/` (the path-info form), which is stripped
//! - Must be non-empty after stripping
//! - Must consist only of `A-Z`, `a-z`, `0-9`, `.`, `_` and `-`
//!
//! The character set rules out separators, so a key always names a single
//! entry directly inside the store root. `.` and `..` are made of legal
//! characters and are therefore accepted here; the resolver rejects them
//! after canonicalization.

use std::fmt;

use crate::error::{StoreError, StoreResult};

/// A validated store key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StoreKey(String);

impl StoreKey {
    /// Validate `raw` and build a key from it.
    ///
    /// # Examples
    ///
    /// ```
    /// use simplestore_store::StoreKey;
    ///
    /// assert_eq!(StoreKey::parse("/report.md").unwrap().as_str(), "report.md");
    /// assert!(StoreKey::parse("").is_err());
    /// assert!(StoreKey::parse("../etc/passwd").is_err());
    /// ```
    pub fn parse(raw: &str) -> StoreResult<Self> {
        let key = raw.strip_prefix('/').unwrap_or(raw);

        if key.is_empty() {
            return Err(StoreError::InvalidKey {
                key: raw.to_string(),
                reason: "key must not be empty".into(),
            });
        }

        if let Some(ch) = key.chars().find(|c| !is_key_char(*c)) {
            return Err(StoreError::InvalidKey {
                key: raw.to_string(),
                reason: format!("contains forbidden character: {ch:?}"),
            });
        }

        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `[A-Za-z0-9._-]`
fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StoreKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
