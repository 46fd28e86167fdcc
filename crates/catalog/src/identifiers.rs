//! Newtype identifiers and the API credential.
//!
//! VNDB identifies every database entry with a one- or two-letter prefix
//! followed by a number: `v17` is a visual novel, `r1` a release, `u2` a user,
//! and so on. [`VndbId`] keeps that string intact (the API accepts and returns
//! it verbatim) while offering typed access to both halves.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Database identifiers
// ---------------------------------------------------------------------------

/// A VNDB database identifier such as `"v17"` or `"sf190"`.
///
/// The default value is the empty string; it only appears in records whose
/// `id` field was not part of the field selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VndbId(String);

impl VndbId {
    /// Creates a new identifier, returning `None` if the value is empty.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.is_empty() {
            None
        } else {
            Some(Self(v))
        }
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the alphabetic prefix (`"v"` for `"v17"`).
    pub fn prefix(&self) -> &str {
        let end = self
            .0
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(self.0.len());
        &self.0[..end]
    }

    /// Returns the numeric part, if the identifier has the usual
    /// `<prefix><number>` shape.
    pub fn number(&self) -> Option<u64> {
        let digits = &self.0[self.prefix().len()..];
        if digits.is_empty() {
            return None;
        }
        digits.parse().ok()
    }
}

impl std::fmt::Display for VndbId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<str> for VndbId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for VndbId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// A VNDB API token, sent as `Authorization: Bearer <token>`.
///
/// `Debug` output is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Creates a credential, returning `None` for an empty or blank token.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let t = token.into();
        if t.trim().is_empty() {
            None
        } else {
            Some(Self(t))
        }
    }

    /// Returns the raw token.
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}
