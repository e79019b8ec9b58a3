//! # World State Key Space
//!
//! Sole owner of the rule that turns `(kind, id)` into a ledger key.
//!
//! ## Encoding
//!
//! ```text
//! key   = kind ++ "||" ++ id
//! range = [ kind ++ "||" , kind ++ "|}" )
//! ```
//!
//! Kinds are restricted to `[A-Za-z0-9_]`, so the first `||` in a key always
//! starts right after the kind. That makes decoding unambiguous and keeps
//! `"User"` and `"UserX"` in disjoint ranges: every `User` key continues with
//! `|` where every `UserX` key continues with `X`.
//!
//! The exclusive upper bound is the byte-wise successor of the prefix rather
//! than a high code point appended to it. A sentinel character would let ids
//! that start with a higher code point escape the scan.

use crate::domain::errors::KeyError;
use std::fmt;

/// Separator between the kind prefix and the entity id.
pub const KEY_SEPARATOR: &str = "||";

/// Upper range bound suffix: `KEY_SEPARATOR` with its last byte incremented.
const RANGE_END_SUFFIX: &str = "|}";

/// A key in the world state, produced only by this module.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LedgerKey(String);

impl LedgerKey {
    /// Borrow the encoded key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key, returning the encoded string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Half-open key interval covering exactly one entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    /// Inclusive lower bound.
    pub start: String,
    /// Exclusive upper bound.
    pub end: String,
}

impl KeyRange {
    /// Returns true if `key` falls inside `[start, end)`.
    pub fn contains(&self, key: &str) -> bool {
        key >= self.start.as_str() && key < self.end.as_str()
    }
}

fn validate_kind(kind: &str) -> Result<(), KeyError> {
    if kind.is_empty() || !kind.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(KeyError::InvalidKind {
            kind: kind.to_string(),
        });
    }
    Ok(())
}

fn validate_id(id: &str) -> Result<(), KeyError> {
    if id.is_empty() {
        return Err(KeyError::InvalidIdentifier {
            id: id.to_string(),
            reason: "identifier is empty",
        });
    }
    if id.contains(KEY_SEPARATOR) {
        return Err(KeyError::InvalidIdentifier {
            id: id.to_string(),
            reason: "identifier contains the key separator",
        });
    }
    Ok(())
}

/// Encode `(kind, id)` into its ledger key.
///
/// Injective over all valid ids: two different pairs never share a key.
pub fn encode_key(kind: &str, id: &str) -> Result<LedgerKey, KeyError> {
    validate_kind(kind)?;
    validate_id(id)?;

    let mut key = String::with_capacity(kind.len() + KEY_SEPARATOR.len() + id.len());
    key.push_str(kind);
    key.push_str(KEY_SEPARATOR);
    key.push_str(id);
    Ok(LedgerKey(key))
}

/// Range covering every key of `kind`, in ascending id order.
pub fn range_bounds(kind: &str) -> Result<KeyRange, KeyError> {
    validate_kind(kind)?;
    Ok(KeyRange {
        start: format!("{kind}{KEY_SEPARATOR}"),
        end: format!("{kind}{RANGE_END_SUFFIX}"),
    })
}

/// Split a ledger key back into `(kind, id)`.
///
/// Returns `None` for keys that were not produced by [`encode_key`].
pub fn decode_key(key: &str) -> Option<(&str, &str)> {
    let (kind, id) = key.split_once(KEY_SEPARATOR)?;
    if validate_kind(kind).is_err() || validate_id(id).is_err() {
        return None;
    }
    Some((kind, id))
}
