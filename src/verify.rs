//! Guards that pin a scripted edit to the text it was written against.

use std::fmt;
use xxhash_rust::xxh3::xxh3_64;

/// What a scripted edit expects its range to hold before it is scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// The range must hold exactly this text
    ExactMatch(String),
    /// xxh3 digest of the text; keeps scripts small when spans are large
    Hash(u64),
}

impl EditVerification {
    /// Parse a hex-encoded xxh3 digest, with or without a `0x` prefix.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim();
        let digits = digits.strip_prefix("0x").unwrap_or(digits);
        if digits.is_empty() || digits.len() > 16 {
            return None;
        }
        u64::from_str_radix(digits, 16).ok().map(EditVerification::Hash)
    }

    pub fn matches(&self, found: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => found == expected,
            EditVerification::Hash(digest) => digest_of(found) == *digest,
        }
    }
}

/// xxh3 digest of `text`, as stored in `expected_hash`.
pub fn digest_of(text: &str) -> u64 {
    xxh3_64(text.as_bytes())
}

impl fmt::Display for EditVerification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditVerification::ExactMatch(text) => write!(f, "{text:?}"),
            EditVerification::Hash(digest) => write!(f, "text with xxh3 {digest:016x}"),
        }
    }
}
