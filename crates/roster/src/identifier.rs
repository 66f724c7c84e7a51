//! Identifier truncation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of leading characters of an order number that are significant for
/// lookup and for the QR payload printed on new badges.
pub const IDENTIFIER_LEN: usize = 11;

/// A truncated attendee identifier.
///
/// Built from either a stored order number or a decoded QR payload; both go
/// through the same trim-and-truncate step so they compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(raw: &str) -> Self {
        let cut: String = raw.trim().chars().take(IDENTIFIER_LEN).collect();
        Self(cut.trim_end().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Filesystem-safe form used for badge file names.
    pub fn file_stem(&self) -> String {
        self.0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
