//! Type-safe puzzle identifier.
//!
//! [`PuzzleId`] is a newtype wrapper around the `BIGSERIAL` primary key
//! assigned by storage, so puzzle identifiers cannot be confused with
//! other integers (best times, timestamps).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PuzzleError;

/// Unique identifier for a stored puzzle.
///
/// Assigned by the repository on insert and immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PuzzleId(i64);

impl PuzzleId {
    /// Wraps a raw storage key.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw storage key.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PuzzleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PuzzleId {
    type Err = PuzzleError;

    /// Parses a path segment. Only positive integers are valid ids.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<i64>() {
            Ok(raw) if raw > 0 => Ok(Self(raw)),
            _ => Err(PuzzleError::Validation(format!("invalid puzzle id: {s:?}"))),
        }
    }
}

impl From<PuzzleId> for i64 {
    fn from(id: PuzzleId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_integers() {
        let Ok(id) = "42".parse::<PuzzleId>() else {
            panic!("valid id rejected");
        };
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn rejects_malformed_ids() {
        for bad in ["", "abc", "0", "-3", "1.5", "99999999999999999999"] {
            let Err(err) = bad.parse::<PuzzleId>() else {
                panic!("{bad:?} should not parse");
            };
            assert!(matches!(err, PuzzleError::Validation(_)));
        }
    }

    #[test]
    fn display_is_plain_number() {
        assert_eq!(PuzzleId::new(7).to_string(), "7");
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&PuzzleId::new(9)).ok();
        assert_eq!(json.as_deref(), Some("9"));
    }
}
