//! Complexity tiers.
//!
//! Every item is written five times, from an 8th-grade reading level (1) up to
//! professional/MD depth (5).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest tier.
pub const MIN_LEVEL: u8 = 1;

/// Highest tier.
pub const MAX_LEVEL: u8 = 5;

/// A level number outside `1..=5`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("complexity level must be between {MIN_LEVEL} and {MAX_LEVEL}, got {0}")]
pub struct LevelOutOfRange(pub String);

/// One of the five graduated tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ComplexityLevel(u8);

impl ComplexityLevel {
    /// All five tiers in ascending order.
    pub const ALL: [Self; 5] = [Self(1), Self(2), Self(3), Self(4), Self(5)];

    /// Build a level, rejecting values outside `1..=5`.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value >= MIN_LEVEL && value <= MAX_LEVEL {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Parse an object key such as `"3"`.
    ///
    /// # Errors
    ///
    /// Returns [`LevelOutOfRange`] if the key is not an integer in `1..=5`.
    pub fn from_key(key: &str) -> Result<Self, LevelOutOfRange> {
        key.trim()
            .parse::<u8>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| LevelOutOfRange(key.to_owned()))
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Lay-audience tiers, where analogies are expected.
    #[must_use]
    pub const fn is_lay(self) -> bool {
        self.0 <= 2
    }

    /// Advanced tiers, where clinician-facing notes are expected.
    #[must_use]
    pub const fn is_advanced(self) -> bool {
        self.0 >= 4
    }
}

impl TryFrom<u8> for ComplexityLevel {
    type Error = LevelOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| LevelOutOfRange(value.to_string()))
    }
}

impl From<ComplexityLevel> for u8 {
    fn from(level: ComplexityLevel) -> Self {
        level.0
    }
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key_accepts_tiers() {
        for (i, level) in ComplexityLevel::ALL.iter().enumerate() {
            let key = (i + 1).to_string();
            assert_eq!(ComplexityLevel::from_key(&key).unwrap(), *level);
        }
    }

    #[test]
    fn test_from_key_rejects_out_of_range() {
        assert!(ComplexityLevel::from_key("0").is_err());
        assert!(ComplexityLevel::from_key("6").is_err());
        assert!(ComplexityLevel::from_key("intermediate").is_err());
    }

    #[test]
    fn test_tier_predicates() {
        let one = ComplexityLevel::new(1).unwrap();
        let four = ComplexityLevel::new(4).unwrap();
        assert!(one.is_lay());
        assert!(!one.is_advanced());
        assert!(four.is_advanced());
        assert!(!four.is_lay());
    }
}
