//! Asset quality rating

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::errors::ConflictError;

/// Highest numeric quality an asset can carry
pub const MAX_QUALITY: u8 = 5;

/// An asset's strength rating: 0 through 5, or the non-numeric "Special" tier
///
/// Special assets contribute nothing to difficulty arithmetic and compare as 0
/// when weighed against other assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    tag = "tier",
    content = "value",
    rename_all = "snake_case",
    try_from = "QualityRepr"
)]
pub enum Quality {
    Rated(u8),
    Special,
}

/// Wire form of [`Quality`], range-checked on the way in
#[derive(Deserialize)]
#[serde(tag = "tier", content = "value", rename_all = "snake_case")]
enum QualityRepr {
    Rated(u8),
    Special,
}

impl TryFrom<QualityRepr> for Quality {
    type Error = ConflictError;

    fn try_from(repr: QualityRepr) -> Result<Self, Self::Error> {
        match repr {
            QualityRepr::Rated(value) => Self::rated(value),
            QualityRepr::Special => Ok(Self::Special),
        }
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::Rated(0)
    }
}

impl Quality {
    /// Build a rated quality, rejecting anything above [`MAX_QUALITY`]
    pub fn rated(value: u8) -> Result<Self, ConflictError> {
        if value > MAX_QUALITY {
            return Err(ConflictError::InvalidQuality(value.to_string()));
        }
        Ok(Self::Rated(value))
    }

    /// Parse catalog notation: a digit or the word "special"
    pub fn parse(raw: &str) -> Result<Self, ConflictError> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("special") {
            return Ok(Self::Special);
        }
        trimmed
            .parse::<u8>()
            .map_err(|_| ConflictError::InvalidQuality(trimmed.to_string()))
            .and_then(Self::rated)
    }

    /// Numeric contribution to difficulty arithmetic
    pub fn value(&self) -> u8 {
        match self {
            Self::Rated(v) => *v,
            Self::Special => 0,
        }
    }

    /// Quality after a rally: one step lower, never below zero
    pub fn reduced(&self) -> Self {
        Self::Rated(self.value().saturating_sub(1))
    }

    pub fn is_special(&self) -> bool {
        matches!(self, Self::Special)
    }

    /// Check a value that may have been built without [`Quality::rated`]
    pub fn validate(self) -> Result<Self, ConflictError> {
        match self {
            Self::Rated(value) => Self::rated(value),
            Self::Special => Ok(self),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rated(v) => write!(f, "{}", v),
            Self::Special => write!(f, "Special"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quality() {
        assert_eq!(Quality::parse("3").unwrap(), Quality::Rated(3));
        assert_eq!(Quality::parse(" Special ").unwrap(), Quality::Special);
        assert!(Quality::parse("6").is_err());
        assert!(Quality::parse("sharp").is_err());
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        let quality: Quality = serde_json::from_str(r#"{"tier":"rated","value":4}"#).unwrap();
        assert_eq!(quality, Quality::Rated(4));
        let special: Quality = serde_json::from_str(r#"{"tier":"special"}"#).unwrap();
        assert_eq!(special, Quality::Special);

        let err = serde_json::from_str::<Quality>(r#"{"tier":"rated","value":200}"#).unwrap_err();
        assert!(err.to_string().contains("200"));
        assert!(Quality::Rated(6).validate().is_err());
    }

    #[test]
    fn test_reduced_floors_at_zero() {
        assert_eq!(Quality::Rated(3).reduced(), Quality::Rated(2));
        assert_eq!(Quality::Rated(0).reduced(), Quality::Rated(0));
        assert_eq!(Quality::Special.reduced(), Quality::Rated(0));
    }
}
