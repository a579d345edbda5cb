//! Conflict variants and lifecycle states

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::ConflictError;

/// The five conflict modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictVariant {
    Duel,
    Skirmish,
    Espionage,
    Intrigue,
    Warfare,
}

impl ConflictVariant {
    pub fn all() -> &'static [ConflictVariant] {
        &[
            ConflictVariant::Duel,
            ConflictVariant::Skirmish,
            ConflictVariant::Espionage,
            ConflictVariant::Intrigue,
            ConflictVariant::Warfare,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Duel => "Duel",
            Self::Skirmish => "Skirmish",
            Self::Espionage => "Espionage",
            Self::Intrigue => "Intrigue",
            Self::Warfare => "Warfare",
        }
    }

    /// Participants needed before the conflict becomes active
    pub fn min_participants(&self) -> usize {
        match self {
            Self::Duel | Self::Skirmish | Self::Warfare => 2,
            Self::Espionage | Self::Intrigue => 1,
        }
    }

    pub fn max_participants(&self) -> Option<usize> {
        match self {
            Self::Duel => Some(2),
            _ => None,
        }
    }

    /// Lowest difficulty the calculator may produce
    pub fn difficulty_floor(&self) -> u32 {
        match self {
            Self::Duel | Self::Skirmish | Self::Warfare => 1,
            Self::Espionage | Self::Intrigue => 0,
        }
    }

    /// Whether this variant keeps a strict turn order
    pub fn uses_turns(&self) -> bool {
        matches!(self, Self::Duel | Self::Skirmish)
    }

    /// Whether participants themselves occupy a zone
    pub fn tracks_positions(&self) -> bool {
        matches!(self, Self::Skirmish | Self::Warfare)
    }

    /// Command the generic layer should suggest for this variant
    pub fn command_hint(&self) -> &'static str {
        match self {
            Self::Duel => "duel",
            Self::Skirmish => "skirmish",
            Self::Espionage => "espionage",
            Self::Intrigue => "intrigue",
            Self::Warfare => "warfare",
        }
    }
}

impl fmt::Display for ConflictVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for ConflictVariant {
    type Err = ConflictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConflictVariant::all()
            .iter()
            .find(|v| v.display_name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| ConflictError::Unrecognized {
                kind: "conflict variant",
                value: s.to_string(),
            })
    }
}

/// Lifecycle of a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConflictState {
    /// Created, waiting for enough participants
    #[default]
    Pending,
    /// Resolvable
    Active,
    /// Terminal, no further mutation
    Concluded,
}

impl ConflictState {
    pub fn is_live(&self) -> bool {
        !matches!(self, Self::Concluded)
    }
}

/// How espionage reveals propagate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RevealPolicy {
    /// Only observers a zone was revealed to can see it
    #[default]
    PerObserver,
    /// The first reveal clears the hidden flag for everyone
    Global,
}

impl FromStr for RevealPolicy {
    type Err = ConflictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per_observer" | "per-observer" => Ok(Self::PerObserver),
            "global" => Ok(Self::Global),
            other => Err(ConflictError::Unrecognized {
                kind: "reveal policy",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_round_trips_through_name() {
        for variant in ConflictVariant::all() {
            let parsed: ConflictVariant = variant.display_name().parse().unwrap();
            assert_eq!(parsed, *variant);
        }
    }

    #[test]
    fn test_floors() {
        assert_eq!(ConflictVariant::Duel.difficulty_floor(), 1);
        assert_eq!(ConflictVariant::Espionage.difficulty_floor(), 0);
    }
}
