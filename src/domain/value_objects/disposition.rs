//! Social disposition used by intrigue conflicts
//!
//! A disposition is the stance a person or group takes toward someone acting
//! on them. It shifts the difficulty of influence attempts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::ConflictError;

/// Ordinal social stance, from most to least receptive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Allied,
    Friendly,
    #[default]
    Neutral,
    Unfriendly,
    Opposed,
}

impl Disposition {
    /// All levels, most receptive first
    pub fn all() -> &'static [Disposition] {
        &[
            Disposition::Allied,
            Disposition::Friendly,
            Disposition::Neutral,
            Disposition::Unfriendly,
            Disposition::Opposed,
        ]
    }

    /// Difficulty modifier applied to influence attempts
    pub fn modifier(&self) -> i32 {
        match self {
            Disposition::Allied => -2,
            Disposition::Friendly => -1,
            Disposition::Neutral => 0,
            Disposition::Unfriendly => 1,
            Disposition::Opposed => 2,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Disposition::Allied => "Allied",
            Disposition::Friendly => "Friendly",
            Disposition::Neutral => "Neutral",
            Disposition::Unfriendly => "Unfriendly",
            Disposition::Opposed => "Opposed",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Disposition {
    type Err = ConflictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Disposition::all()
            .iter()
            .find(|d| d.display_name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| ConflictError::Unrecognized {
                kind: "disposition",
                value: s.to_string(),
            })
    }
}
