//! Movement qualifiers and mobility classes

use serde::{Deserialize, Serialize};

/// How an asset moves: openly, carefully, or forcing its way through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Manner {
    #[default]
    Normal,
    Subtle,
    Bold,
}

impl Manner {
    /// Subtle and bold movement slip past security checks
    pub fn bypasses_security(&self) -> bool {
        matches!(self, Manner::Subtle | Manner::Bold)
    }
}

/// How far an asset may travel in one action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mobility {
    /// Cannot be moved once placed
    Immobile,
    /// May only step to a zone adjacent under the duel topology
    AdjacentOnly,
    /// May move to any reachable zone
    Free,
    /// May move one extra zone per action
    Fast,
}

impl Mobility {
    pub fn can_move(&self) -> bool {
        !matches!(self, Mobility::Immobile)
    }

    pub fn allows_second_hop(&self) -> bool {
        matches!(self, Mobility::Fast)
    }
}
