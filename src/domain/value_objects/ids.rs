//! Strongly-typed identifiers for conflict entities

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A string that is not a UUID where an id of some kind was expected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind} ID '{raw}'")]
pub struct InvalidId {
    pub kind: &'static str,
    pub raw: String,
}

macro_rules! define_id {
    ($name:ident, $kind:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// What this id names, for messages
            pub const KIND: &'static str = $kind;

            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidId;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(raw.trim()).map(Self).map_err(|_| InvalidId {
                    kind: $kind,
                    raw: raw.to_string(),
                })
            }
        }
    };
}

define_id!(ConflictId, "conflict");
define_id!(LocationId, "location");
define_id!(ParticipantId, "participant");
define_id!(ZoneId, "zone");
define_id!(AssetId, "asset");
define_id!(TaskId, "task");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_parse_and_name_their_kind() {
        let id = ConflictId::new();
        let parsed: ConflictId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);

        let err = "sietch".parse::<TaskId>().unwrap_err();
        assert_eq!(err.kind, TaskId::KIND);
        assert_eq!(err.to_string(), "Invalid task ID 'sietch'");
    }
}
