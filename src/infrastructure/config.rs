//! Application configuration

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::domain::value_objects::{ParticipantId, RevealPolicy};

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP server port
    pub server_port: u16,

    /// Optional JSON file extending the built-in asset catalog
    pub asset_catalog_path: Option<PathBuf>,

    /// How espionage reveals propagate in newly created conflicts
    pub reveal_policy: RevealPolicy,

    /// Participants allowed to command forces in a warfare
    pub warfare_commanders: Vec<ParticipantId>,
    /// When set, anyone may join a warfare
    pub warfare_open_enlistment: bool,

    /// Participants who may end any conflict
    pub admin_participants: Vec<ParticipantId>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,

            asset_catalog_path: env::var("ASSET_CATALOG_PATH")
                .ok()
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),

            reveal_policy: env::var("REVEAL_POLICY")
                .unwrap_or_else(|_| "per_observer".to_string())
                .parse()
                .context("REVEAL_POLICY must be 'per_observer' or 'global'")?,

            warfare_commanders: parse_participants(
                &env::var("WARFARE_COMMANDERS").unwrap_or_default(),
            )
            .context("WARFARE_COMMANDERS must be a comma-separated list of UUIDs")?,
            warfare_open_enlistment: env::var("WARFARE_OPEN_ENLISTMENT")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .context("WARFARE_OPEN_ENLISTMENT must be 'true' or 'false'")?,

            admin_participants: parse_participants(
                &env::var("ADMIN_PARTICIPANTS").unwrap_or_default(),
            )
            .context("ADMIN_PARTICIPANTS must be a comma-separated list of UUIDs")?,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 3000,
            asset_catalog_path: None,
            reveal_policy: RevealPolicy::default(),
            warfare_commanders: Vec::new(),
            warfare_open_enlistment: false,
            admin_participants: Vec::new(),
        }
    }
}

/// Parse a comma-separated list of participant UUIDs, skipping blanks
fn parse_participants(raw: &str) -> Result<Vec<ParticipantId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            Uuid::parse_str(item)
                .map(ParticipantId::from_uuid)
                .with_context(|| format!("'{}' is not a valid UUID", item))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_participants_skips_blanks() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let parsed = parse_participants(&format!(" {a}, ,{b},")).unwrap();
        assert_eq!(
            parsed,
            vec![ParticipantId::from_uuid(a), ParticipantId::from_uuid(b)]
        );
        assert!(parse_participants("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_participants_rejects_garbage() {
        assert!(parse_participants("not-a-uuid").is_err());
    }
}
