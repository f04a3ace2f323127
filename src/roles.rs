//! Verified-Role Configuration and Role Synchronizer
//!
//! Each community may configure at most one "verified" role. The mapping is
//! persisted as a JSON file keyed by community id and re-read before every
//! pass, so an administrative update takes effect on the next event.
//! Updates rewrite the whole file; concurrent writers to the same key are
//! last-writer-wins, which is an accepted limitation of this store.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::platform::{Member, Platform, PlatformError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read role config from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse role config from {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write role config to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize role config: {0}")]
    Serialize(serde_json::Error),
}

/// Per-community verified-role mapping, persisted as JSON
///
/// Values are nullable: an explicit `null` behaves the same as an absent
/// key (no role management configured for that community).
#[derive(Debug, Clone)]
pub struct VerifiedRoleStore {
    path: PathBuf,
}

impl VerifiedRoleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The configured verified role for a community, if any
    pub fn verified_role(&self, community_id: u64) -> Result<Option<u64>, StoreError> {
        let mapping = self.load()?;
        Ok(mapping.get(&community_id.to_string()).copied().flatten())
    }

    /// Set the verified role for a community (whole-file read-modify-write)
    pub fn set_verified_role(&self, community_id: u64, role_id: u64) -> Result<(), StoreError> {
        let mut mapping = self.load()?;
        mapping.insert(community_id.to_string(), Some(role_id));
        self.save(&mapping)
    }

    fn load(&self) -> Result<HashMap<String, Option<u64>>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            // Missing file means nothing configured yet
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, mapping: &HashMap<String, Option<u64>>) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(mapping).map_err(StoreError::Serialize)?;

        std::fs::write(&self.path, content).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Drive a member's verified-role membership toward the desired state
///
/// Best-effort and idempotent:
/// - no role configured for the community: no-op
/// - configured role no longer exists on the platform: no-op
/// - member already in the desired state: no platform call
/// - platform denies the mutation: logged and swallowed (the command path
///   checks permissions proactively before any role is configured)
pub async fn sync_role(
    platform: &dyn Platform,
    member: &Member,
    desired: bool,
    store: &VerifiedRoleStore,
) {
    let role_id = match store.verified_role(member.community_id) {
        Ok(Some(role_id)) => role_id,
        Ok(None) => return,
        Err(e) => {
            warn!(community_id = member.community_id, error = %e, "could not read role config");
            return;
        }
    };

    if !platform.role_exists(member.community_id, role_id).await {
        debug!(
            community_id = member.community_id,
            role_id, "configured verified role no longer exists"
        );
        return;
    }

    let result = if desired && !member.has_role(role_id) {
        platform
            .add_role(member.community_id, member.id, role_id)
            .await
    } else if !desired && member.has_role(role_id) {
        platform
            .remove_role(member.community_id, member.id, role_id)
            .await
    } else {
        // Already converged
        return;
    };

    match result {
        Ok(()) => {}
        Err(PlatformError::PermissionDenied) => {
            warn!(
                member_id = member.id,
                role_id, "no permission to change role membership, skipping"
            );
        }
        Err(e) => {
            warn!(member_id = member.id, role_id, error = %e, "role sync failed");
        }
    }
}
