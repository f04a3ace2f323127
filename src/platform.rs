//! Chat Platform Interface
//!
//! The platform (member storage, role mutation, event delivery) is external
//! to this crate. A host binary implements [`Platform`] against its chat
//! client and hands the engine [`Member`] snapshots taken from platform
//! events.

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;

/// Snapshot of a member as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Platform-assigned stable identifier
    pub id: u64,

    /// Identifier of the community (guild) the member belongs to
    pub community_id: u64,

    /// Current display name
    pub display_name: String,

    /// Identifiers of the roles the member currently holds
    pub roles: HashSet<u64>,
}

impl Member {
    pub fn has_role(&self, role_id: u64) -> bool {
        self.roles.contains(&role_id)
    }
}

#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    /// The bot lacks permission for the requested mutation
    #[error("missing permission for the requested operation")]
    PermissionDenied,

    /// Any other platform failure
    #[error("platform request failed: {0}")]
    Unavailable(String),
}

/// Operations the engine needs from the chat platform
#[async_trait]
pub trait Platform: Send + Sync {
    /// Set a member's display name
    async fn rename_member(
        &self,
        community_id: u64,
        member_id: u64,
        display_name: &str,
    ) -> Result<(), PlatformError>;

    /// Grant a role to a member
    async fn add_role(
        &self,
        community_id: u64,
        member_id: u64,
        role_id: u64,
    ) -> Result<(), PlatformError>;

    /// Revoke a role from a member
    async fn remove_role(
        &self,
        community_id: u64,
        member_id: u64,
        role_id: u64,
    ) -> Result<(), PlatformError>;

    /// Whether the role still exists in the community
    async fn role_exists(&self, community_id: u64, role_id: u64) -> bool;

    /// Whether the bot holds role-management capability in the community
    async fn bot_can_manage_roles(&self, community_id: u64) -> bool;

    /// Whether the bot's highest role outranks the given role
    async fn bot_outranks_role(&self, community_id: u64, role_id: u64) -> bool;
}
