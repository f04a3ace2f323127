//! Reconciliation Engine
//!
//! Drives a member's display name and role membership toward agreement
//! with the DNS-published ownership proof. Runs on every member join and
//! profile update; each pass re-derives the claim state from the display
//! name alone, so the engine is stateless between events and a repeated
//! or reordered pass converges to the same result.
//!
//! ## States
//!
//! - **Unclaimed** — no trailing `/`: the verified role must be absent.
//! - **Claimed and verified** — trailing `/` with a matching proof record:
//!   the verified role must be present.
//! - **Claimed and unverified** — trailing `/` without proof: a stale or
//!   fraudulent claim. The display name is reverted by stripping the slash
//!   (skipped when the platform denies the rename) and the role revoked
//!   regardless.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::dns::ClaimVerifier;
use crate::platform::{Member, Platform, PlatformError};
use crate::roles::{sync_role, VerifiedRoleStore};

/// Claim state carried by a display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimState {
    /// No trailing slash: no claim made
    Unclaimed,

    /// Trailing slash: claims the name before it
    Claimed(String),
}

impl ClaimState {
    pub fn of(display_name: &str) -> Self {
        match display_name.strip_suffix('/') {
            Some(name) => ClaimState::Claimed(name.to_string()),
            None => ClaimState::Unclaimed,
        }
    }
}

/// What a reconciliation pass decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No claim; role driven to absent
    Unclaimed,

    /// Claim attested by DNS; role driven to present
    Verified,

    /// Claim not attested; display name reverted and role driven to absent
    Reverted,
}

/// Orchestrates claim verification and role synchronization per member
pub struct Reconciler {
    platform: Arc<dyn Platform>,
    verifier: ClaimVerifier,
    store: VerifiedRoleStore,
}

impl Reconciler {
    pub fn new(
        platform: Arc<dyn Platform>,
        verifier: ClaimVerifier,
        store: VerifiedRoleStore,
    ) -> Self {
        Self {
            platform,
            verifier,
            store,
        }
    }

    /// Entry point for the member-joined platform event
    pub async fn member_joined(&self, member: &Member) -> ReconcileOutcome {
        self.reconcile(member).await
    }

    /// Entry point for the member-profile-updated platform event
    pub async fn member_updated(&self, member: &Member) -> ReconcileOutcome {
        self.reconcile(member).await
    }

    /// One full reconciliation pass against the member's current state
    pub async fn reconcile(&self, member: &Member) -> ReconcileOutcome {
        match ClaimState::of(&member.display_name) {
            ClaimState::Unclaimed => {
                sync_role(&*self.platform, member, false, &self.store).await;
                ReconcileOutcome::Unclaimed
            }
            ClaimState::Claimed(name) => {
                if self.verifier.verify(member.id, &name).await {
                    sync_role(&*self.platform, member, true, &self.store).await;
                    ReconcileOutcome::Verified
                } else {
                    info!(
                        member_id = member.id,
                        name = %name,
                        "claim not attested by DNS, reverting display name"
                    );
                    self.revert_display_name(member, &name).await;
                    sync_role(&*self.platform, member, false, &self.store).await;
                    ReconcileOutcome::Reverted
                }
            }
        }
    }

    /// Strip the claim marker from the display name. A denied rename is
    /// skipped; revocation proceeds either way.
    async fn revert_display_name(&self, member: &Member, bare_name: &str) {
        match self
            .platform
            .rename_member(member.community_id, member.id, bare_name)
            .await
        {
            Ok(()) => {}
            Err(PlatformError::PermissionDenied) => {
                debug!(member_id = member.id, "no permission to revert display name");
            }
            Err(e) => {
                warn!(member_id = member.id, error = %e, "display name revert failed");
            }
        }
    }
}
