//! Command Handler
//!
//! Entry points for the two user-facing commands:
//!
//! - `verify <name>` — a member asks to prove ownership of a name. On
//!   success the member is renamed to `<name>/` and the verified role
//!   granted; without a proof record the reply carries provisioning
//!   instructions and a registrar deep-link embedding the record payload.
//! - `setverifiedrole <role>` — an administrator configures the community's
//!   verified role. Both bot-capability preconditions are checked up front
//!   and surfaced as distinct failures, since a role the bot cannot grant
//!   would make every later sync a silent no-op.
//!
//! Outcomes carry their user-facing reply text via `message()`; rendering
//! and delivery are the host's concern.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::ShakerConfig;
use crate::dns::{ClaimVerifier, PROOF_LABELS};
use crate::name::{NameError, NormalizedName};
use crate::platform::{Member, Platform, PlatformError};
use crate::roles::{sync_role, StoreError, VerifiedRoleStore};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode provisioning payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// One DNS record the user must publish, as serialized into the deep-link
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RecordDescriptor {
    #[serde(rename = "type")]
    pub record_type: String,
    pub host: String,
    pub value: String,
    pub ttl: u32,
}

/// Result of a `verify` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The input failed normalization; carries it verbatim
    InvalidName { input: String },

    /// Proof found; member renamed and role granted
    Verified { display_name: String },

    /// Proof found but the platform denied the rename
    CannotRename,

    /// No proof yet; advisory instructions, nothing mutated
    Provision {
        rendering: String,
        /// Owner name where the record must be published
        owner: String,
        /// Host field of the record descriptor (proof labels + all-but-last
        /// label, per the registrar's zone-relative convention)
        host: String,
        /// Record data: the member id in decimal
        value: String,
        /// Registrar deep-link embedding the encoded record payload
        link: String,
    },
}

impl VerifyOutcome {
    /// User-facing reply text
    pub fn message(&self) -> String {
        match self {
            VerifyOutcome::InvalidName { input } => {
                format!("`{input}` is not a valid Handshake name.")
            }
            VerifyOutcome::Verified { display_name } => {
                format!("Your display name has been set to `{display_name}`")
            }
            VerifyOutcome::CannotRename => {
                "I could not set your nickname because I do not have permission to. \
                 (Are you the server owner?)"
                    .to_string()
            }
            VerifyOutcome::Provision {
                rendering,
                owner,
                value,
                link,
                ..
            } => {
                format!(
                    "To verify that you own `{rendering}/` please create a TXT record \
                     located at `{owner}` with the following data: `{value}`.\n\n\
                     If you use Namebase, you can do this automatically by visiting the \
                     following link:\n<{link}>\n\n\
                     Once the record is set (this may take a few minutes) you can run \
                     this command again or manually set your nickname to `{rendering}/`."
                )
            }
        }
    }
}

/// Result of a `setverifiedrole` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetRoleOutcome {
    /// Mapping updated
    Updated { role_id: u64 },

    /// The bot lacks role-management capability in the community
    MissingManageRoles,

    /// The bot's highest role does not outrank the requested role
    RoleNotOutranked { role_id: u64 },
}

impl SetRoleOutcome {
    /// User-facing reply text
    pub fn message(&self) -> String {
        match self {
            SetRoleOutcome::Updated { role_id } => {
                format!("The verified role has been set to <@&{role_id}>.")
            }
            SetRoleOutcome::MissingManageRoles => {
                "I do not have permission to add roles to members.".to_string()
            }
            SetRoleOutcome::RoleNotOutranked { role_id } => {
                format!(
                    "I cannot give members this role. Try moving my role above \
                     <@&{role_id}> in the role settings page."
                )
            }
        }
    }
}

/// Handles explicit user commands
pub struct CommandHandler {
    platform: Arc<dyn Platform>,
    verifier: ClaimVerifier,
    store: VerifiedRoleStore,
    config: Arc<ShakerConfig>,
}

impl CommandHandler {
    pub fn new(
        platform: Arc<dyn Platform>,
        verifier: ClaimVerifier,
        store: VerifiedRoleStore,
        config: Arc<ShakerConfig>,
    ) -> Self {
        Self {
            platform,
            verifier,
            store,
            config,
        }
    }

    /// Handle a `verify <name>` request from a member
    pub async fn verify_request(
        &self,
        member: &Member,
        raw_name: &str,
    ) -> Result<VerifyOutcome, CommandError> {
        let name = match NormalizedName::parse(raw_name) {
            Ok(name) => name,
            Err(NameError::InvalidName(input)) => {
                return Ok(VerifyOutcome::InvalidName { input })
            }
        };

        let ascii = name.ascii();

        if self.verifier.verify(member.id, &ascii).await {
            let display_name = format!("{}/", name.rendering());

            match self
                .platform
                .rename_member(member.community_id, member.id, &display_name)
                .await
            {
                Ok(()) => {}
                Err(PlatformError::PermissionDenied) => {
                    return Ok(VerifyOutcome::CannotRename)
                }
                Err(e) => return Err(e.into()),
            }

            sync_role(&*self.platform, member, true, &self.store).await;

            info!(member_id = member.id, name = %ascii, "ownership verified");
            return Ok(VerifyOutcome::Verified { display_name });
        }

        self.provisioning_outcome(member, &name)
    }

    /// Build the advisory provisioning reply for an unproven claim
    fn provisioning_outcome(
        &self,
        member: &Member,
        name: &NormalizedName,
    ) -> Result<VerifyOutcome, CommandError> {
        let value = member.id.to_string();

        let host = PROOF_LABELS
            .iter()
            .map(|s| s.to_string())
            .chain(name.zone_labels().iter().cloned())
            .collect::<Vec<_>>()
            .join(".");

        let records = vec![RecordDescriptor {
            record_type: "TXT".to_string(),
            host: host.clone(),
            value: value.clone(),
            ttl: self.config.record_ttl,
        }];

        let payload = BASE64.encode(serde_json::to_vec(&records)?);
        let link = format!(
            "{}/{}/records?records={}",
            self.config.provisioning_base_url,
            name.tld(),
            payload
        );

        Ok(VerifyOutcome::Provision {
            rendering: name.rendering().to_string(),
            owner: ClaimVerifier::owner_name(&name.ascii()),
            host,
            value,
            link,
        })
    }

    /// Handle a `setverifiedrole <role>` request from an administrator
    pub async fn set_verified_role(
        &self,
        community_id: u64,
        role_id: u64,
    ) -> Result<SetRoleOutcome, CommandError> {
        if !self.platform.bot_can_manage_roles(community_id).await {
            return Ok(SetRoleOutcome::MissingManageRoles);
        }

        if !self.platform.bot_outranks_role(community_id, role_id).await {
            return Ok(SetRoleOutcome::RoleNotOutranked { role_id });
        }

        self.store.set_verified_role(community_id, role_id)?;

        info!(community_id, role_id, "verified role configured");
        Ok(SetRoleOutcome::Updated { role_id })
    }
}
