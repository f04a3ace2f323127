//! Shaker Verify
//!
//! Verification and reconciliation engine for Handshake name ownership in
//! chat communities. A member proves that they own a Handshake name by
//! publishing a DNS TXT record; this crate keeps two observable states in
//! agreement with that DNS-derived ground truth: the member's display name
//! and a per-community "verified" role.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       SHAKER VERIFY                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Name Normalizer         ←── user-supplied candidate names   │
//! │  Claim Verifier          ←── TXT lookup at _shaker._auth.*   │
//! │  Role Synchronizer       ←── idempotent grant/revoke         │
//! │  Reconciliation Engine   ←── join / profile-update events    │
//! │  Command Handler         ←── verify + setverifiedrole        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The chat platform itself (event delivery, command dispatch, the actual
//! member/role API) is external: a host binary implements the [`Platform`]
//! trait and feeds events into the [`Reconciler`] and [`CommandHandler`].
//!
//! ## State model
//!
//! A member's display name carries the claim state: a trailing `/` means
//! "claims the name before the slash", its absence means "unclaimed". Every
//! reconciliation pass re-derives that state from scratch; the engine keeps
//! no state of its own between events, so passes are idempotent and a
//! member in a stale or fraudulent claim state converges to unclaimed.

pub mod commands;
pub mod config;
pub mod dns;
pub mod name;
pub mod platform;
pub mod reconcile;
pub mod roles;

#[cfg(test)]
pub(crate) mod testing;

pub use commands::{CommandError, CommandHandler, RecordDescriptor, SetRoleOutcome, VerifyOutcome};
pub use config::ShakerConfig;
pub use dns::{ClaimVerifier, HickoryTxtLookup, LookupError, TxtLookup};
pub use name::{NameError, NormalizedName};
pub use platform::{Member, Platform, PlatformError};
pub use reconcile::{ClaimState, ReconcileOutcome, Reconciler};
pub use roles::{sync_role, StoreError, VerifiedRoleStore};
