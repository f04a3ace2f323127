//! Claim Verifier
//!
//! Decides whether a DNS TXT record attests that a member owns a Handshake
//! name. The ownership proof lives at `_shaker._auth.<name>` and must
//! contain the member's decimal identifier.
//!
//! ## Semantics
//!
//! For each returned record, the presentation text is split on whitespace
//! and only the LAST token is inspected; the claim is accepted when that
//! token contains the member id as a substring. Resolution failures of any
//! kind (NXDOMAIN, timeout, malformed response) are reported as "not
//! verified" — absence and failure are indistinguishable here.
//!
//! The substring match can false-positive (id `123` matches inside `45123`).
//! That looseness is a known property of the proof format and is kept as-is.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::proto::rr::rdata::TXT;
use hickory_resolver::TokioAsyncResolver;
use thiserror::Error;
use tracing::debug;

use crate::config::ShakerConfig;

/// Labels prepended to a name to form the proof owner name
pub const PROOF_LABELS: [&str; 2] = ["_shaker", "_auth"];

#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("TXT lookup failed: {0}")]
    Resolution(String),
}

/// TXT lookup seam
///
/// Each returned string is the presentation text of one TXT record:
/// quoted character-strings joined with spaces.
#[async_trait]
pub trait TxtLookup: Send + Sync {
    async fn lookup_txt(&self, owner: &str) -> Result<Vec<String>, LookupError>;
}

/// TXT lookup backed by hickory-resolver
///
/// Built from an explicit nameserver list — the system resolver
/// configuration is never consulted. One instance is shared process-wide;
/// there is no per-query caching or retry policy beyond resolver defaults.
pub struct HickoryTxtLookup {
    resolver: TokioAsyncResolver,
}

impl HickoryTxtLookup {
    /// Create a lookup pointed at the given nameservers
    pub fn new(nameservers: &[IpAddr], port: u16) -> Self {
        let group = NameServerConfigGroup::from_ips_clear(nameservers, port, true);
        let config = ResolverConfig::from_parts(None, vec![], group);
        let resolver = TokioAsyncResolver::tokio(config, ResolverOpts::default());
        Self { resolver }
    }

    /// Create a lookup from engine configuration
    pub fn from_config(config: &ShakerConfig) -> Self {
        Self::new(&config.nameservers, config.dns_port)
    }
}

#[async_trait]
impl TxtLookup for HickoryTxtLookup {
    async fn lookup_txt(&self, owner: &str) -> Result<Vec<String>, LookupError> {
        let lookup = self
            .resolver
            .txt_lookup(owner)
            .await
            .map_err(|e| LookupError::Resolution(e.to_string()))?;

        Ok(lookup.iter().map(record_text).collect())
    }
}

/// Presentation text of a TXT record
fn record_text(txt: &TXT) -> String {
    txt.txt_data()
        .iter()
        .map(|cs| format!("\"{}\"", String::from_utf8_lossy(cs)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Verifies ownership claims against published TXT records
#[derive(Clone)]
pub struct ClaimVerifier {
    lookup: Arc<dyn TxtLookup>,
}

impl ClaimVerifier {
    pub fn new(lookup: Arc<dyn TxtLookup>) -> Self {
        Self { lookup }
    }

    /// The owner name queried for a given ASCII name
    pub fn owner_name(ascii_name: &str) -> String {
        format!("{}.{}.{}", PROOF_LABELS[0], PROOF_LABELS[1], ascii_name)
    }

    /// Check whether a published proof record attests the member's claim
    pub async fn verify(&self, member_id: u64, ascii_name: &str) -> bool {
        let owner = Self::owner_name(ascii_name);

        let records = match self.lookup.lookup_txt(&owner).await {
            Ok(records) => records,
            Err(e) => {
                debug!(owner = %owner, error = %e, "proof lookup failed, treating as unverified");
                return false;
            }
        };

        let id = member_id.to_string();
        for text in &records {
            if let Some(last) = text.split_whitespace().last() {
                if last.contains(&id) {
                    debug!(owner = %owner, member_id, "ownership proof found");
                    return true;
                }
            }
        }

        false
    }
}
