//! Engine Configuration
//!
//! Configurable parameters for the verification engine. The nameserver list
//! is explicit: the resolver never falls back to the system configuration,
//! so a misconfigured host cannot silently verify against the wrong root.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

/// Main configuration for the verification engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShakerConfig {
    // === DNS ===

    /// Nameservers the claim verifier queries (must resolve Handshake names)
    pub nameservers: Vec<IpAddr>,

    /// Port of the nameservers
    pub dns_port: u16,

    /// TTL advertised in provisioning record descriptors (seconds)
    pub record_ttl: u32,

    // === Persistence ===

    /// Path to the per-community verified-role mapping (JSON)
    pub roles_path: PathBuf,

    // === Provisioning ===

    /// Base URL of the registrar deep-link embedded in provisioning replies
    pub provisioning_base_url: String,
}

impl Default for ShakerConfig {
    fn default() -> Self {
        Self {
            // A local Handshake resolver, e.g. hnsd
            nameservers: vec![IpAddr::V4(Ipv4Addr::LOCALHOST)],
            dns_port: 53,
            record_ttl: 60,
            roles_path: PathBuf::from("roles.json"),
            provisioning_base_url: "https://namebase.io/next/domain-manager".to_string(),
        }
    }
}

impl ShakerConfig {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    // Builder-style methods for host overrides

    pub fn with_nameservers(mut self, nameservers: Vec<IpAddr>) -> Self {
        self.nameservers = nameservers;
        self
    }

    pub fn with_dns_port(mut self, port: u16) -> Self {
        self.dns_port = port;
        self
    }

    pub fn with_roles_path(mut self, path: PathBuf) -> Self {
        self.roles_path = path;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.nameservers.is_empty() {
            anyhow::bail!("at least one nameserver is required");
        }

        if self.record_ttl == 0 {
            anyhow::bail!("record_ttl must be non-zero");
        }

        if self.provisioning_base_url.is_empty() {
            anyhow::bail!("provisioning_base_url must not be empty");
        }

        Ok(())
    }
}
