//! Test doubles shared across module tests

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::dns::{LookupError, TxtLookup};
use crate::platform::{Member, Platform, PlatformError};

pub(crate) fn member(id: u64, community_id: u64, display_name: &str, roles: &[u64]) -> Member {
    Member {
        id,
        community_id,
        display_name: display_name.to_string(),
        roles: roles.iter().copied().collect(),
    }
}

/// In-memory TXT zone with a lookup call counter
#[derive(Default)]
pub(crate) struct MockTxtLookup {
    records: Mutex<HashMap<String, Vec<String>>>,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl MockTxtLookup {
    pub fn set(&self, owner: &str, texts: Vec<String>) {
        self.records
            .lock()
            .unwrap()
            .insert(owner.to_string(), texts);
    }

    /// Make every subsequent lookup fail (resolver outage)
    pub fn fail_lookups(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TxtLookup for MockTxtLookup {
    async fn lookup_txt(&self, owner: &str) -> Result<Vec<String>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            return Err(LookupError::Resolution("resolver unreachable".to_string()));
        }

        self.records
            .lock()
            .unwrap()
            .get(owner)
            .cloned()
            .ok_or_else(|| LookupError::Resolution(format!("no records for {owner}")))
    }
}

/// Recording platform double
///
/// Mutations are recorded unless the matching deny flag is set, in which
/// case the call fails with `PermissionDenied` and records nothing.
pub(crate) struct MockPlatform {
    renames: Mutex<Vec<(u64, u64, String)>>,
    role_adds: Mutex<Vec<(u64, u64, u64)>>,
    role_removals: Mutex<Vec<(u64, u64, u64)>>,
    existing_roles: Mutex<HashSet<(u64, u64)>>,
    deny_rename: AtomicBool,
    deny_role_mutation: AtomicBool,
    manage_roles: AtomicBool,
    outranks: AtomicBool,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self {
            renames: Mutex::new(Vec::new()),
            role_adds: Mutex::new(Vec::new()),
            role_removals: Mutex::new(Vec::new()),
            existing_roles: Mutex::new(HashSet::new()),
            deny_rename: AtomicBool::new(false),
            deny_role_mutation: AtomicBool::new(false),
            // Bot is fully capable unless a test says otherwise
            manage_roles: AtomicBool::new(true),
            outranks: AtomicBool::new(true),
        }
    }
}

impl MockPlatform {
    pub fn add_existing_role(&self, community_id: u64, role_id: u64) {
        self.existing_roles
            .lock()
            .unwrap()
            .insert((community_id, role_id));
    }

    pub fn deny_renames(&self) {
        self.deny_rename.store(true, Ordering::SeqCst);
    }

    pub fn deny_role_mutations(&self) {
        self.deny_role_mutation.store(true, Ordering::SeqCst);
    }

    pub fn deny_manage_roles(&self) {
        self.manage_roles.store(false, Ordering::SeqCst);
    }

    pub fn deny_outrank(&self) {
        self.outranks.store(false, Ordering::SeqCst);
    }

    pub fn renames(&self) -> Vec<(u64, u64, String)> {
        self.renames.lock().unwrap().clone()
    }

    pub fn role_adds(&self) -> Vec<(u64, u64, u64)> {
        self.role_adds.lock().unwrap().clone()
    }

    pub fn role_removals(&self) -> Vec<(u64, u64, u64)> {
        self.role_removals.lock().unwrap().clone()
    }

    /// Total platform mutations issued so far
    pub fn mutation_count(&self) -> usize {
        self.renames.lock().unwrap().len()
            + self.role_adds.lock().unwrap().len()
            + self.role_removals.lock().unwrap().len()
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn rename_member(
        &self,
        community_id: u64,
        member_id: u64,
        display_name: &str,
    ) -> Result<(), PlatformError> {
        if self.deny_rename.load(Ordering::SeqCst) {
            return Err(PlatformError::PermissionDenied);
        }
        self.renames
            .lock()
            .unwrap()
            .push((community_id, member_id, display_name.to_string()));
        Ok(())
    }

    async fn add_role(
        &self,
        community_id: u64,
        member_id: u64,
        role_id: u64,
    ) -> Result<(), PlatformError> {
        if self.deny_role_mutation.load(Ordering::SeqCst) {
            return Err(PlatformError::PermissionDenied);
        }
        self.role_adds
            .lock()
            .unwrap()
            .push((community_id, member_id, role_id));
        Ok(())
    }

    async fn remove_role(
        &self,
        community_id: u64,
        member_id: u64,
        role_id: u64,
    ) -> Result<(), PlatformError> {
        if self.deny_role_mutation.load(Ordering::SeqCst) {
            return Err(PlatformError::PermissionDenied);
        }
        self.role_removals
            .lock()
            .unwrap()
            .push((community_id, member_id, role_id));
        Ok(())
    }

    async fn role_exists(&self, community_id: u64, role_id: u64) -> bool {
        self.existing_roles
            .lock()
            .unwrap()
            .contains(&(community_id, role_id))
    }

    async fn bot_can_manage_roles(&self, _community_id: u64) -> bool {
        self.manage_roles.load(Ordering::SeqCst)
    }

    async fn bot_outranks_role(&self, _community_id: u64, _role_id: u64) -> bool {
        self.outranks.load(Ordering::SeqCst)
    }
}
