use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{Did, MemoryId, PolicyId, ProposalId, ReceiptId};
use crate::memory::MemoryEntry;
use crate::policy::ConsentPolicy;
use crate::proposal::Proposal;
use crate::receipt::ConsentReceipt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileType {
    #[default]
    Human,
    Agent,
    Entity,
}

/// A named slice of the profile a grant may be limited to (e.g. "work").
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubProfile {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Snapshot of a user's record.
///
/// `version` is the optimistic-concurrency marker. Only the storage layer
/// advances it; every pure transition hands it back unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Did,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub profile_type: ProfileType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub memories: Vec<MemoryEntry>,
    #[serde(default)]
    pub access_policies: Vec<ConsentPolicy>,
    #[serde(default)]
    pub proposals: Vec<Proposal>,
    #[serde(default)]
    pub consent_receipts: Vec<ConsentReceipt>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_profiles: Vec<SubProfile>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Profile {
    /// Empty human profile at version 0.
    pub fn new(id: Did, now: DateTime<Utc>) -> Self {
        Self {
            id,
            version: 0,
            profile_type: ProfileType::Human,
            display_name: None,
            memories: Vec::new(),
            access_policies: Vec::new(),
            proposals: Vec::new(),
            consent_receipts: Vec::new(),
            sub_profiles: Vec::new(),
            created: now,
            updated: now,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_memory(mut self, entry: MemoryEntry) -> Self {
        self.updated = self.updated.max(entry.updated);
        self.memories.push(entry);
        self
    }

    /// Add or replace a sub-profile with the same id.
    pub fn with_sub_profile(mut self, sub_profile: SubProfile) -> Self {
        self.sub_profiles.retain(|existing| existing.id != sub_profile.id);
        self.sub_profiles.push(sub_profile);
        self
    }

    /// Bump `updated` without ever moving it backwards.
    pub fn touched(mut self, now: DateTime<Utc>) -> Self {
        self.updated = self.updated.max(now);
        self
    }

    pub fn memory(&self, id: &MemoryId) -> Option<&MemoryEntry> {
        self.memories.iter().find(|m| m.id == *id)
    }

    pub fn policy(&self, id: &PolicyId) -> Option<&ConsentPolicy> {
        self.access_policies.iter().find(|p| p.id == *id)
    }

    pub fn proposal(&self, id: &ProposalId) -> Option<&Proposal> {
        self.proposals.iter().find(|p| p.id == *id)
    }

    pub fn receipt(&self, id: &ReceiptId) -> Option<&ConsentReceipt> {
        self.consent_receipts.iter().find(|r| r.receipt_id == *id)
    }

    pub fn sub_profile(&self, id: &str) -> Option<&SubProfile> {
        self.sub_profiles.iter().find(|s| s.id == id)
    }
}
