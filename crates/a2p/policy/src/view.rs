use a2p_scope::is_within;
use a2p_types::{has_permission, Did, MemoryEntry, MemoryStatus, PermissionLevel, Profile};
use serde::{Deserialize, Serialize};

use crate::evaluator::AccessDecision;

/// The slice of a profile an agent may read under one decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopedView {
    pub user_did: Did,
    pub agent_did: Did,
    pub scopes: Vec<String>,
    pub permissions: Vec<PermissionLevel>,
    pub memories: Vec<MemoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_profile: Option<String>,
}

impl ScopedView {
    pub fn is_empty(&self) -> bool {
        self.memories.is_empty()
    }
}

/// Whether `entry` is visible under `decision`.
///
/// Uncategorized entries are never shown to agents.
pub fn is_visible(entry: &MemoryEntry, decision: &AccessDecision) -> bool {
    if !decision.granted || entry.status != MemoryStatus::Approved {
        return false;
    }
    let Some(category) = entry.category.as_deref() else {
        return false;
    };
    decision
        .allowed_scopes
        .iter()
        .any(|scope| is_within(category, scope))
        && has_permission(&decision.permissions, entry.sensitivity.required_permission())
}

/// Everything `decision` lets the agent see from `profile`.
pub fn project(profile: &Profile, decision: &AccessDecision) -> ScopedView {
    ScopedView {
        user_did: profile.id.clone(),
        agent_did: decision.agent_did.clone(),
        scopes: decision.allowed_scopes.clone(),
        permissions: decision.permissions.clone(),
        memories: profile
            .memories
            .iter()
            .filter(|entry| is_visible(entry, decision))
            .cloned()
            .collect(),
        sub_profile: decision
            .matched_policy
            .as_ref()
            .and_then(|p| p.sub_profile.clone()),
    }
}
