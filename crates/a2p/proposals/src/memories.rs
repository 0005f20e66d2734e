//! Memories the user records directly, without an agent proposal.

use a2p_types::{MemoryEntry, MemorySource, MemoryStatus, MemoryType, Profile, SensitivityLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProposalError, ProposalResult};

/// A fact the user states about themselves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMemory {
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub memory_type: Option<MemoryType>,
    #[serde(default)]
    pub sensitivity: Option<SensitivityLevel>,
    #[serde(default)]
    pub scope: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewMemory {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            category: None,
            memory_type: None,
            sensitivity: None,
            scope: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn memory_type(mut self, memory_type: MemoryType) -> Self {
        self.memory_type = Some(memory_type);
        self
    }

    pub fn sensitivity(mut self, sensitivity: SensitivityLevel) -> Self {
        self.sensitivity = Some(sensitivity);
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Append a user-authored memory, returning the new snapshot and the entry.
///
/// The user is the source of truth, so the entry is approved with full
/// confidence.
pub fn add_memory(
    profile: &Profile,
    new: NewMemory,
    now: DateTime<Utc>,
) -> ProposalResult<(Profile, MemoryEntry)> {
    if new.content.trim().is_empty() {
        return Err(ProposalError::InvalidMemory("content is empty".into()));
    }
    if new.category.as_deref().is_some_and(|c| c.trim().is_empty()) {
        return Err(ProposalError::InvalidMemory("category is empty".into()));
    }

    let memory = MemoryEntry::builder(new.content, MemorySource::user_manual(now))
        .category(new.category)
        .memory_type(new.memory_type.unwrap_or(MemoryType::Semantic))
        .confidence(1.0)
        .sensitivity(new.sensitivity.unwrap_or_default())
        .scope(new.scope)
        .tags(new.tags)
        .status(MemoryStatus::Approved)
        .build();

    debug!(memory = %memory.id, category = ?memory.category, "memory added");
    let mut next = profile.clone();
    next.memories.push(memory.clone());
    Ok((next.touched(now), memory))
}

#[cfg(test)]
mod tests {
    use super::*;
    use a2p_types::{Did, SourceKind};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 3, 12, 0, 0).unwrap()
    }

    fn profile() -> Profile {
        Profile::new(Did::new("did:a2p:user:alice"), now())
    }

    #[test]
    fn add_memory_records_user_provenance() {
        let (next, memory) = add_memory(
            &profile(),
            NewMemory::new("Senior Software Engineer specializing in Rust")
                .category("a2p:professional")
                .tags(["career"]),
            now(),
        )
        .unwrap();

        assert_eq!(next.memories, vec![memory.clone()]);
        assert_eq!(next.version, 0);
        assert_eq!(memory.category.as_deref(), Some("a2p:professional"));
        assert_eq!(memory.source.kind, SourceKind::UserManual);
        assert!(memory.source.agent_did.is_none());
        assert_eq!(memory.status, MemoryStatus::Approved);
        assert_eq!(memory.memory_type, MemoryType::Semantic);
        assert_eq!(memory.confidence, 1.0);
        assert_eq!(memory.sensitivity, SensitivityLevel::Standard);
        assert_eq!(memory.tags, vec!["career"]);
        assert_eq!(memory.created, now());
        assert!(memory.id.as_str().starts_with("mem_"));
    }

    #[test]
    fn sensitivity_and_type_are_kept() {
        let (_, memory) = add_memory(
            &profile(),
            NewMemory::new("Allergic to peanuts")
                .category("a2p:health.allergies")
                .sensitivity(SensitivityLevel::Restricted)
                .memory_type(MemoryType::Episodic),
            now(),
        )
        .unwrap();
        assert_eq!(memory.sensitivity, SensitivityLevel::Restricted);
        assert_eq!(memory.memory_type, MemoryType::Episodic);
    }

    #[test]
    fn blank_content_or_category_is_rejected() {
        assert!(matches!(
            add_memory(&profile(), NewMemory::new("  "), now()),
            Err(ProposalError::InvalidMemory(_))
        ));
        assert!(matches!(
            add_memory(&profile(), NewMemory::new("Likes jazz").category(""), now()),
            Err(ProposalError::InvalidMemory(_))
        ));
    }
}
