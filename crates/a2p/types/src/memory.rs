use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{Did, MemoryId, ProposalId};
use crate::permission::PermissionLevel;

/// Kind of memory an entry holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    #[default]
    Episodic,
    Semantic,
    Procedural,
}

/// How carefully an entry must be guarded when projected to an agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityLevel {
    Public,
    #[default]
    Standard,
    Sensitive,
    Restricted,
}

impl SensitivityLevel {
    /// Minimum permission an agent must hold to read an entry at this level.
    pub fn required_permission(self) -> PermissionLevel {
        match self {
            SensitivityLevel::Public => PermissionLevel::ReadPublic,
            SensitivityLevel::Standard => PermissionLevel::ReadScoped,
            SensitivityLevel::Sensitive | SensitivityLevel::Restricted => {
                PermissionLevel::ReadFull
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryStatus {
    #[default]
    Approved,
    Pending,
    Archived,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    UserManual,
    AgentProposal,
    Import,
}

/// Provenance of a memory entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySource {
    pub kind: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_did: Option<Did>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal_id: Option<ProposalId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl MemorySource {
    pub fn user_manual(timestamp: DateTime<Utc>) -> Self {
        Self {
            kind: SourceKind::UserManual,
            agent_did: None,
            session_id: None,
            proposal_id: None,
            context: None,
            timestamp,
        }
    }
}

/// One fact in a user's profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryEntry {
    pub id: MemoryId,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub memory_type: MemoryType,
    pub confidence: f64,
    #[serde(default)]
    pub sensitivity: SensitivityLevel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: MemoryStatus,
    pub source: MemorySource,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl MemoryEntry {
    pub fn builder(content: impl Into<String>, source: MemorySource) -> MemoryEntryBuilder {
        MemoryEntryBuilder {
            id: None,
            content: content.into(),
            category: None,
            memory_type: MemoryType::default(),
            confidence: 1.0,
            sensitivity: SensitivityLevel::default(),
            scope: Vec::new(),
            tags: Vec::new(),
            status: MemoryStatus::Approved,
            source,
        }
    }
}

pub struct MemoryEntryBuilder {
    id: Option<MemoryId>,
    content: String,
    category: Option<String>,
    memory_type: MemoryType,
    confidence: f64,
    sensitivity: SensitivityLevel,
    scope: Vec<String>,
    tags: Vec<String>,
    status: MemoryStatus,
    source: MemorySource,
}

impl MemoryEntryBuilder {
    pub fn id(mut self, id: MemoryId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn memory_type(mut self, memory_type: MemoryType) -> Self {
        self.memory_type = memory_type;
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn sensitivity(mut self, sensitivity: SensitivityLevel) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub fn scope(mut self, scope: Vec<String>) -> Self {
        self.scope = scope;
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn status(mut self, status: MemoryStatus) -> Self {
        self.status = status;
        self
    }

    /// Timestamps are taken from the source so provenance and entry agree.
    pub fn build(self) -> MemoryEntry {
        let at = self.source.timestamp;
        MemoryEntry {
            id: self.id.unwrap_or_else(MemoryId::generate),
            content: self.content,
            category: self.category,
            memory_type: self.memory_type,
            confidence: self.confidence,
            sensitivity: self.sensitivity,
            scope: self.scope,
            tags: self.tags,
            status: self.status,
            source: self.source,
            created: at,
            updated: at,
        }
    }
}
