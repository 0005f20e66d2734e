//! Proposal creation and the pending → terminal transitions.
//!
//! Every transition takes a profile snapshot and returns a new one. The
//! proposal's submitted `memory` is never rewritten; edits live on the
//! resolution and the created entry.

use a2p_types::{
    Did, Evidence, MemoryEntry, MemorySource, MemoryStatus, MemoryType, Profile,
    Proposal, ProposalId, ProposalPriority, ProposalResolution, ProposalStatus, ProposedBy,
    ProposedMemory, ResolutionAction, SensitivityLevel, SourceKind,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProposalConfig;
use crate::error::{ProposalError, ProposalResult};

/// What an agent submits. Unset fields take configured defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProposal {
    pub agent_did: Did,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub memory_type: Option<MemoryType>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub suggested_sensitivity: Option<SensitivityLevel>,
    #[serde(default)]
    pub suggested_scope: Option<Vec<String>>,
    #[serde(default)]
    pub suggested_tags: Option<Vec<String>>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub evidence: Option<Vec<Evidence>>,
    #[serde(default)]
    pub priority: Option<ProposalPriority>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewProposal {
    pub fn new(agent_did: Did, content: impl Into<String>) -> Self {
        Self {
            agent_did,
            agent_name: None,
            session_id: None,
            content: content.into(),
            category: None,
            memory_type: None,
            confidence: None,
            suggested_sensitivity: None,
            suggested_scope: None,
            suggested_tags: None,
            context: None,
            evidence: None,
            priority: None,
            expires_at: None,
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn memory_type(mut self, memory_type: MemoryType) -> Self {
        self.memory_type = Some(memory_type);
        self
    }

    pub fn session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn sensitivity(mut self, sensitivity: SensitivityLevel) -> Self {
        self.suggested_sensitivity = Some(sensitivity);
        self
    }

    pub fn priority(mut self, priority: ProposalPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

/// User edits applied when approving.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalEdits {
    #[serde(default)]
    pub edited_content: Option<String>,
    #[serde(default)]
    pub edited_category: Option<String>,
}

impl ProposalEdits {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            edited_content: Some(content.into()),
            edited_category: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.edited_content.is_none() && self.edited_category.is_none()
    }
}

/// Result of an approval: the new snapshot and the entry it gained.
#[derive(Clone, Debug, PartialEq)]
pub struct Approval {
    pub profile: Profile,
    pub memory: MemoryEntry,
}

/// Build a pending proposal from an agent's submission.
pub fn create(
    new: NewProposal,
    config: &ProposalConfig,
    now: DateTime<Utc>,
) -> ProposalResult<Proposal> {
    if new.content.trim().is_empty() {
        return Err(ProposalError::InvalidProposal("content is empty".into()));
    }
    let confidence = new.confidence.unwrap_or(config.default_confidence);
    if !(0.0..=1.0).contains(&confidence) {
        return Err(ProposalError::InvalidProposal(format!(
            "confidence {confidence} outside [0, 1]"
        )));
    }

    let expires_at = match new.expires_at {
        Some(at) => at,
        None => config
            .default_expiry()
            .and_then(|window| now.checked_add_signed(window))
            .ok_or_else(|| {
                ProposalError::InvalidProposal(format!(
                    "default expiry of {} days overflows the calendar",
                    config.default_expiry_days
                ))
            })?,
    };

    Ok(Proposal {
        id: ProposalId::generate(),
        proposed_by: ProposedBy {
            agent_did: new.agent_did,
            agent_name: new.agent_name,
            session_id: new.session_id,
        },
        proposed_at: now,
        memory: ProposedMemory {
            content: new.content,
            category: new.category,
            memory_type: new.memory_type.unwrap_or_default(),
            confidence,
            suggested_sensitivity: new.suggested_sensitivity,
            suggested_scope: new.suggested_scope,
            suggested_tags: new.suggested_tags,
        },
        context: new.context,
        evidence: new.evidence,
        status: ProposalStatus::Pending,
        expires_at,
        priority: new.priority.unwrap_or_default(),
        resolution: None,
    })
}

/// Append a proposal to the snapshot's inbox.
pub fn submit(profile: &Profile, proposal: Proposal) -> ProposalResult<Profile> {
    if profile.proposal(&proposal.id).is_some() {
        return Err(ProposalError::DuplicateProposal(proposal.id));
    }
    let at = proposal.proposed_at;
    let mut next = profile.clone();
    next.proposals.push(proposal);
    Ok(next.touched(at))
}

/// Locate a pending proposal in `profile` for a transition.
fn pending_index(profile: &Profile, id: &ProposalId) -> ProposalResult<usize> {
    let index = profile
        .proposals
        .iter()
        .position(|p| &p.id == id)
        .ok_or_else(|| ProposalError::ProposalNotFound(id.clone()))?;
    let current = profile.proposals[index].status;
    if current != ProposalStatus::Pending {
        return Err(ProposalError::InvalidState {
            id: id.clone(),
            current,
        });
    }
    Ok(index)
}

/// Stamp a resolution and the terminal status it implies.
pub(crate) fn resolve(proposal: &mut Proposal, resolution: ProposalResolution) {
    proposal.status = resolution.action.status();
    proposal.resolution = Some(resolution);
}

/// Accept a pending proposal, turning it into a memory entry.
pub fn approve(
    profile: &Profile,
    id: &ProposalId,
    edits: Option<ProposalEdits>,
    now: DateTime<Utc>,
) -> ProposalResult<Approval> {
    let index = pending_index(profile, id)?;
    let edits = edits.unwrap_or_default();
    let proposal = &profile.proposals[index];

    let source = MemorySource {
        kind: SourceKind::AgentProposal,
        agent_did: Some(proposal.proposed_by.agent_did.clone()),
        session_id: proposal.proposed_by.session_id.clone(),
        proposal_id: Some(proposal.id.clone()),
        context: proposal.context.clone(),
        timestamp: now,
    };
    let suggested = &proposal.memory;
    let memory = MemoryEntry::builder(
        edits
            .edited_content
            .clone()
            .unwrap_or_else(|| suggested.content.clone()),
        source,
    )
    .category(
        edits
            .edited_category
            .clone()
            .or_else(|| suggested.category.clone()),
    )
    .memory_type(suggested.memory_type)
    .confidence(suggested.confidence)
    .sensitivity(suggested.suggested_sensitivity.unwrap_or_default())
    .scope(suggested.suggested_scope.clone().unwrap_or_default())
    .tags(suggested.suggested_tags.clone().unwrap_or_default())
    .status(MemoryStatus::Approved)
    .build();

    let action = if edits.is_empty() {
        ResolutionAction::Approved
    } else {
        ResolutionAction::ApprovedWithEdits
    };

    let mut next = profile.clone();
    resolve(
        &mut next.proposals[index],
        ProposalResolution {
            resolved_at: now,
            action,
            edited_content: edits.edited_content,
            edited_category: edits.edited_category,
            created_memory_id: Some(memory.id.clone()),
            reason: None,
        },
    );
    next.memories.push(memory.clone());

    debug!(proposal = %id, memory = %memory.id, ?action, "proposal approved");
    Ok(Approval {
        profile: next.touched(now),
        memory,
    })
}

/// Decline a pending proposal.
pub fn reject(
    profile: &Profile,
    id: &ProposalId,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> ProposalResult<Profile> {
    let index = pending_index(profile, id)?;
    let mut next = profile.clone();
    resolve(
        &mut next.proposals[index],
        ProposalResolution {
            resolved_at: now,
            action: ResolutionAction::Rejected,
            edited_content: None,
            edited_category: None,
            created_memory_id: None,
            reason,
        },
    );
    debug!(proposal = %id, "proposal rejected");
    Ok(next.touched(now))
}

/// Retract a pending proposal on the agent's behalf.
pub fn withdraw(profile: &Profile, id: &ProposalId, now: DateTime<Utc>) -> ProposalResult<Profile> {
    let index = pending_index(profile, id)?;
    let mut next = profile.clone();
    resolve(
        &mut next.proposals[index],
        ProposalResolution {
            resolved_at: now,
            action: ResolutionAction::Withdrawn,
            edited_content: None,
            edited_category: None,
            created_memory_id: None,
            reason: None,
        },
    );
    debug!(proposal = %id, "proposal withdrawn");
    Ok(next.touched(now))
}
