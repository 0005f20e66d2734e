//! Load/transform/save orchestration.
//!
//! Each mutating call loads the user's snapshot, applies one pure
//! transition, and saves with the loaded version as the expected version.
//! A concurrent writer surfaces as a conflict error; wrap the call in
//! [`crate::retry_on_conflict`] to retry it.

use a2p_consent::{active_receipts, issue, record_receipt, revoke_receipt, IssueRequest};
use a2p_policy::{
    add_policy, add_sub_profile, default_policies, evaluate, project, remove_policy,
    set_policy_enabled, AccessDecision, RequesterMetadata, ScopedView,
};
use a2p_proposals::{
    add_memory, approve, cleanup_resolved, create, find_similar, pending, reject, submit,
    sweep_expired, withdraw, NewMemory, NewProposal, ProposalEdits, SimilarMatch,
};
use a2p_storage::ProfileStore;
use a2p_types::{
    Clock, ConsentPolicy, ConsentReceipt, Did, LegalBasis, MemoryEntry, PolicyId, Profile,
    Proposal, ProposalId, ReceiptId, SubProfile, SystemClock,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::A2pConfig;
use crate::error::ServiceResult;

/// An agent asking to read part of a profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequest {
    pub agent_did: Did,
    pub scopes: Vec<String>,
    #[serde(default)]
    pub metadata: Option<RequesterMetadata>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub legal_basis: Option<LegalBasis>,
}

impl AccessRequest {
    pub fn new(agent_did: Did, scopes: Vec<String>) -> Self {
        Self {
            agent_did,
            scopes,
            metadata: None,
            purpose: None,
            legal_basis: None,
        }
    }

    pub fn with_metadata(mut self, metadata: RequesterMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }
}

/// Decision, proof and data returned for an access request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessOutcome {
    pub decision: AccessDecision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<ConsentReceipt>,
    pub view: ScopedView,
}

/// A submitted proposal with any near-duplicates already on record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub proposal: Proposal,
    pub similar: Vec<SimilarMatch>,
}

pub struct ProfileService<S, C = SystemClock> {
    store: S,
    clock: C,
    config: A2pConfig,
}

impl<S: ProfileStore> ProfileService<S, SystemClock> {
    pub fn new(store: S, config: A2pConfig) -> Self {
        Self::with_clock(store, SystemClock, config)
    }
}

impl<S: ProfileStore, C: Clock> ProfileService<S, C> {
    /// Service reading time from `clock` instead of the system.
    pub fn with_clock(store: S, clock: C, config: A2pConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &A2pConfig {
        &self.config
    }

    /// Load, transform, save. Unchanged snapshots are not written.
    async fn mutate<T, F>(&self, user: &Did, transform: F) -> ServiceResult<(Profile, T)>
    where
        F: FnOnce(&Profile) -> ServiceResult<(Profile, T)>,
    {
        let loaded = self.store.load_profile(user).await?;
        let (mut next, value) = transform(&loaded)?;
        if next == loaded {
            return Ok((loaded, value));
        }
        match self.store.save_profile(next.clone(), loaded.version).await {
            Ok(version) => {
                next.version = version;
                Ok((next, value))
            }
            Err(err) => {
                if err.is_conflict() {
                    warn!(user = %user, error = %err, "profile changed concurrently");
                }
                Err(err.into())
            }
        }
    }

    /// Create a fresh profile, optionally seeded with the default policies.
    pub async fn create_profile(
        &self,
        user: Did,
        display_name: Option<String>,
        with_default_policies: bool,
    ) -> ServiceResult<Profile> {
        let now = self.clock.now();
        let mut profile = Profile::new(user, now);
        profile.display_name = display_name;
        if with_default_policies {
            profile.access_policies = default_policies(now);
        }
        let created = self.store.create_profile(profile).await?;
        info!(user = %created.id, policies = created.access_policies.len(), "profile created");
        Ok(created)
    }

    /// Current snapshot of `user`'s profile.
    pub async fn profile(&self, user: &Did) -> ServiceResult<Profile> {
        Ok(self.store.load_profile(user).await?)
    }

    /// Record a memory the user states directly.
    pub async fn add_memory(&self, user: &Did, new: NewMemory) -> ServiceResult<MemoryEntry> {
        let now = self.clock.now();
        let (_, memory) = self
            .mutate(user, |profile| Ok(add_memory(profile, new, now)?))
            .await?;
        info!(user = %user, memory = %memory.id, category = ?memory.category, "memory added");
        Ok(memory)
    }

    /// Register a sub-profile that policies and receipts can be limited to.
    pub async fn add_sub_profile(
        &self,
        user: &Did,
        sub_profile: SubProfile,
    ) -> ServiceResult<Profile> {
        let now = self.clock.now();
        let id = sub_profile.id.clone();
        let (profile, ()) = self
            .mutate(user, |profile| {
                Ok((add_sub_profile(profile, sub_profile, now)?, ()))
            })
            .await?;
        info!(user = %user, sub_profile = %id, "sub-profile added");
        Ok(profile)
    }

    /// Evaluate a request, record a receipt when anything was granted, and
    /// project the readable memories.
    pub async fn evaluate_access(
        &self,
        user: &Did,
        request: AccessRequest,
    ) -> ServiceResult<AccessOutcome> {
        let now = self.clock.now();
        let (profile, (decision, receipt)) = self
            .mutate(user, |profile| {
                let decision = evaluate(
                    &profile.access_policies,
                    &request.agent_did,
                    &request.scopes,
                    request.metadata.as_ref(),
                    now,
                );
                if !decision.granted {
                    return Ok((profile.clone(), (decision, None)));
                }

                let mut issue_request = IssueRequest::new(profile.id.clone());
                issue_request.operator_did = request
                    .metadata
                    .as_ref()
                    .and_then(|m| m.operator_did.clone());
                issue_request.purpose = request.purpose.clone();
                issue_request.legal_basis = request.legal_basis;

                let receipt = issue(&decision, issue_request, now)?;
                let next = record_receipt(profile, receipt.clone(), now)?;
                Ok((next, (decision, Some(receipt))))
            })
            .await?;

        if let Some(receipt) = &receipt {
            info!(
                user = %user,
                agent = %receipt.agent_did,
                receipt = %receipt.receipt_id,
                scopes = receipt.granted_scopes.len(),
                "access granted"
            );
        } else {
            info!(user = %user, agent = %decision.agent_did, "access denied");
        }

        let view = project(&profile, &decision);
        Ok(AccessOutcome {
            decision,
            receipt,
            view,
        })
    }

    /// Validate and add a policy.
    pub async fn add_policy(&self, user: &Did, policy: ConsentPolicy) -> ServiceResult<Profile> {
        let now = self.clock.now();
        let id = policy.id.clone();
        let (profile, ()) = self
            .mutate(user, |profile| Ok((add_policy(profile, policy, now)?, ())))
            .await?;
        info!(user = %user, policy = %id, "policy added");
        Ok(profile)
    }

    /// Remove a policy and return it.
    pub async fn remove_policy(&self, user: &Did, id: &PolicyId) -> ServiceResult<ConsentPolicy> {
        let now = self.clock.now();
        let (_, removed) = self
            .mutate(user, |profile| Ok(remove_policy(profile, id, now)?))
            .await?;
        info!(user = %user, policy = %id, "policy removed");
        Ok(removed)
    }

    /// Enable or disable a policy in place.
    pub async fn set_policy_enabled(
        &self,
        user: &Did,
        id: &PolicyId,
        enabled: bool,
    ) -> ServiceResult<Profile> {
        let now = self.clock.now();
        let (profile, ()) = self
            .mutate(user, |profile| {
                Ok((set_policy_enabled(profile, id, enabled, now)?, ()))
            })
            .await?;
        info!(user = %user, policy = %id, enabled, "policy toggled");
        Ok(profile)
    }

    /// Submit an agent's proposal, reporting similar existing memories.
    pub async fn propose(&self, user: &Did, new: NewProposal) -> ServiceResult<Submission> {
        let now = self.clock.now();
        let config = &self.config.proposals;
        let (_, submission) = self
            .mutate(user, |profile| {
                let proposal = create(new, config, now)?;
                let similar = find_similar(
                    &profile.memories,
                    &proposal.memory.content,
                    config.similarity_threshold,
                );
                let next = submit(profile, proposal.clone())?;
                Ok((next, Submission { proposal, similar }))
            })
            .await?;
        info!(
            user = %user,
            proposal = %submission.proposal.id,
            agent = %submission.proposal.proposed_by.agent_did,
            similar = submission.similar.len(),
            "proposal submitted"
        );
        Ok(submission)
    }

    /// Approve a pending proposal and return the memory it created.
    pub async fn approve(
        &self,
        user: &Did,
        id: &ProposalId,
        edits: Option<ProposalEdits>,
    ) -> ServiceResult<MemoryEntry> {
        let now = self.clock.now();
        let (_, memory) = self
            .mutate(user, |profile| {
                let approval = approve(profile, id, edits, now)?;
                Ok((approval.profile, approval.memory))
            })
            .await?;
        info!(user = %user, proposal = %id, memory = %memory.id, "proposal approved");
        Ok(memory)
    }

    /// Reject a pending proposal.
    pub async fn reject(
        &self,
        user: &Did,
        id: &ProposalId,
        reason: Option<String>,
    ) -> ServiceResult<Profile> {
        let now = self.clock.now();
        let (profile, ()) = self
            .mutate(user, |profile| Ok((reject(profile, id, reason, now)?, ())))
            .await?;
        info!(user = %user, proposal = %id, "proposal rejected");
        Ok(profile)
    }

    /// Withdraw a pending proposal.
    pub async fn withdraw(&self, user: &Did, id: &ProposalId) -> ServiceResult<Profile> {
        let now = self.clock.now();
        let (profile, ()) = self
            .mutate(user, |profile| Ok((withdraw(profile, id, now)?, ())))
            .await?;
        info!(user = %user, proposal = %id, "proposal withdrawn");
        Ok(profile)
    }

    /// Pending proposals, highest priority first.
    pub async fn pending_proposals(&self, user: &Did) -> ServiceResult<Vec<Proposal>> {
        let profile = self.store.load_profile(user).await?;
        Ok(pending(&profile).into_iter().cloned().collect())
    }

    /// Expire stale pending proposals. Only runs when called.
    pub async fn sweep_expired(&self, user: &Did) -> ServiceResult<Vec<ProposalId>> {
        let now = self.clock.now();
        let (_, expired) = self
            .mutate(user, |profile| {
                let sweep = sweep_expired(profile, now);
                Ok((sweep.profile, sweep.expired))
            })
            .await?;
        if !expired.is_empty() {
            info!(user = %user, count = expired.len(), "proposals expired");
        }
        Ok(expired)
    }

    /// Drop resolved proposals past the configured retention.
    pub async fn cleanup_resolved(&self, user: &Did) -> ServiceResult<usize> {
        let now = self.clock.now();
        let keep_days = self.config.retention.keep_resolved_days;
        let (_, removed) = self
            .mutate(user, |profile| {
                let cleanup = cleanup_resolved(profile, keep_days, now);
                Ok((cleanup.profile, cleanup.removed))
            })
            .await?;
        if removed > 0 {
            info!(user = %user, removed, "resolved proposals cleaned up");
        }
        Ok(removed)
    }

    /// Revoke a stored receipt.
    pub async fn revoke_receipt(
        &self,
        user: &Did,
        id: &ReceiptId,
        reason: Option<String>,
    ) -> ServiceResult<ConsentReceipt> {
        let now = self.clock.now();
        let (_, revoked) = self
            .mutate(user, |profile| Ok(revoke_receipt(profile, id, reason, now)?))
            .await?;
        info!(user = %user, receipt = %id, "receipt revoked");
        Ok(revoked)
    }

    /// Receipts that are still valid now.
    pub async fn active_receipts(
        &self,
        user: &Did,
        agent: Option<&Did>,
    ) -> ServiceResult<Vec<ConsentReceipt>> {
        let profile = self.store.load_profile(user).await?;
        let now = self.clock.now();
        Ok(active_receipts(&profile, agent, now)
            .into_iter()
            .cloned()
            .collect())
    }
}
