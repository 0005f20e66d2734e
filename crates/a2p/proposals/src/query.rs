use a2p_types::{Did, Profile, Proposal, ProposalStatus};
use serde::{Deserialize, Serialize};

/// Criteria for listing proposals. Unset fields match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalFilter {
    #[serde(default)]
    pub status: Option<ProposalStatus>,
    #[serde(default)]
    pub agent_did: Option<Did>,
    /// Prefix on the proposed category.
    #[serde(default)]
    pub category: Option<String>,
}

impl ProposalFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: ProposalStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_agent(mut self, agent: Did) -> Self {
        self.agent_did = Some(agent);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// True when every set criterion holds.
    pub fn matches(&self, proposal: &Proposal) -> bool {
        if let Some(status) = self.status {
            if proposal.status != status {
                return false;
            }
        }
        if let Some(agent) = &self.agent_did {
            if &proposal.proposed_by.agent_did != agent {
                return false;
            }
        }
        if let Some(prefix) = &self.category {
            match &proposal.memory.category {
                Some(category) if category.starts_with(prefix.as_str()) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Proposals matching `filter`, in submission order.
pub fn list<'a>(profile: &'a Profile, filter: &ProposalFilter) -> Vec<&'a Proposal> {
    profile
        .proposals
        .iter()
        .filter(|p| filter.matches(p))
        .collect()
}

/// Pending proposals, highest priority first, then oldest first.
pub fn pending(profile: &Profile) -> Vec<&Proposal> {
    let mut pending = list(profile, &ProposalFilter::new().with_status(ProposalStatus::Pending));
    pending.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.proposed_at.cmp(&b.proposed_at))
    });
    pending
}

/// Every proposal submitted by `agent`, in submission order.
pub fn proposals_by_agent<'a>(profile: &'a Profile, agent: &Did) -> Vec<&'a Proposal> {
    list(profile, &ProposalFilter::new().with_agent(agent.clone()))
}
