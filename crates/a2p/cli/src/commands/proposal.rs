//! Proposal commands

use a2p_proposals::{list, NewProposal, ProposalEdits, ProposalFilter};
use a2p_types::{Did, MemoryType, ProposalId, ProposalPriority, ProposalStatus, SensitivityLevel};
use clap::{Subcommand, ValueEnum};
use serde_json::json;

use crate::output::{self, OutputFormat};
use crate::Service;

#[derive(Subcommand)]
pub enum ProposalCommands {
    /// Submit a memory proposal on an agent's behalf
    Submit {
        /// User DID
        user: Did,

        /// Proposing agent DID
        #[arg(short, long)]
        agent: Did,

        /// Proposed memory content
        content: String,

        /// Target category, e.g. a2p:preferences.food
        #[arg(short, long)]
        category: Option<String>,

        /// Agent confidence (0.0 - 1.0)
        #[arg(long)]
        confidence: Option<f64>,

        #[arg(long, value_enum)]
        memory_type: Option<MemoryTypeArg>,

        #[arg(long, value_enum)]
        sensitivity: Option<SensitivityArg>,

        #[arg(long, value_enum)]
        priority: Option<PriorityArg>,

        /// Session the proposal came from
        #[arg(long)]
        session: Option<String>,

        /// Conversation context supporting the proposal
        #[arg(long)]
        context: Option<String>,
    },

    /// List proposals
    List {
        /// User DID
        user: Did,

        #[arg(short, long, value_enum)]
        status: Option<StatusArg>,

        #[arg(short, long)]
        agent: Option<Did>,

        /// Category prefix
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Pending proposals, highest priority first
    Pending {
        /// User DID
        user: Did,
    },

    /// Approve a pending proposal, optionally with edits
    Approve {
        user: Did,
        proposal_id: ProposalId,

        /// Replacement content
        #[arg(long)]
        content: Option<String>,

        /// Replacement category
        #[arg(long)]
        category: Option<String>,
    },

    /// Reject a pending proposal
    Reject {
        user: Did,
        proposal_id: ProposalId,

        #[arg(short, long)]
        reason: Option<String>,
    },

    /// Withdraw a pending proposal
    Withdraw {
        user: Did,
        proposal_id: ProposalId,
    },

    /// Expire pending proposals past their deadline
    Sweep {
        /// User DID
        user: Did,
    },

    /// Drop resolved proposals past the retention window
    Cleanup {
        /// User DID
        user: Did,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Pending,
    Approved,
    Rejected,
    Withdrawn,
    Expired,
}

impl From<StatusArg> for ProposalStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => ProposalStatus::Pending,
            StatusArg::Approved => ProposalStatus::Approved,
            StatusArg::Rejected => ProposalStatus::Rejected,
            StatusArg::Withdrawn => ProposalStatus::Withdrawn,
            StatusArg::Expired => ProposalStatus::Expired,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MemoryTypeArg {
    Episodic,
    Semantic,
    Procedural,
}

impl From<MemoryTypeArg> for MemoryType {
    fn from(arg: MemoryTypeArg) -> Self {
        match arg {
            MemoryTypeArg::Episodic => MemoryType::Episodic,
            MemoryTypeArg::Semantic => MemoryType::Semantic,
            MemoryTypeArg::Procedural => MemoryType::Procedural,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SensitivityArg {
    Public,
    Standard,
    Sensitive,
    Restricted,
}

impl From<SensitivityArg> for SensitivityLevel {
    fn from(arg: SensitivityArg) -> Self {
        match arg {
            SensitivityArg::Public => SensitivityLevel::Public,
            SensitivityArg::Standard => SensitivityLevel::Standard,
            SensitivityArg::Sensitive => SensitivityLevel::Sensitive,
            SensitivityArg::Restricted => SensitivityLevel::Restricted,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PriorityArg {
    Low,
    Normal,
    High,
}

impl From<PriorityArg> for ProposalPriority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => ProposalPriority::Low,
            PriorityArg::Normal => ProposalPriority::Normal,
            PriorityArg::High => ProposalPriority::High,
        }
    }
}

pub async fn execute(
    command: ProposalCommands,
    service: &Service,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        ProposalCommands::Submit {
            user,
            agent,
            content,
            category,
            confidence,
            memory_type,
            sensitivity,
            priority,
            session,
            context,
        } => {
            let mut new = NewProposal::new(agent, content);
            if let Some(category) = category {
                new = new.category(category);
            }
            if let Some(confidence) = confidence {
                new = new.confidence(confidence);
            }
            if let Some(memory_type) = memory_type {
                new = new.memory_type(memory_type.into());
            }
            if let Some(sensitivity) = sensitivity {
                new = new.sensitivity(sensitivity.into());
            }
            if let Some(priority) = priority {
                new = new.priority(priority.into());
            }
            if let Some(session) = session {
                new = new.session(session);
            }
            if let Some(context) = context {
                new = new.context(context);
            }
            let submission = service.propose(&user, new).await?;
            output::print(&submission, format)
        }
        ProposalCommands::List {
            user,
            status,
            agent,
            category,
        } => {
            let mut filter = ProposalFilter::new();
            if let Some(status) = status {
                filter = filter.with_status(status.into());
            }
            if let Some(agent) = agent {
                filter = filter.with_agent(agent);
            }
            if let Some(category) = category {
                filter = filter.with_category(category);
            }
            let profile = service.profile(&user).await?;
            output::print(&list(&profile, &filter), format)
        }
        ProposalCommands::Pending { user } => {
            let pending = service.pending_proposals(&user).await?;
            output::print(&pending, format)
        }
        ProposalCommands::Approve {
            user,
            proposal_id,
            content,
            category,
        } => {
            let edits = ProposalEdits {
                edited_content: content,
                edited_category: category,
            };
            let edits = (!edits.is_empty()).then_some(edits);
            let memory = service.approve(&user, &proposal_id, edits).await?;
            output::print(&memory, format)
        }
        ProposalCommands::Reject {
            user,
            proposal_id,
            reason,
        } => {
            let profile = service.reject(&user, &proposal_id, reason).await?;
            output::print(&profile.proposal(&proposal_id), format)
        }
        ProposalCommands::Withdraw { user, proposal_id } => {
            let profile = service.withdraw(&user, &proposal_id).await?;
            output::print(&profile.proposal(&proposal_id), format)
        }
        ProposalCommands::Sweep { user } => {
            let expired = service.sweep_expired(&user).await?;
            output::print(&json!({ "expired": expired }), format)
        }
        ProposalCommands::Cleanup { user } => {
            let removed = service.cleanup_resolved(&user).await?;
            output::print(&json!({ "removed": removed }), format)
        }
    }
}
