use a2p_types::{ProposalId, ProposalStatus};

#[derive(Debug, thiserror::Error)]
pub enum ProposalError {
    #[error("Proposal not found: {0}")]
    ProposalNotFound(ProposalId),

    #[error("Proposal {id} is {current}, not pending")]
    InvalidState {
        id: ProposalId,
        current: ProposalStatus,
    },

    #[error("Invalid proposal: {0}")]
    InvalidProposal(String),

    #[error("Invalid memory: {0}")]
    InvalidMemory(String),

    #[error("Proposal already submitted: {0}")]
    DuplicateProposal(ProposalId),
}

pub type ProposalResult<T> = Result<T, ProposalError>;
