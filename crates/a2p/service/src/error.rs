use a2p_consent::ConsentError;
use a2p_policy::PolicyError;
use a2p_proposals::ProposalError;
use a2p_storage::StorageError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Consent(#[from] ConsentError),

    #[error(transparent)]
    Proposal(#[from] ProposalError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// A concurrent writer saved first; reloading and retrying may succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Storage(err) if err.is_conflict())
    }
}
