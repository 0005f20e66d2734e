use a2p_types::PolicyId;

/// Errors from authoring policies on a profile.
///
/// Evaluation itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("Policy not found: {0}")]
    PolicyNotFound(PolicyId),

    #[error("Policy already exists: {0}")]
    DuplicatePolicy(PolicyId),

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Sub-profile already exists: {0}")]
    DuplicateSubProfile(String),

    #[error("Invalid sub-profile: {0}")]
    InvalidSubProfile(String),
}

pub type PolicyResult<T> = Result<T, PolicyError>;
