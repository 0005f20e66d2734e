//! a2p Policy - consent policy resolution
//!
//! Given the policies a user has authored and an agent's request, decides
//! which scopes the agent may read and with what permissions. Evaluation is
//! pure and never fails: unknown agents simply get nothing.
//!
//! The first active matching policy in ascending priority order governs the
//! whole request; lower-ranked policies are not consulted even when the
//! winner allows nothing.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod authoring;
pub mod builder;
pub mod conditions;
pub mod error;
pub mod evaluator;
pub mod view;

pub use authoring::{
    add_policy, add_sub_profile, merge_permissions, remove_policy, set_policy_enabled,
    update_policy,
};
pub use builder::{default_policies, validate, PolicyBuilder, DEFAULT_PRIORITY};
pub use conditions::{condition_kinds, conditions_hold, ConditionKind, RequesterMetadata};
pub use error::{PolicyError, PolicyResult};
pub use evaluator::{evaluate, matching_policies, policy_matches, AccessDecision};
pub use view::{is_visible, project, ScopedView};

// Convenience re-exports so callers rarely need a2p-types directly.
pub use a2p_types::{effective_level, has_permission, PermissionLevel};
