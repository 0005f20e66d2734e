//! a2p Proposals - agent-submitted memory proposals
//!
//! Agents never write to a profile directly. They propose a fact, and the
//! user approves (optionally editing), rejects, or lets it expire; the agent
//! may withdraw it while it is still pending. Only `pending` has outgoing
//! transitions.
//!
//! The user may also record memories directly with [`add_memory`].
//!
//! All operations are pure functions over a [`a2p_types::Profile`] snapshot.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod maintenance;
pub mod memories;
pub mod query;
pub mod similarity;

pub use config::ProposalConfig;
pub use error::{ProposalError, ProposalResult};
pub use lifecycle::{approve, create, reject, submit, withdraw, Approval, NewProposal, ProposalEdits};
pub use maintenance::{cleanup_resolved, sweep_expired, Cleanup, Sweep};
pub use memories::{add_memory, NewMemory};
pub use query::{list, pending, proposals_by_agent, ProposalFilter};
pub use similarity::{find_similar, significant_words, SimilarMatch};
