//! # a2p-types
//!
//! Persisted shapes for the a2p consent and proposal engine.
//!
//! Every type here is part of the interoperability contract between a user's
//! storage and any agent's client: struct fields serialize in `camelCase`,
//! enum values in `snake_case`, and the spellings must not drift.
//!
//! ## Contents
//!
//! - [`Profile`]: the user's record snapshot, carrying its revision marker
//! - [`ConsentPolicy`] / [`PolicyConditions`]: user-authored access rules
//! - [`ConsentReceipt`]: proof that a grant occurred
//! - [`Proposal`]: an agent's candidate fact and its resolution
//! - [`MemoryEntry`]: a fact in the record
//! - [`PermissionLevel`]: the ordered capability ranks
//! - [`Clock`]: injected time source for callers outside the pure core

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod clock;
pub mod ids;
pub mod memory;
pub mod permission;
pub mod policy;
pub mod profile;
pub mod proposal;
pub mod receipt;

pub use clock::{Clock, FixedClock, SystemClock};
pub use ids::{Did, MemoryId, PolicyId, ProposalId, ReceiptId};
pub use memory::{
    MemoryEntry, MemoryEntryBuilder, MemorySource, MemoryStatus, MemoryType, SensitivityLevel,
    SourceKind,
};
pub use permission::{effective_level, has_permission, ParsePermissionError, PermissionLevel};
pub use policy::{ConsentPolicy, PolicyConditions};
pub use profile::{Profile, ProfileType, SubProfile};
pub use proposal::{
    Evidence, Proposal, ProposalPriority, ProposalResolution, ProposalStatus, ProposedBy,
    ProposedMemory, ResolutionAction,
};
pub use receipt::{ConsentMethod, ConsentReceipt, LegalBasis};
