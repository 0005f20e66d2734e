//! a2p Service - orchestration over a profile store
//!
//! Wires the pure policy, consent and proposal crates to a
//! [`a2p_storage::ProfileStore`]: every operation is one load, one
//! transition and at most one compare-and-swap save. Logging of state
//! changes happens here, not in the core crates.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod cache;
pub mod config;
pub mod error;
pub mod retry;
pub mod service;

pub use cache::ContextCache;
pub use config::{A2pConfig, CacheConfig, RetentionConfig, StorageConfig, TelemetryConfig};
pub use error::{ServiceError, ServiceResult};
pub use retry::retry_on_conflict;
pub use service::{AccessOutcome, AccessRequest, ProfileService, Submission};
