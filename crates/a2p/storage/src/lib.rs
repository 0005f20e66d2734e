//! Profile storage for a2p.
//!
//! Stores whole profile snapshots and enforces optimistic concurrency on
//! their `version` field. The consent and proposal crates never touch
//! storage; callers load, transform, and save.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use file::FileProfileStore;
pub use memory::InMemoryProfileStore;
pub use traits::ProfileStore;
