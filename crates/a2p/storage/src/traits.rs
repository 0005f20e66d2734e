use a2p_types::{Did, Profile};
use async_trait::async_trait;

use crate::error::StorageResult;

/// Persistent home for profile snapshots.
///
/// Writes are compare-and-swap on `Profile::version`: a save names the
/// version it was derived from and fails with `Conflict` if another writer
/// got there first. Implementations never retry.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Store a new profile at version 1.
    async fn create_profile(&self, profile: Profile) -> StorageResult<Profile>;

    async fn load_profile(&self, user: &Did) -> StorageResult<Profile>;

    /// Replace the stored snapshot if it is still at `expected_version`.
    ///
    /// Returns the version now stored, `expected_version + 1`.
    async fn save_profile(&self, profile: Profile, expected_version: u64) -> StorageResult<u64>;

    async fn delete_profile(&self, user: &Did) -> StorageResult<()>;

    async fn list_profiles(&self) -> StorageResult<Vec<Did>>;
}
