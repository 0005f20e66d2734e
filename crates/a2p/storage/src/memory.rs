use std::collections::HashMap;
use std::sync::RwLock;

use a2p_types::{Did, Profile};
use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};
use crate::traits::ProfileStore;

/// In-memory implementation of [`ProfileStore`].
#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<Did, Profile>>,
}

impl InMemoryProfileStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Backend("profiles lock poisoned".to_string())
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn create_profile(&self, mut profile: Profile) -> StorageResult<Profile> {
        let mut guard = self.profiles.write().map_err(poisoned)?;
        if guard.contains_key(&profile.id) {
            return Err(StorageError::AlreadyExists(profile.id));
        }
        profile.version = 1;
        guard.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    async fn load_profile(&self, user: &Did) -> StorageResult<Profile> {
        let guard = self.profiles.read().map_err(poisoned)?;
        guard
            .get(user)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(user.clone()))
    }

    async fn save_profile(&self, mut profile: Profile, expected_version: u64) -> StorageResult<u64> {
        let mut guard = self.profiles.write().map_err(poisoned)?;
        let stored = guard
            .get(&profile.id)
            .ok_or_else(|| StorageError::NotFound(profile.id.clone()))?;
        if stored.version != expected_version {
            return Err(StorageError::Conflict {
                expected: expected_version,
                found: stored.version,
            });
        }
        let next = expected_version + 1;
        profile.version = next;
        guard.insert(profile.id.clone(), profile);
        Ok(next)
    }

    async fn delete_profile(&self, user: &Did) -> StorageResult<()> {
        let mut guard = self.profiles.write().map_err(poisoned)?;
        guard
            .remove(user)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(user.clone()))
    }

    async fn list_profiles(&self) -> StorageResult<Vec<Did>> {
        let guard = self.profiles.read().map_err(poisoned)?;
        let mut ids: Vec<Did> = guard.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile(id: &str) -> Profile {
        Profile::new(Did::new(id), Utc::now())
    }

    #[tokio::test]
    async fn create_load_roundtrip() {
        let store = InMemoryProfileStore::new();
        let created = store.create_profile(profile("did:a2p:user:alice")).await.unwrap();
        assert_eq!(created.version, 1);

        let loaded = store.load_profile(&Did::new("did:a2p:user:alice")).await.unwrap();
        assert_eq!(loaded, created);

        let dup = store.create_profile(profile("did:a2p:user:alice")).await;
        assert!(matches!(dup, Err(StorageError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn save_advances_version() {
        let store = InMemoryProfileStore::new();
        let created = store.create_profile(profile("did:u")).await.unwrap();

        let edited = created.clone().with_display_name("Alice");
        let version = store.save_profile(edited, created.version).await.unwrap();
        assert_eq!(version, 2);

        let loaded = store.load_profile(&created.id).await.unwrap();
        assert_eq!(loaded.version, 2);
        assert_eq!(loaded.display_name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn stale_save_conflicts() {
        let store = InMemoryProfileStore::new();
        let created = store.create_profile(profile("did:u")).await.unwrap();

        let first = created.clone().with_display_name("first");
        let second = created.clone().with_display_name("second");
        store.save_profile(first, created.version).await.unwrap();

        let err = store.save_profile(second, created.version).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict { expected: 1, found: 2 }));
        assert!(err.is_conflict());

        let loaded = store.load_profile(&created.id).await.unwrap();
        assert_eq!(loaded.display_name.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn missing_profiles() {
        let store = InMemoryProfileStore::new();
        let ghost = Did::new("did:ghost");
        assert!(matches!(
            store.load_profile(&ghost).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.save_profile(profile("did:ghost"), 1).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_profile(&ghost).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_and_delete() {
        let store = InMemoryProfileStore::new();
        store.create_profile(profile("did:b")).await.unwrap();
        store.create_profile(profile("did:a")).await.unwrap();
        assert_eq!(
            store.list_profiles().await.unwrap(),
            vec![Did::new("did:a"), Did::new("did:b")]
        );
        store.delete_profile(&Did::new("did:a")).await.unwrap();
        assert_eq!(store.list_profiles().await.unwrap(), vec![Did::new("did:b")]);
    }
}
