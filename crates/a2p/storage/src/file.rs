use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use a2p_types::{Did, Profile};
use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::traits::ProfileStore;

/// One JSON document per profile in a directory.
///
/// Writes go to a temporary file that is renamed over the target, so a
/// reader sees either the old or the new snapshot. The write lock only
/// serializes writers within this process.
pub struct FileProfileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileProfileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, user: &Did) -> PathBuf {
        self.root.join(format!("{}.json", file_stem(user)))
    }

    async fn read(&self, path: &Path) -> StorageResult<Option<Profile>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn write(&self, path: &Path, profile: &Profile) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(profile)?;
        let tmp = path.with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4().simple()));
        fs::write(&tmp, &bytes).await?;
        if let Err(err) = fs::rename(&tmp, path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        Ok(())
    }
}

/// Filesystem-safe, collision-free name for a Did.
fn file_stem(user: &Did) -> String {
    let mut stem = String::with_capacity(user.as_str().len());
    for byte in user.as_str().bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'.' => stem.push(byte as char),
            b':' => stem.push('~'),
            other => stem.push_str(&format!("_{other:02X}")),
        }
    }
    stem
}

#[async_trait]
impl ProfileStore for FileProfileStore {
    async fn create_profile(&self, mut profile: Profile) -> StorageResult<Profile> {
        let _guard = self.write_lock.lock().await;
        let path = self.path_for(&profile.id);
        if self.read(&path).await?.is_some() {
            return Err(StorageError::AlreadyExists(profile.id));
        }
        profile.version = 1;
        self.write(&path, &profile).await?;
        debug!(user = %profile.id, path = %path.display(), "profile created");
        Ok(profile)
    }

    async fn load_profile(&self, user: &Did) -> StorageResult<Profile> {
        self.read(&self.path_for(user))
            .await?
            .ok_or_else(|| StorageError::NotFound(user.clone()))
    }

    async fn save_profile(&self, mut profile: Profile, expected_version: u64) -> StorageResult<u64> {
        let _guard = self.write_lock.lock().await;
        let path = self.path_for(&profile.id);
        let stored = self
            .read(&path)
            .await?
            .ok_or_else(|| StorageError::NotFound(profile.id.clone()))?;
        if stored.version != expected_version {
            return Err(StorageError::Conflict {
                expected: expected_version,
                found: stored.version,
            });
        }
        let next = expected_version + 1;
        profile.version = next;
        self.write(&path, &profile).await?;
        Ok(next)
    }

    async fn delete_profile(&self, user: &Did) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(self.path_for(user)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(user.clone())),
            Err(err) => Err(err.into()),
        }
    }

    async fn list_profiles(&self) -> StorageResult<Vec<Did>> {
        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(profile) = self.read(&path).await? {
                ids.push(profile.id);
            }
        }
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

    #[test]
    fn file_stems_are_distinct() {
        assert_eq!(file_stem(&Did::new("did:a2p:user:alice")), "did~a2p~user~alice");
        assert_ne!(
            file_stem(&Did::new("did:a/b")),
            file_stem(&Did::new("did:a_b"))
        );
        assert_eq!(file_stem(&Did::new("a/b")), "a_2Fb");
    }

    #[tokio::test]
    async fn persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProfileStore::open(dir.path()).await.unwrap();
        let created = store.create_profile(profile("did:a2p:user:alice")).await.unwrap();
        store
            .save_profile(created.clone().with_display_name("Alice"), 1)
            .await
            .unwrap();

        let reopened = FileProfileStore::open(dir.path()).await.unwrap();
        let loaded = reopened.load_profile(&created.id).await.unwrap();
        assert_eq!(loaded.version, 2);
        assert_eq!(loaded.display_name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn conflict_and_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProfileStore::open(dir.path()).await.unwrap();
        let created = store.create_profile(profile("did:u")).await.unwrap();
        assert!(matches!(
            store.create_profile(profile("did:u")).await,
            Err(StorageError::AlreadyExists(_))
        ));

        store.save_profile(created.clone(), 1).await.unwrap();
        let err = store.save_profile(created, 1).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict { expected: 1, found: 2 }));
    }

    #[tokio::test]
    async fn list_ignores_stray_files_and_delete_removes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProfileStore::open(dir.path()).await.unwrap();
        store.create_profile(profile("did:b")).await.unwrap();
        store.create_profile(profile("did:a")).await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        assert_eq!(
            store.list_profiles().await.unwrap(),
            vec![Did::new("did:a"), Did::new("did:b")]
        );

        store.delete_profile(&Did::new("did:a")).await.unwrap();
        assert!(matches!(
            store.load_profile(&Did::new("did:a")).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_profile(&Did::new("did:a")).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn corrupt_document_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProfileStore::open(dir.path()).await.unwrap();
        std::fs::write(dir.path().join("did~broken.json"), "{ not json").unwrap();
        assert!(matches!(
            store.load_profile(&Did::new("did:broken")).await,
            Err(StorageError::Serialization(_))
        ));
    }
}
