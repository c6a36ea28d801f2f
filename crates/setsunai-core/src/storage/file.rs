//! JSON file storage backend
//!
//! Keeps every entry in memory and rewrites `notes.json` in the data directory
//! after each change. Values are already ciphertext or one-way hashes, so the
//! file itself is not encrypted.

use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::entries::Entries;
use super::NoteStore;
use crate::error::{NotesError, Result};
use crate::note::{PinRecord, Post};

const STORE_FILE: &str = "notes.json";
const FILE_VERSION: u32 = 1;

/// File format for persistent storage
#[derive(Debug, Deserialize)]
struct StoreFile {
    version: u32,
    entries: Entries,
}

#[derive(Serialize)]
struct StoreFileRef<'a> {
    version: u32,
    entries: &'a Entries,
}

/// Store persisted to a single JSON file
pub struct FileStore {
    data_dir: PathBuf,
    entries: RwLock<Entries>,
}

impl FileStore {
    /// Open the store in the default data directory
    pub async fn new() -> Result<Self> {
        Self::with_dir(default_data_dir()?).await
    }

    /// Open the store in `data_dir`, loading existing entries
    pub async fn with_dir(data_dir: PathBuf) -> Result<Self> {
        tokio::fs::create_dir_all(&data_dir).await?;

        let path = data_dir.join(STORE_FILE);
        let entries = if path.exists() {
            let contents = tokio::fs::read_to_string(&path).await?;
            let file: StoreFile = serde_json::from_str(&contents)?;
            if file.version != FILE_VERSION {
                return Err(NotesError::StorageError(format!(
                    "Unsupported store version: {}",
                    file.version
                )));
            }
            debug!("Loaded {} entries from {:?}", file.entries.len(), path);
            file.entries
        } else {
            debug!("No existing store file found");
            Entries::default()
        };

        Ok(Self {
            data_dir,
            entries: RwLock::new(entries),
        })
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Write all entries to disk atomically through a temp file
    async fn save(&self, entries: &Entries) -> Result<()> {
        let contents = serde_json::to_string_pretty(&StoreFileRef {
            version: FILE_VERSION,
            entries,
        })?;

        let path = self.data_dir.join(STORE_FILE);
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &path).await?;

        debug!("Saved {} entries to storage", entries.len());
        Ok(())
    }

    /// Apply `change` to a copy of the entries and swap it in once it is on disk
    ///
    /// A failed save leaves the in-memory entries untouched.
    async fn commit<T>(&self, change: impl FnOnce(&mut Entries) -> Result<T>) -> Result<T> {
        let mut entries = self.entries.write().await;
        let mut staged = entries.clone();
        let output = change(&mut staged)?;

        self.save(&staged).await?;
        *entries = staged;
        Ok(output)
    }
}

/// Get the default data directory
pub fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "setsunai", "setsunai")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| NotesError::StorageError("Could not determine data directory".to_string()))
}

#[async_trait]
impl NoteStore for FileStore {
    async fn get_pin_record(&self, user_id: &str) -> Result<Option<PinRecord>> {
        self.entries.read().await.get_pin_record(user_id)
    }

    async fn put_pin_record(&self, user_id: &str, record: &PinRecord) -> Result<()> {
        self.commit(|entries| entries.put_pin_record(user_id, record)).await?;

        debug!("Stored PIN record for user {}", user_id);
        Ok(())
    }

    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        self.entries.read().await.get_post(post_id)
    }

    async fn put_post(&self, post: &Post) -> Result<()> {
        self.commit(|entries| entries.put_post(post)).await?;

        debug!("Stored post {}", post.id);
        Ok(())
    }

    async fn delete_post(&self, user_id: &str, post_id: Uuid) -> Result<()> {
        if self.commit(|entries| entries.delete_post(user_id, post_id)).await? {
            debug!("Deleted post {}", post_id);
        }
        Ok(())
    }

    async fn list_post_ids(&self, user_id: &str) -> Result<Vec<Uuid>> {
        self.entries.read().await.list_post_ids(user_id)
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{hash_pin, verify, Envelope};
    use tempfile::TempDir;

    fn envelope() -> Envelope {
        Envelope {
            ciphertext: "AAAAAAAAAAAAAAAAAAAAAA==".to_string(),
            iv: "AAAAAAAAAAAAAAAA".to_string(),
        }
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let post = Post::new("user-42", envelope()).unwrap();

        {
            let store = FileStore::with_dir(temp_dir.path().to_path_buf()).await.unwrap();
            store
                .put_pin_record("user-42", &PinRecord::new(hash_pin("123456"), Some("Ada".into())))
                .await
                .unwrap();
            store.put_post(&post).await.unwrap();
        }

        let store = FileStore::with_dir(temp_dir.path().to_path_buf()).await.unwrap();
        let record = store.get_pin_record("user-42").await.unwrap().unwrap();
        assert!(verify(&record.pin_hash.unwrap(), &hash_pin("123456")));
        assert_eq!(record.name.as_deref(), Some("Ada"));
        assert_eq!(store.get_post(post.id).await.unwrap().unwrap(), post);
        assert_eq!(store.list_post_ids("user-42").await.unwrap(), vec![post.id]);
    }

    #[tokio::test]
    async fn test_delete_persists() {
        let temp_dir = TempDir::new().unwrap();
        let post = Post::new("user-42", envelope()).unwrap();

        {
            let store = FileStore::with_dir(temp_dir.path().to_path_buf()).await.unwrap();
            store.put_post(&post).await.unwrap();
            store.delete_post("user-42", post.id).await.unwrap();
        }

        let store = FileStore::with_dir(temp_dir.path().to_path_buf()).await.unwrap();
        assert!(store.get_post(post.id).await.unwrap().is_none());
        assert!(store.list_post_ids("user-42").await.unwrap().is_empty());
        assert!(!temp_dir.path().join("notes.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_state() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("store");
        let kept = Post::new("user-42", envelope()).unwrap();

        let store = FileStore::with_dir(data_dir.clone()).await.unwrap();
        store.put_post(&kept).await.unwrap();
        std::fs::remove_dir_all(&data_dir).unwrap();

        let lost = Post::new("user-42", envelope()).unwrap();
        assert!(store.put_post(&lost).await.is_err());
        assert!(store.get_post(lost.id).await.unwrap().is_none());
        assert_eq!(store.list_post_ids("user-42").await.unwrap(), vec![kept.id]);

        assert!(store
            .put_pin_record("user-42", &PinRecord::new(hash_pin("123456"), None))
            .await
            .is_err());
        assert!(store.get_pin_record("user-42").await.unwrap().is_none());

        assert!(store.delete_post("user-42", kept.id).await.is_err());
        assert_eq!(store.get_post(kept.id).await.unwrap(), Some(kept));
    }

    #[tokio::test]
    async fn test_rejects_unknown_version() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(STORE_FILE), r#"{"version":9,"entries":{}}"#).unwrap();

        let result = FileStore::with_dir(temp_dir.path().to_path_buf()).await;
        assert!(matches!(result, Err(NotesError::StorageError(_))));
    }
}
