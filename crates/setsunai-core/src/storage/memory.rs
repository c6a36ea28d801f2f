//! In-memory storage backend

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::entries::Entries;
use super::NoteStore;
use crate::error::Result;
use crate::note::{PinRecord, Post};

/// Volatile store; everything is lost when it drops
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Entries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) async fn insert_raw(&self, key: &str, raw: &str) {
        self.entries.write().await.insert_raw(key, raw);
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn get_pin_record(&self, user_id: &str) -> Result<Option<PinRecord>> {
        self.entries.read().await.get_pin_record(user_id)
    }

    async fn put_pin_record(&self, user_id: &str, record: &PinRecord) -> Result<()> {
        self.entries.write().await.put_pin_record(user_id, record)?;
        debug!("Stored PIN record for user {}", user_id);
        Ok(())
    }

    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        self.entries.read().await.get_post(post_id)
    }

    async fn put_post(&self, post: &Post) -> Result<()> {
        self.entries.write().await.put_post(post)?;
        debug!("Stored post {}", post.id);
        Ok(())
    }

    async fn delete_post(&self, user_id: &str, post_id: Uuid) -> Result<()> {
        if self.entries.write().await.delete_post(user_id, post_id)? {
            debug!("Deleted post {}", post_id);
        }
        Ok(())
    }

    async fn list_post_ids(&self, user_id: &str) -> Result<Vec<Uuid>> {
        self.entries.read().await.list_post_ids(user_id)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
