//! Key-value entries shared by the store backends
//!
//! Values are JSON strings, as they would be in a remote key-value service.
//! Each user's posts are indexed by creation time, newest first on listing.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::traits::{index_key, pin_key, post_key};
use crate::error::{NotesError, Result};
use crate::note::{PinRecord, Post};

/// One member of a user's post index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct IndexEntry {
    /// Creation time in Unix milliseconds
    score: i64,
    member: Uuid,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct Entries {
    entries: HashMap<String, String>,
}

impl Entries {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn decode<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.entries.get(key) {
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .map_err(|e| NotesError::MalformedRecord(format!("{}: {}", key, e))),
            None => Ok(None),
        }
    }

    fn encode<T: Serialize>(&mut self, key: String, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.entries.insert(key, raw);
        Ok(())
    }

    fn index(&self, user_id: &str) -> Result<Vec<IndexEntry>> {
        Ok(self.decode(&index_key(user_id))?.unwrap_or_default())
    }

    pub(crate) fn get_pin_record(&self, user_id: &str) -> Result<Option<PinRecord>> {
        self.decode(&pin_key(user_id))
    }

    pub(crate) fn put_pin_record(&mut self, user_id: &str, record: &PinRecord) -> Result<()> {
        self.encode(pin_key(user_id), record)
    }

    pub(crate) fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        self.decode(&post_key(post_id))
    }

    pub(crate) fn put_post(&mut self, post: &Post) -> Result<()> {
        let mut index = self.index(&post.user_id)?;
        index.retain(|entry| entry.member != post.id);
        index.push(IndexEntry {
            score: post.created_at.timestamp_millis(),
            member: post.id,
        });

        self.encode(post_key(post.id), post)?;
        self.encode(index_key(&post.user_id), &index)
    }

    pub(crate) fn delete_post(&mut self, user_id: &str, post_id: Uuid) -> Result<bool> {
        let mut index = self.index(user_id)?;
        index.retain(|entry| entry.member != post_id);
        self.encode(index_key(user_id), &index)?;

        Ok(self.entries.remove(&post_key(post_id)).is_some())
    }

    pub(crate) fn list_post_ids(&self, user_id: &str) -> Result<Vec<Uuid>> {
        let mut index = self.index(user_id)?;
        index.sort_by(|a, b| b.score.cmp(&a.score).then(b.member.cmp(&a.member)));
        Ok(index.into_iter().map(|entry| entry.member).collect())
    }

    #[cfg(test)]
    pub(crate) fn insert_raw(&mut self, key: &str, raw: &str) {
        self.entries.insert(key.to_string(), raw.to_string());
    }
}
