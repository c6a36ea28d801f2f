//! Storage trait definitions

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::note::{PinRecord, Post};

/// Key-value backend for PIN records and sealed posts
///
/// Implementations decode records through the strict schema on every read and
/// report undecodable records as `MalformedRecord`.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// PIN record for a user, if one was ever stored
    async fn get_pin_record(&self, user_id: &str) -> Result<Option<PinRecord>>;

    /// Store or replace a user's PIN record
    async fn put_pin_record(&self, user_id: &str, record: &PinRecord) -> Result<()>;

    /// Retrieve a post by id
    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>>;

    /// Store or replace a post and index it under its owner
    async fn put_post(&self, post: &Post) -> Result<()>;

    /// Delete a post and drop it from the owner's index
    async fn delete_post(&self, user_id: &str, post_id: Uuid) -> Result<()>;

    /// Post ids of a user, newest first
    async fn list_post_ids(&self, user_id: &str) -> Result<Vec<Uuid>>;

    /// Get a human-readable name for this storage backend
    fn backend_name(&self) -> &'static str;
}

/// Storage key for a user's PIN record
pub(crate) fn pin_key(user_id: &str) -> String {
    format!("user:{}:pin", user_id)
}

/// Storage key for a post
pub(crate) fn post_key(post_id: Uuid) -> String {
    format!("post:{}", post_id)
}

/// Storage key for a user's post index
pub(crate) fn index_key(user_id: &str) -> String {
    format!("posts:{}", user_id)
}
