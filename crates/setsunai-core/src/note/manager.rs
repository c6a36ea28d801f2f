//! Note manager for CRUD over sealed posts

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::types::{DecryptedNote, Post};
use crate::crypto::Envelope;
use crate::error::{NotesError, Result};
use crate::session::UnlockedSession;
use crate::storage::NoteStore;

/// Note manager
///
/// The `*_sealed` operations work on envelopes only and are what a server
/// exposes; the session operations seal and open on top of them.
#[derive(Clone)]
pub struct NoteManager {
    storage: Arc<dyn NoteStore>,
}

impl NoteManager {
    /// Create a new note manager
    pub fn new(storage: Arc<dyn NoteStore>) -> Self {
        Self { storage }
    }

    /// Store a new sealed post for `user_id`
    pub async fn create_sealed(&self, user_id: &str, envelope: Envelope) -> Result<Post> {
        let post = Post::new(user_id, envelope)?;
        self.storage.put_post(&post).await?;

        info!("Created post {} for user {}", post.id, user_id);
        Ok(post)
    }

    /// Replace the envelope of a post owned by `user_id`
    pub async fn replace_sealed(
        &self,
        user_id: &str,
        id: Uuid,
        envelope: Envelope,
    ) -> Result<Post> {
        let mut post = self.owned_post(user_id, id).await?;
        post.replace_envelope(envelope)?;
        self.storage.put_post(&post).await?;

        info!("Updated post {}", id);
        Ok(post)
    }

    /// Delete a post owned by `user_id`
    pub async fn delete(&self, user_id: &str, id: Uuid) -> Result<()> {
        self.owned_post(user_id, id).await?;
        self.storage.delete_post(user_id, id).await?;

        info!("Deleted post {}", id);
        Ok(())
    }

    /// All sealed posts of `user_id`, newest first
    ///
    /// Records that fail schema decoding are skipped with a warning so one bad
    /// record cannot hide the rest.
    pub async fn list_sealed(&self, user_id: &str) -> Result<Vec<Post>> {
        let ids = self.storage.list_post_ids(user_id).await?;
        let fetched = join_all(ids.iter().map(|id| self.storage.get_post(*id))).await;

        let mut posts = Vec::with_capacity(ids.len());
        for (id, result) in ids.iter().zip(fetched) {
            match result {
                Ok(Some(post)) if post.is_owned_by(user_id) => posts.push(post),
                Ok(Some(_)) => warn!("Post {} is indexed under the wrong user", id),
                Ok(None) => debug!("Post {} vanished from storage", id),
                Err(NotesError::MalformedRecord(reason)) => {
                    warn!("Skipping malformed post {}: {}", id, reason)
                }
                Err(e) => return Err(e),
            }
        }

        Ok(posts)
    }

    /// Seal `text` and store it as a new post
    pub async fn create(&self, session: &UnlockedSession, text: &str) -> Result<Post> {
        let envelope = session.seal(text)?;
        self.create_sealed(session.user_id(), envelope).await
    }

    /// Seal `text` into a fresh envelope replacing the post's current one
    pub async fn edit(&self, session: &UnlockedSession, id: Uuid, text: &str) -> Result<Post> {
        let envelope = session.seal(text)?;
        self.replace_sealed(session.user_id(), id, envelope).await
    }

    /// List and open every post of the session's user
    ///
    /// Posts that cannot be opened are returned as undecryptable, in place.
    pub async fn list(&self, session: &UnlockedSession) -> Result<Vec<DecryptedNote>> {
        let posts = self.list_sealed(session.user_id()).await?;
        let opened = session.open_all(posts.iter().map(|post| &post.envelope));

        let notes: Vec<DecryptedNote> = posts
            .iter()
            .zip(opened)
            .map(|(post, result)| DecryptedNote::from_open_result(post, result))
            .collect();

        debug!("Listed {} notes", notes.len());
        Ok(notes)
    }

    /// Re-seal every post that opens under `from` with the key of `to`
    ///
    /// All envelopes are sealed before anything is written, and a failed write
    /// puts the already re-sealed posts back. Timestamps are kept since a
    /// re-seal is not an edit. Returns the original posts so the caller can
    /// undo the re-seal with [`NoteManager::restore`].
    pub async fn reseal(&self, from: &UnlockedSession, to: &UnlockedSession) -> Result<Vec<Post>> {
        let posts = self.list_sealed(from.user_id()).await?;
        let opened = from.open_all(posts.iter().map(|post| &post.envelope));

        let mut staged = Vec::with_capacity(posts.len());
        for (post, result) in posts.into_iter().zip(opened) {
            match result {
                Ok(text) => {
                    let resealed = Post {
                        envelope: to.seal(text.expose())?,
                        ..post.clone()
                    };
                    staged.push((post, resealed));
                }
                Err(_) => warn!("Post {} does not open and keeps its current key", post.id),
            }
        }

        for (written, (_, resealed)) in staged.iter().enumerate() {
            if let Err(e) = self.storage.put_post(resealed).await {
                error!("Re-seal failed at post {}: {}", resealed.id, e);
                let originals: Vec<Post> =
                    staged[..written].iter().map(|(original, _)| original.clone()).collect();
                self.restore(&originals).await;
                return Err(e);
            }
        }

        info!("Re-sealed {} posts", staged.len());
        Ok(staged.into_iter().map(|(original, _)| original).collect())
    }

    /// Write `originals` back as they were; failures are logged, not returned
    pub async fn restore(&self, originals: &[Post]) {
        for post in originals {
            if let Err(e) = self.storage.put_post(post).await {
                error!("Could not restore post {}: {}", post.id, e);
            }
        }
    }

    async fn owned_post(&self, user_id: &str, id: Uuid) -> Result<Post> {
        let post = self
            .storage
            .get_post(id)
            .await?
            .ok_or_else(|| NotesError::NoteNotFound(id.to_string()))?;

        if !post.is_owned_by(user_id) {
            warn!("User {} tried to modify post {} they do not own", user_id, id);
            return Err(NotesError::NotAuthorized);
        }
        Ok(post)
    }
}
