//! Notebook orchestration for one signed-in user

use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::crypto::{hash_pin, verify, KeyDerivationParams, Pin};
use crate::error::{NotesError, Result};
use crate::note::{DecryptedNote, NoteManager, PinRecord, Post};
use crate::session::UnlockedSession;
use crate::storage::NoteStore;

/// Notebook state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotebookState {
    /// The user has not chosen a PIN yet
    PinNotSet,
    /// PIN required
    Locked,
    /// Unlocked and ready
    Unlocked,
}

/// A user's notebook: PIN setup and unlock, plus note CRUD while unlocked
pub struct Notebook {
    /// Identity-provider user id, also the key derivation salt
    user_id: String,
    /// Storage backend
    storage: Arc<dyn NoteStore>,
    /// Note manager
    notes: NoteManager,
    /// Key derivation parameters
    params: KeyDerivationParams,
    /// Current session (when unlocked)
    session: Option<UnlockedSession>,
    /// Current state
    state: NotebookState,
}

impl Notebook {
    /// Open the notebook of `user_id`
    pub async fn open(
        user_id: &str,
        storage: Arc<dyn NoteStore>,
        params: KeyDerivationParams,
    ) -> Result<Self> {
        let state = match storage.get_pin_record(user_id).await? {
            Some(PinRecord { pin_hash: Some(_), .. }) => NotebookState::Locked,
            _ => NotebookState::PinNotSet,
        };

        debug!("Opened notebook for user {} ({:?})", user_id, state);
        Ok(Self {
            user_id: user_id.to_string(),
            notes: NoteManager::new(storage.clone()),
            storage,
            params,
            session: None,
            state,
        })
    }

    /// Get the current notebook state
    pub fn state(&self) -> NotebookState {
        self.state
    }

    /// Check if the notebook is unlocked
    pub fn is_unlocked(&self) -> bool {
        self.state == NotebookState::Unlocked
    }

    /// Choose the PIN for the first time; leaves the notebook unlocked
    pub async fn setup_pin(&mut self, pin: &str, name: Option<String>) -> Result<()> {
        if self.state != NotebookState::PinNotSet {
            return Err(NotesError::PinAlreadySet);
        }
        let pin = Pin::parse(pin)?;

        let session =
            UnlockedSession::unlock(&self.user_id, pin.expose(), Some(self.params)).await?;

        let record = match self.storage.get_pin_record(&self.user_id).await? {
            Some(mut existing) => {
                existing.update(hash_pin(pin.expose()), name);
                existing
            }
            None => PinRecord::new(hash_pin(pin.expose()), name),
        };
        self.storage.put_pin_record(&self.user_id, &record).await?;

        self.session = Some(session);
        self.state = NotebookState::Unlocked;

        info!("PIN set up for user {}", self.user_id);
        Ok(())
    }

    /// Unlock with the PIN
    pub async fn unlock(&mut self, pin: &str) -> Result<()> {
        match self.state {
            NotebookState::PinNotSet => return Err(NotesError::PinNotSet),
            NotebookState::Unlocked => {
                debug!("Notebook already unlocked");
                return Ok(());
            }
            NotebookState::Locked => {}
        }

        let pin = Pin::parse(pin)?;
        self.check_pin(&pin).await?;

        let session =
            UnlockedSession::unlock(&self.user_id, pin.expose(), Some(self.params)).await?;
        self.session = Some(session);
        self.state = NotebookState::Unlocked;

        info!("Notebook unlocked for user {}", self.user_id);
        Ok(())
    }

    /// Lock the notebook (drop the derived key)
    pub fn lock(&mut self) {
        if let Some(session) = self.session.take() {
            session.lock();
        }
        if self.state == NotebookState::Unlocked {
            self.state = NotebookState::Locked;
        }

        info!("Notebook locked");
    }

    /// Change the PIN, re-sealing every note under the new key
    ///
    /// Notes that no longer open under the old PIN are left untouched. If any
    /// write fails, the notes and the PIN record stay as they were.
    pub async fn change_pin(&mut self, old_pin: &str, new_pin: &str) -> Result<()> {
        if self.state == NotebookState::PinNotSet {
            return Err(NotesError::PinNotSet);
        }

        let old_pin = Pin::parse(old_pin)?;
        let new_pin = Pin::parse(new_pin)?;
        self.check_pin(&old_pin).await?;

        let old_session =
            UnlockedSession::unlock(&self.user_id, old_pin.expose(), Some(self.params)).await?;
        let new_session =
            UnlockedSession::unlock(&self.user_id, new_pin.expose(), Some(self.params)).await?;

        let originals = self.notes.reseal(&old_session, &new_session).await?;
        old_session.lock();

        if let Err(e) = self.store_pin_hash(&new_pin).await {
            error!("PIN change failed, restoring {} posts", originals.len());
            self.notes.restore(&originals).await;
            return Err(e);
        }

        if let Some(previous) = self.session.replace(new_session) {
            previous.lock();
        }
        self.state = NotebookState::Unlocked;

        info!("PIN changed, {} notes re-sealed", originals.len());
        Ok(())
    }

    /// Seal and store a new note
    pub async fn create_note(&self, text: &str) -> Result<Post> {
        self.notes.create(self.session()?, text).await
    }

    /// Replace a note's text with a freshly sealed envelope
    pub async fn edit_note(&self, id: Uuid, text: &str) -> Result<Post> {
        self.notes.edit(self.session()?, id, text).await
    }

    /// Delete a note
    pub async fn delete_note(&self, id: Uuid) -> Result<()> {
        let session = self.session()?;
        self.notes.delete(session.user_id(), id).await
    }

    /// All notes, newest first, opened where possible
    pub async fn list_notes(&self) -> Result<Vec<DecryptedNote>> {
        self.notes.list(self.session()?).await
    }

    fn session(&self) -> Result<&UnlockedSession> {
        self.session.as_ref().ok_or(NotesError::NotebookLocked)
    }

    async fn store_pin_hash(&self, pin: &Pin) -> Result<()> {
        let mut record = self
            .storage
            .get_pin_record(&self.user_id)
            .await?
            .ok_or(NotesError::PinNotSet)?;
        record.update(hash_pin(pin.expose()), None);
        self.storage.put_pin_record(&self.user_id, &record).await
    }

    async fn check_pin(&self, pin: &Pin) -> Result<()> {
        let stored = self
            .storage
            .get_pin_record(&self.user_id)
            .await?
            .and_then(|record| record.pin_hash)
            .ok_or(NotesError::PinNotSet)?;

        if !verify(&hash_pin(pin.expose()), &stored) {
            warn!("Incorrect PIN for user {}", self.user_id);
            return Err(NotesError::VerificationMismatch);
        }
        Ok(())
    }
}
