//! Unlocked session
//!
//! Holds the PIN-derived key for as long as the notebook is unlocked. The
//! session is an explicit value: callers pass it to seal and open, and
//! [`UnlockedSession::lock`] destroys it. It is never serialized.

use tracing::debug;

use crate::crypto::{
    self, derive_key_async, DerivedKey, Envelope, KeyDerivationParams, SecretString,
};
use crate::error::Result;

/// The derived key for one user, scoped to an unlock
pub struct UnlockedSession {
    user_id: String,
    key: DerivedKey,
}

impl UnlockedSession {
    /// Derive the key for `user_id` from `pin` and open a session
    ///
    /// The user id is the derivation salt, so it must be stable for the user.
    pub async fn unlock(
        user_id: &str,
        pin: &str,
        params: Option<KeyDerivationParams>,
    ) -> Result<Self> {
        let key = derive_key_async(pin.to_string(), user_id.to_string(), params).await?;

        debug!("Unlocked session for user {}", user_id);
        Ok(Self::with_key(user_id, key))
    }

    /// Wrap an already-derived key
    pub fn with_key(user_id: &str, key: DerivedKey) -> Self {
        Self {
            user_id: user_id.to_string(),
            key,
        }
    }

    /// User this session belongs to
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Seal note text under the session key
    pub fn seal(&self, plaintext: &str) -> Result<Envelope> {
        crypto::seal(plaintext, &self.key)
    }

    /// Open one envelope with the session key
    pub fn open(&self, envelope: &Envelope) -> Result<SecretString> {
        crypto::open(envelope, &self.key)
    }

    /// Open many envelopes, each independently
    pub fn open_all<'a, I>(&self, envelopes: I) -> Vec<Result<SecretString>>
    where
        I: IntoIterator<Item = &'a Envelope>,
    {
        crypto::open_all(envelopes, &self.key)
    }

    /// End the session; the key is zeroized as it drops
    pub fn lock(self) {
        debug!("Locked session for user {}", self.user_id);
    }
}

impl std::fmt::Debug for UnlockedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnlockedSession")
            .field("user_id", &self.user_id)
            .field("key", &"[REDACTED]")
            .finish()
    }
}
