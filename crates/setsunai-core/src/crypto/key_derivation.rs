//! PIN-based key derivation using PBKDF2-HMAC-SHA256

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroize;

use super::DerivedKey;
use crate::error::{NotesError, Result};

/// Default PBKDF2 iteration count
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Parameters for PBKDF2 key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDerivationParams {
    /// HMAC-SHA256 iterations (default: 100000)
    pub iterations: u32,
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Derive a 256-bit note key from a PIN and a per-user salt
///
/// # Arguments
/// * `pin` - The user's PIN (any string; the derivation does not inspect it)
/// * `salt` - A stable per-user value such as the user id
/// * `params` - Optional key derivation parameters
///
/// # Returns
/// A 32-byte key suitable for AES-256-GCM
pub fn derive_key(
    pin: &str,
    salt: &str,
    params: Option<KeyDerivationParams>,
) -> Result<DerivedKey> {
    let params = params.unwrap_or_default();

    if params.iterations == 0 {
        return Err(NotesError::KeyDerivationError(
            "Iteration count must be positive".to_string(),
        ));
    }
    if salt.is_empty() {
        return Err(NotesError::KeyDerivationError("Salt must not be empty".to_string()));
    }

    let mut key_bytes = [0u8; 32];
    pbkdf2_hmac::<Sha256>(pin.as_bytes(), salt.as_bytes(), params.iterations, &mut key_bytes);

    let key = DerivedKey::new(key_bytes);
    key_bytes.zeroize();
    Ok(key)
}

/// [`derive_key`] on the blocking pool, for callers on an async runtime
pub async fn derive_key_async(
    pin: String,
    salt: String,
    params: Option<KeyDerivationParams>,
) -> Result<DerivedKey> {
    let mut pin = pin;
    let handle = tokio::task::spawn_blocking(move || {
        let key = derive_key(&pin, &salt, params);
        pin.zeroize();
        key
    });

    handle
        .await
        .map_err(|e| NotesError::KeyDerivationError(format!("Derivation task failed: {}", e)))?
}
