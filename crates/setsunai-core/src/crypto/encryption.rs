//! AES-256-GCM sealing and opening of note text
//!
//! Envelope format: `{ciphertext, iv}`, both standard base64
//! - IV: 12 bytes (96 bits), fresh from the OS RNG on every seal
//! - Ciphertext: encrypted UTF-8 bytes with the 16-byte auth tag appended

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

use super::{DerivedKey, SecretString};
use crate::error::{NotesError, Result};

/// IV length for AES-GCM
pub const IV_LEN: usize = 12;

/// Auth tag length appended to every ciphertext
pub const TAG_LEN: usize = 16;

/// Sealed note content as it travels and is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Base64 ciphertext with auth tag
    pub ciphertext: String,
    /// Base64 initialization vector
    pub iv: String,
}

impl Envelope {
    /// Decode the transport encoding into raw `(iv, ciphertext)` bytes
    pub fn decode(&self) -> Result<([u8; IV_LEN], Vec<u8>)> {
        let iv_bytes = STANDARD
            .decode(&self.iv)
            .map_err(|_| NotesError::MalformedEnvelope)?;
        let iv: [u8; IV_LEN] = iv_bytes
            .as_slice()
            .try_into()
            .map_err(|_| NotesError::MalformedEnvelope)?;

        let ciphertext = STANDARD
            .decode(&self.ciphertext)
            .map_err(|_| NotesError::MalformedEnvelope)?;
        if ciphertext.len() < TAG_LEN {
            return Err(NotesError::MalformedEnvelope);
        }

        Ok((iv, ciphertext))
    }
}

/// Seal plaintext under the key with a fresh random IV
pub fn seal(plaintext: &str, key: &DerivedKey) -> Result<Envelope> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| NotesError::EncryptionError(e.to_string()))?;

    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    let nonce = Nonce::from_slice(&iv);

    // aes-gcm appends the auth tag to the ciphertext
    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| NotesError::EncryptionError(e.to_string()))?;

    Ok(Envelope {
        ciphertext: STANDARD.encode(ciphertext),
        iv: STANDARD.encode(iv),
    })
}

/// Open an envelope with the key
///
/// Every failure, including an undecodable envelope, is reported as
/// [`NotesError::DecryptionError`].
pub fn open(envelope: &Envelope, key: &DerivedKey) -> Result<SecretString> {
    let (iv, ciphertext) = envelope.decode().map_err(|_| NotesError::DecryptionError)?;

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| NotesError::DecryptionError)?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&iv), ciphertext.as_slice())
        .map_err(|_| NotesError::DecryptionError)?;

    String::from_utf8(plaintext)
        .map(SecretString::new)
        .map_err(|e| {
            let mut bytes = e.into_bytes();
            zeroize::Zeroize::zeroize(&mut bytes);
            NotesError::DecryptionError
        })
}

/// Open each envelope independently; one failure never affects the others
pub fn open_all<'a, I>(envelopes: I, key: &DerivedKey) -> Vec<Result<SecretString>>
where
    I: IntoIterator<Item = &'a Envelope>,
{
    envelopes.into_iter().map(|envelope| open(envelope, key)).collect()
}
