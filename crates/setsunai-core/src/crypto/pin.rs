//! PIN parsing and the server-side verification hash
//!
//! The verification hash is HKDF-SHA256 over the PIN under its own label. It
//! never feeds key derivation, so a leaked hash does not yield the note key.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hkdf::Hkdf;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{NotesError, Result};

const VERIFICATION_LABEL: &[u8] = b"setsunai.pin-verification.v1";

/// Number of digits in an application PIN
pub const PIN_LEN: usize = 6;

/// Verification hash length in bytes
pub const HASH_LEN: usize = 32;

/// A 6-digit PIN - automatically zeroed when dropped
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Pin(String);

impl Pin {
    /// Accept exactly six ASCII digits
    pub fn parse(input: &str) -> Result<Self> {
        if input.len() != PIN_LEN || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NotesError::InvalidPin);
        }
        Ok(Self(input.to_string()))
    }

    /// Get the PIN digits (use carefully)
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Pin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Pin([REDACTED])")
    }
}

/// Base64 one-way digest of a PIN, as stored by the server
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VerificationHash {
    bytes: [u8; HASH_LEN],
}

impl VerificationHash {
    /// Parse the transport form; must be base64 of exactly 32 bytes
    pub fn parse(encoded: &str) -> Result<Self> {
        let decoded = STANDARD
            .decode(encoded)
            .map_err(|_| NotesError::MalformedRecord("PIN hash is not valid base64".to_string()))?;
        let bytes: [u8; HASH_LEN] = decoded.as_slice().try_into().map_err(|_| {
            NotesError::MalformedRecord(format!("PIN hash must be {} bytes", HASH_LEN))
        })?;
        Ok(Self { bytes })
    }

    /// Transport form (standard base64)
    pub fn encode(&self) -> String {
        STANDARD.encode(self.bytes)
    }
}

impl TryFrom<String> for VerificationHash {
    type Error = NotesError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<VerificationHash> for String {
    fn from(hash: VerificationHash) -> Self {
        hash.encode()
    }
}

impl std::fmt::Debug for VerificationHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VerificationHash([REDACTED])")
    }
}

/// Compute the verification hash of a PIN. Deterministic, unsalted.
pub fn hash_pin(pin: &str) -> VerificationHash {
    let hkdf = Hkdf::<Sha256>::new(None, pin.as_bytes());

    let mut bytes = [0u8; HASH_LEN];
    let Ok(()) = hkdf.expand(VERIFICATION_LABEL, &mut bytes) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 output length");
    };

    VerificationHash { bytes }
}

/// Compare two verification hashes in constant time
pub fn verify(candidate: &VerificationHash, stored: &VerificationHash) -> bool {
    candidate.bytes.ct_eq(&stored.bytes).into()
}
