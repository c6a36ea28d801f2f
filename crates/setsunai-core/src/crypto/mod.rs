//! Cryptographic envelope for note content
//!
//! This module provides:
//! - PBKDF2-HMAC-SHA256 key derivation from a PIN and per-user salt
//! - AES-256-GCM sealing and opening of note text
//! - A PIN verification hash, independent of the note key
//! - Secure memory handling with zeroize

mod encryption;
mod key_derivation;
mod pin;
mod secure_memory;

pub use encryption::{open, open_all, seal, Envelope, IV_LEN, TAG_LEN};
pub use key_derivation::{derive_key, derive_key_async, KeyDerivationParams, DEFAULT_ITERATIONS};
pub use pin::{hash_pin, verify, Pin, VerificationHash, HASH_LEN, PIN_LEN};
pub use secure_memory::{DerivedKey, SecretString};
