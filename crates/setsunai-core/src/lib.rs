//! # setsunai-core
//!
//! Core of Setsunai, a personal encrypted-notes service:
//! - PBKDF2 key derivation from a 6-digit PIN and a per-user salt
//! - AES-256-GCM sealing of note text into `{ciphertext, iv}` envelopes
//! - A PIN verification hash, independent of the note key, with constant-time comparison
//! - Explicitly scoped unlocked sessions that zeroize the key on lock
//! - Strictly decoded note records over pluggable key-value storage

pub mod crypto;
pub mod error;
pub mod note;
mod notebook;
pub mod session;
pub mod settings;
pub mod storage;

pub use crypto::{
    derive_key, hash_pin, open, open_all, seal, verify, DerivedKey, Envelope, KeyDerivationParams,
    Pin, SecretString, VerificationHash,
};
pub use error::{NotesError, Result};
pub use note::{DecryptedNote, NoteContent, NoteManager, PinRecord, Post, PostRecord};
pub use notebook::{Notebook, NotebookState};
pub use session::UnlockedSession;
pub use settings::{Settings, SettingsManager};
pub use storage::{FileStore, MemoryStore, NoteStore};
