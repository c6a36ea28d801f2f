//! Error types for setsunai-core

use thiserror::Error;

/// Result type alias for notes operations
pub type Result<T> = std::result::Result<T, NotesError>;

/// Notes error types
#[derive(Error, Debug)]
pub enum NotesError {
    #[error("Cannot unlock on this device: {0}")]
    KeyDerivationError(String),

    #[error("Encryption failed: {0}")]
    EncryptionError(String),

    /// Wrong key, tampered envelope, or undecodable envelope. Carries no detail.
    #[error("Unable to decrypt note")]
    DecryptionError,

    /// Same user-facing message as `DecryptionError`.
    #[error("Unable to decrypt note")]
    MalformedEnvelope,

    #[error("Incorrect PIN")]
    VerificationMismatch,

    #[error("PIN must be exactly 6 digits")]
    InvalidPin,

    #[error("PIN not set up")]
    PinNotSet,

    #[error("PIN already set up")]
    PinAlreadySet,

    #[error("Notebook is locked - unlock with PIN first")]
    NotebookLocked,

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Not authorized")]
    NotAuthorized,

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl NotesError {
    /// Whether this failure means "mark the note undecryptable and move on".
    pub fn is_undecryptable(&self) -> bool {
        matches!(self, Self::DecryptionError | Self::MalformedEnvelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decryption_kinds_share_message() {
        assert_eq!(
            NotesError::DecryptionError.to_string(),
            NotesError::MalformedEnvelope.to_string()
        );
        assert!(NotesError::MalformedEnvelope.is_undecryptable());
        assert!(!NotesError::VerificationMismatch.is_undecryptable());
    }
}
