//! Note type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::{Envelope, SecretString, VerificationHash};
use crate::error::{NotesError, Result};

/// Current time truncated to the millisecond precision records carry
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Post as it appears on the wire and in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PostRecord {
    pub id: String,
    pub user_id: String,
    pub encrypted_content: String,
    pub iv: String,
    /// Unix milliseconds
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// A validated post. Only ever built from checked input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PostRecord", into = "PostRecord")]
pub struct Post {
    pub id: Uuid,
    pub user_id: String,
    pub envelope: Envelope,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create a new post for `user_id`
    ///
    /// The envelope must decode; malformed envelopes are refused here rather
    /// than stored.
    pub fn new(user_id: &str, envelope: Envelope) -> Result<Self> {
        if user_id.is_empty() {
            return Err(NotesError::MalformedRecord("user id is empty".to_string()));
        }
        envelope.decode()?;

        Ok(Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            envelope,
            created_at: now_millis(),
            updated_at: None,
        })
    }

    /// Replace the envelope wholesale and stamp the edit time
    pub fn replace_envelope(&mut self, envelope: Envelope) -> Result<()> {
        envelope.decode()?;

        let now = now_millis();
        self.envelope = envelope;
        self.updated_at = Some(now.max(self.created_at));
        Ok(())
    }

    /// Whether `user_id` owns this post
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

fn millis(field: &str, value: i64) -> Result<DateTime<Utc>> {
    if value < 0 {
        return Err(NotesError::MalformedRecord(format!("{} is negative", field)));
    }
    DateTime::from_timestamp_millis(value)
        .ok_or_else(|| NotesError::MalformedRecord(format!("{} is out of range", field)))
}

impl TryFrom<PostRecord> for Post {
    type Error = NotesError;

    fn try_from(record: PostRecord) -> Result<Self> {
        let id = Uuid::parse_str(&record.id)
            .map_err(|_| NotesError::MalformedRecord(format!("invalid post id: {}", record.id)))?;
        if record.user_id.is_empty() {
            return Err(NotesError::MalformedRecord(format!("post {} has no owner", id)));
        }
        if record.encrypted_content.is_empty() || record.iv.is_empty() {
            return Err(NotesError::MalformedRecord(format!("post {} has no envelope", id)));
        }

        let created_at = millis("createdAt", record.created_at)?;
        let updated_at = match record.updated_at {
            Some(value) => {
                let updated = millis("updatedAt", value)?;
                if updated < created_at {
                    return Err(NotesError::MalformedRecord(format!(
                        "post {} updated before it was created",
                        id
                    )));
                }
                Some(updated)
            }
            None => None,
        };

        Ok(Self {
            id,
            user_id: record.user_id,
            envelope: Envelope {
                ciphertext: record.encrypted_content,
                iv: record.iv,
            },
            created_at,
            updated_at,
        })
    }
}

impl From<Post> for PostRecord {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.to_string(),
            user_id: post.user_id,
            encrypted_content: post.envelope.ciphertext,
            iv: post.envelope.iv,
            created_at: post.created_at.timestamp_millis(),
            updated_at: post.updated_at.map(|t| t.timestamp_millis()),
        }
    }
}

/// Per-user PIN record kept by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PinRecord {
    pub pin_hash: Option<VerificationHash>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PinRecord {
    /// Record for a freshly set PIN
    pub fn new(pin_hash: VerificationHash, name: Option<String>) -> Self {
        Self {
            pin_hash: Some(pin_hash),
            created_at: now_millis(),
            updated_at: None,
            name,
        }
    }

    /// Replace the stored hash, keeping the creation time
    pub fn update(&mut self, pin_hash: VerificationHash, name: Option<String>) {
        self.pin_hash = Some(pin_hash);
        if name.is_some() {
            self.name = name;
        }
        self.updated_at = Some(now_millis());
    }
}

/// Decrypted note content
#[derive(Debug)]
pub enum NoteContent {
    /// Opened successfully
    Plain(SecretString),
    /// Wrong key or damaged envelope
    Undecryptable,
}

impl NoteContent {
    /// The text, if the note could be opened
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Plain(secret) => Some(secret.expose()),
            Self::Undecryptable => None,
        }
    }
}

/// A note as shown to its owner
#[derive(Debug)]
pub struct DecryptedNote {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub content: NoteContent,
}

impl DecryptedNote {
    /// Pair a post with the result of opening its envelope
    pub fn from_open_result(post: &Post, opened: Result<SecretString>) -> Self {
        let content = match opened {
            Ok(secret) => NoteContent::Plain(secret),
            Err(_) => NoteContent::Undecryptable,
        };
        Self {
            id: post.id,
            created_at: post.created_at,
            updated_at: post.updated_at,
            content,
        }
    }
}
