//! # setsunai-server
//!
//! HTTP API for Setsunai. Stores PIN verification hashes and sealed note
//! envelopes; never sees a PIN, a key, or plaintext.

pub mod api;
mod server;

pub use api::{router, ApiError, USER_ID_HEADER};
pub use server::{NotesServer, DEFAULT_PORT};
