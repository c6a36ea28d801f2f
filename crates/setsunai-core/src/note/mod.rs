//! Notes: sealed posts and their decrypted view

mod manager;
mod types;

pub use manager::NoteManager;
pub use types::*;
