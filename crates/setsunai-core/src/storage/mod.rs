//! Storage backends for PIN records and sealed posts
//!
//! This module provides two storage backends:
//! 1. In-memory (tests, ephemeral servers)
//! 2. JSON file in the user's data directory

mod entries;
mod file;
mod memory;
mod traits;

pub use file::{default_data_dir, FileStore};
pub use memory::MemoryStore;
pub use traits::NoteStore;
