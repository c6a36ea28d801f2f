//! Server orchestration

use std::sync::Arc;
use tracing::info;

use crate::api;
use setsunai_core::NoteStore;

/// Default listening port
pub const DEFAULT_PORT: u16 = 3000;

/// Notes HTTP server
pub struct NotesServer {
    storage: Arc<dyn NoteStore>,
    port: u16,
}

impl NotesServer {
    /// Create a new server over `storage`
    pub fn new(storage: Arc<dyn NoteStore>) -> Self {
        Self {
            storage,
            port: DEFAULT_PORT,
        }
    }

    /// Set the listening port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Run the server until it fails
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let app = api::router(self.storage.clone());

        let addr = format!("0.0.0.0:{}", self.port);
        info!(
            "Starting Setsunai server on {} ({} store)",
            addr,
            self.storage.backend_name()
        );

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
