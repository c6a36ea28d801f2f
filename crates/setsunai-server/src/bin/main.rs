//! Setsunai server - stores sealed notes for the web client
//!
//! Sits behind the identity provider, which forwards the signed-in user's id
//! in the `x-user-id` header.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use setsunai_core::{storage::default_data_dir, FileStore, MemoryStore, NoteStore, SettingsManager};
use setsunai_server::{NotesServer, DEFAULT_PORT};

/// Setsunai - encrypted personal notes
#[derive(Parser, Debug)]
#[command(name = "setsunai-server")]
#[command(version)]
#[command(about = "Setsunai - storage API for client-side encrypted notes")]
struct Args {
    /// Port for the HTTP server
    #[arg(long, env = "SETSUNAI_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Directory for settings and the note store
    #[arg(long, env = "SETSUNAI_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Keep everything in memory (lost on exit)
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let storage: Arc<dyn NoteStore> = if args.memory {
        info!("Using in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        let config_dir = match args.data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        let settings = SettingsManager::new(&config_dir)
            .map_err(|e| format!("Failed to load settings: {}", e))?;
        let data_dir = settings.get().data_dir.clone().unwrap_or(config_dir);

        info!("Using file store at {:?}", data_dir);
        Arc::new(FileStore::with_dir(data_dir).await?)
    };

    NotesServer::new(storage).with_port(args.port).run().await
}
