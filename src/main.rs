use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shortpaste::config::{Config, StorageKind};
use shortpaste::{commands, App, AnyStore, FileStore, MemoryStore};

/// Share short-lived text pastes over HTTP.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml if present).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the config.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // try to load .env, ignoring any errors
    _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    let limits = config.limits()?;
    let store: AnyStore = match config.storage {
        StorageKind::Memory => MemoryStore::new(limits).into(),
        StorageKind::File => {
            let dir = config
                .storage_dir
                .clone()
                .context("storage_dir is required for file storage")?;
            info!("storing pastes in {}", dir.display());
            FileStore::new(dir, limits)
                .context("failed to open file storage")?
                .into()
        }
    };

    commands::serve::run(App::new(config, store)).await
}
