//! Foris web interface daemon

use clap::Parser;
use foris_common::MemoryStore;
use foris_web::{SystemRemote, WebConfig, WebServer};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "foris-web")]
#[command(about = "Foris - web administration interface for OpenWrt based routers")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "/etc/foris/foris.toml")]
    config: PathBuf,

    /// HTTP listen address
    #[arg(short, long)]
    listen: Option<String>,

    /// Configuration store snapshot
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    info!("Foris web v{}", env!("CARGO_PKG_VERSION"));

    let mut config = WebConfig::load(&cli.config)?;
    if let Some(listen) = cli.listen {
        config.server.listen = listen;
    }
    if let Some(store) = cli.store {
        config.store.snapshot_path = store;
    }

    let addr: SocketAddr = config.server.listen.parse()?;
    let store = Arc::new(MemoryStore::open(&config.store.snapshot_path)?);
    let remote = Arc::new(SystemRemote::new(config.remote.clone()));

    WebServer::new(store, remote, config.server.lang.clone())
        .serve(addr)
        .await
}
