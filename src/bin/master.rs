//! Master binary

use clap::{Parser, Subcommand};
use minidfs::common::load_from_file;
use minidfs::{MasterConfig, MasterServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "minidfs-master")]
#[command(about = "minidfs master - file metadata and chunk replication")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start master server
    Serve {
        /// Bind address for the client listener
        #[arg(long, default_value = "0.0.0.0:50050")]
        bind: String,

        /// Chunk server addresses, in registration order (comma-separated)
        #[arg(long, value_delimiter = ',')]
        peers: Vec<String>,

        /// Acks required per chunk (0 = majority of the registry)
        #[arg(long, default_value = "0")]
        quorum: usize,

        /// Timeout per chunk-server exchange in milliseconds
        #[arg(long, default_value = "5000")]
        peer_timeout_ms: u64,

        /// Maximum concurrent client connections
        #[arg(long, default_value = "256")]
        max_connections: usize,

        /// Optional JSON config file; CLI flags take priority
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            peers,
            quorum,
            peer_timeout_ms,
            max_connections,
            config,
        } => {
            let mut master_config = match config {
                Some(path) => load_from_file::<MasterConfig>(&path)?,
                None => MasterConfig::default(),
            };
            master_config.bind_addr = bind.parse()?;
            if !peers.is_empty() {
                master_config.registry = peers;
            }
            master_config.write_quorum = quorum;
            master_config.peer_timeout_ms = peer_timeout_ms;
            master_config.max_connections = max_connections;

            tracing::info!("Starting minidfs master v{}", minidfs::VERSION);
            let server = MasterServer::bind(master_config).await?;
            server.serve().await?;
        }
    }

    Ok(())
}
