//! Chunk server binary

use clap::{Parser, Subcommand};
use minidfs::common::load_from_file;
use minidfs::{ChunkServer, ChunkServerConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "minidfs-chunkserver")]
#[command(about = "minidfs chunk server - replicated blob storage node")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start chunk server
    Serve {
        /// Bind address for the session listener
        #[arg(long, default_value = "0.0.0.0:50052")]
        bind: String,

        /// Directory for chunk blobs
        #[arg(long, default_value = "./chunk-data")]
        data_dir: PathBuf,

        /// Maximum concurrent sessions
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
            data_dir,
            max_connections,
            config,
        } => {
            let mut server_config = match config {
                Some(path) => load_from_file::<ChunkServerConfig>(&path)?,
                None => ChunkServerConfig::default(),
            };
            server_config.bind_addr = bind.parse()?;
            server_config.data_dir = data_dir;
            server_config.max_connections = max_connections;

            tracing::info!("Starting minidfs chunk server v{}", minidfs::VERSION);
            tracing::info!("Data directory: {}", server_config.data_dir.display());

            let server = ChunkServer::bind(server_config).await?;
            server.serve().await?;
        }
    }

    Ok(())
}
