//! Command-line client for the master

use clap::{Parser, Subcommand};
use minidfs::MasterClient;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "minidfs")]
#[command(about = "minidfs distributed file store client")]
#[command(version)]
struct Cli {
    /// Master address
    #[arg(long, default_value = "127.0.0.1:50050")]
    master: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file
    Upload {
        /// Local file path
        file: PathBuf,

        /// Name to store it under (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Download a file
    Download {
        /// Stored filename
        name: String,

        /// Output path
        #[arg(long)]
        output: PathBuf,
    },

    /// List stored files
    List,

    /// Show the chunk keys of a file
    Chunks {
        /// Stored filename
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let client = MasterClient::new(cli.master);

    match cli.command {
        Commands::Upload { file, name } => {
            let name = match name {
                Some(name) => name,
                None => file
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| anyhow::anyhow!("cannot derive a name from {:?}", file))?
                    .to_string(),
            };
            let data = tokio::fs::read(&file).await?;
            let confirmation = client.create(&name, &data).await?;
            println!("{} ({} bytes): {}", name, data.len(), confirmation);
        }

        Commands::Download { name, output } => {
            let data = client.download(&name).await?;
            tokio::fs::write(&output, &data).await?;
            println!("{} -> {} ({} bytes)", name, output.display(), data.len());
        }

        Commands::List => {
            for name in client.list().await? {
                println!("{}", name);
            }
        }

        Commands::Chunks { name } => {
            for key in client.chunks(&name).await? {
                println!("{}", key);
            }
        }
    }

    Ok(())
}
