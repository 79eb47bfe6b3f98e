//! Chunk server session listener
//!
//! One STORE or RETRIEVE exchange per connection. A failed session is
//! logged and closed; the accept loop is never affected.

use crate::chunkserver::store::ChunkStore;
use crate::common::proto::{self, ChunkCommand};
use crate::common::{format_bytes, ChunkServerConfig, Result};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

pub struct ChunkServer {
    config: ChunkServerConfig,
    store: Arc<Mutex<ChunkStore>>,
    listener: TcpListener,
}

impl ChunkServer {
    /// Open the store and bind the listener. Serving starts with [`serve`].
    ///
    /// [`serve`]: ChunkServer::serve
    pub async fn bind(config: ChunkServerConfig) -> Result<Self> {
        let store = ChunkStore::open(&config.data_dir)?;
        let stats = store.stats();
        tracing::info!(
            "Chunk store ready: {} chunks, {}",
            stats.total_chunks,
            format_bytes(stats.total_bytes)
        );

        let listener = TcpListener::bind(config.bind_addr).await?;
        Ok(Self {
            config,
            store: Arc::new(Mutex::new(store)),
            listener,
        })
    }

    /// Address the listener actually bound to (useful with port 0).
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn serve(self) -> Result<()> {
        tracing::info!("Chunk server listening on {}", self.listener.local_addr()?);
        let permits = Arc::new(Semaphore::new(self.config.max_connections));

        loop {
            let (stream, peer) = self.listener.accept().await?;
            let permit = permits.clone().acquire_owned().await.expect("semaphore closed");
            let store = self.store.clone();
            let max_chunk_size = self.config.max_chunk_size;

            tokio::spawn(async move {
                let _permit = permit;
                if let Err(e) = handle_session(stream, store, max_chunk_size).await {
                    tracing::warn!("Session from {} failed: {}", peer, e);
                }
            });
        }
    }
}

async fn handle_session(
    stream: TcpStream,
    store: Arc<Mutex<ChunkStore>>,
    max_chunk_size: usize,
) -> Result<()> {
    let (rx, mut tx) = stream.into_split();
    let mut reader = BufReader::new(rx);

    let result = async {
        let tokens = proto::read_header(&mut reader).await?;
        let command = ChunkCommand::parse(&tokens)?;

        match command {
            ChunkCommand::Store { key, len } => {
                let data = proto::read_payload(&mut reader, len, max_chunk_size).await?;
                tracing::debug!("STORE {} ({} bytes)", key, data.len());
                store.lock().expect("store mutex poisoned").put(&key, &data)?;
                proto::write_ok(&mut tx, b"").await?;
            }
            ChunkCommand::Retrieve { key } => {
                let blob = store.lock().expect("store mutex poisoned").get(&key)?;
                match blob {
                    Some(data) => {
                        tracing::debug!("RETRIEVE {} ({} bytes)", key, data.len());
                        proto::write_ok(&mut tx, &data).await?;
                    }
                    None => {
                        return Err(crate::Error::NotFound(format!("chunk {}", key)));
                    }
                }
            }
        }

        Ok(())
    }
    .await;

    if let Err(e) = &result {
        // Best effort: the peer may already be gone.
        let _ = proto::write_err(&mut tx, e.wire_code(), &e.to_string()).await;
    }
    let _ = tx.shutdown().await;

    result
}
