//! Master server: client-facing listener and command dispatch

use crate::common::proto::{self, MasterCommand};
use crate::common::{format_bytes, validate_filename, Error, MasterConfig, Result};
use crate::master::chunking::plan_chunks;
use crate::master::metadata::FileTable;
use crate::master::replication::Replicator;
use bytes::Bytes;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

pub struct MasterServer {
    config: MasterConfig,
    table: Arc<Mutex<FileTable>>,
    replicator: Arc<Replicator>,
    listener: TcpListener,
}

impl MasterServer {
    /// Validate the config and bind the client listener.
    pub async fn bind(config: MasterConfig) -> Result<Self> {
        config.validate()?;

        let replicator = Replicator::new(
            &config.registry,
            config.peer_timeout(),
            config.effective_quorum(),
            config.max_file_size,
        );
        let listener = TcpListener::bind(config.bind_addr).await?;

        Ok(Self {
            config,
            table: Arc::new(Mutex::new(FileTable::new())),
            replicator: Arc::new(replicator),
            listener,
        })
    }

    /// Address the listener actually bound to (useful with port 0).
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn serve(self) -> Result<()> {
        tracing::info!("Master listening on {}", self.listener.local_addr()?);
        tracing::info!(
            "  Registry: {} chunk servers, write quorum {}",
            self.config.registry.len(),
            self.config.effective_quorum()
        );

        let permits = Arc::new(Semaphore::new(self.config.max_connections));

        loop {
            let (stream, peer) = self.listener.accept().await?;
            let permit = permits.clone().acquire_owned().await.expect("semaphore closed");
            let table = self.table.clone();
            let replicator = self.replicator.clone();
            let max_file_size = self.config.max_file_size;

            tokio::spawn(async move {
                let _permit = permit;
                if let Err(e) = handle_client(stream, table, replicator, max_file_size).await {
                    tracing::warn!("Client session from {} failed: {}", peer, e);
                }
            });
        }
    }
}

async fn handle_client(
    stream: TcpStream,
    table: Arc<Mutex<FileTable>>,
    replicator: Arc<Replicator>,
    max_file_size: usize,
) -> Result<()> {
    let (rx, mut tx) = stream.into_split();
    let mut reader = BufReader::new(rx);

    let result: Result<()> = async {
        let tokens = proto::read_header(&mut reader).await?;
        let command = MasterCommand::parse(&tokens)?;

        match command {
            MasterCommand::Create { filename, size } => {
                validate_filename(&filename)?;
                let payload =
                    Bytes::from(proto::read_payload(&mut reader, size, max_file_size).await?);
                create_file(&table, &replicator, &filename, payload).await?;
                proto::write_ok(&mut tx, b"File created successfully").await?;
            }
            MasterCommand::List => {
                let names = table.lock().expect("table mutex poisoned").list();
                proto::write_ok(&mut tx, names.join("\n").as_bytes()).await?;
            }
            MasterCommand::GetChunks { filename } => {
                let chunks = table
                    .lock()
                    .expect("table mutex poisoned")
                    .chunks(&filename)
                    .unwrap_or_default();
                proto::write_ok(&mut tx, chunks.join(" ").as_bytes()).await?;
            }
            MasterCommand::Download { filename } => {
                // Unknown files fail here, before any chunk server is contacted.
                let chunks = table
                    .lock()
                    .expect("table mutex poisoned")
                    .chunks(&filename)
                    .ok_or_else(|| Error::NotFound(format!("file {}", filename)))?;
                let data = replicator.pull_file(&chunks).await?;
                proto::write_ok(&mut tx, &data).await?;
            }
        }

        Ok(())
    }
    .await;

    if let Err(e) = &result {
        let _ = proto::write_err(&mut tx, e.wire_code(), &e.to_string()).await;
    }
    let _ = tx.shutdown().await;

    result
}

/// Split, replicate at quorum, then record. The record is only visible once
/// every chunk reached its quorum, so LIST never shows a file whose upload
/// failed.
async fn create_file(
    table: &Arc<Mutex<FileTable>>,
    replicator: &Arc<Replicator>,
    filename: &str,
    payload: Bytes,
) -> Result<()> {
    tracing::info!(
        "Creating file {} ({})",
        filename,
        format_bytes(payload.len() as u64)
    );

    let plan = plan_chunks(filename, &payload, replicator.fanout());
    let report = replicator.push_chunks(&plan).await?;
    tracing::info!(
        "Replicated {} in {} chunks: {} acks, {} failed pushes",
        filename,
        report.chunks,
        report.acks,
        report.failures
    );

    let keys = plan.into_iter().map(|(key, _)| key).collect();
    table
        .lock()
        .expect("table mutex poisoned")
        .insert(filename.to_string(), keys);
    Ok(())
}
