//! Replication fan-out and chunk reconstruction
//!
//! Every chunk goes to every registry member (full replication). Pushes are
//! awaited tasks with per-attempt deadlines, and a CREATE only succeeds once
//! every chunk has been acked by the configured write quorum. Reads walk the
//! registry in registration order and take the first replica that answers;
//! a chunk with no live replica fails the whole download instead of being
//! silently dropped.

use crate::common::{Error, Result};
use crate::master::chunk_client::ChunkClient;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Outcome of a replication fan-out
#[derive(Debug, Clone)]
pub struct PushReport {
    pub chunks: usize,
    pub acks: usize,
    pub failures: usize,
}

pub struct Replicator {
    registry: Arc<Vec<ChunkClient>>,
    write_quorum: usize,
    max_chunk_size: usize,
}

impl Replicator {
    pub fn new(
        registry: &[String],
        peer_timeout: Duration,
        write_quorum: usize,
        max_chunk_size: usize,
    ) -> Self {
        let clients = registry
            .iter()
            .map(|addr| ChunkClient::new(addr.clone(), peer_timeout))
            .collect();
        Self {
            registry: Arc::new(clients),
            write_quorum,
            max_chunk_size,
        }
    }

    pub fn fanout(&self) -> usize {
        self.registry.len()
    }

    /// Push every chunk to every registry member concurrently and wait for
    /// all attempts. Fails with the first chunk that misses the quorum.
    pub async fn push_chunks(&self, chunks: &[(String, Bytes)]) -> Result<PushReport> {
        let mut attempts = JoinSet::new();

        for (chunk_idx, (key, data)) in chunks.iter().enumerate() {
            for client in self.registry.iter() {
                let client = client.clone();
                let key = key.clone();
                let data = data.clone();
                attempts.spawn(async move {
                    let result = client.store(&key, &data).await;
                    if let Err(e) = &result {
                        tracing::warn!("Replica push of {} to {} failed: {}", key, client.addr(), e);
                    }
                    (chunk_idx, result.is_ok())
                });
            }
        }

        let mut acks_per_chunk = vec![0usize; chunks.len()];
        let mut acks = 0;
        let mut failures = 0;

        while let Some(joined) = attempts.join_next().await {
            let (chunk_idx, ok) = joined.map_err(|e| Error::Internal(e.to_string()))?;
            if ok {
                acks_per_chunk[chunk_idx] += 1;
                acks += 1;
            } else {
                failures += 1;
            }
        }

        for (chunk_idx, &acked) in acks_per_chunk.iter().enumerate() {
            if acked < self.write_quorum {
                return Err(Error::QuorumFailed {
                    key: chunks[chunk_idx].0.clone(),
                    needed: self.write_quorum,
                    acked,
                });
            }
        }

        Ok(PushReport {
            chunks: chunks.len(),
            acks,
            failures,
        })
    }

    /// Reassemble a file by pulling each chunk from the first replica that
    /// answers, in registration order.
    pub async fn pull_file(&self, keys: &[String]) -> Result<Vec<u8>> {
        let mut combined = Vec::new();

        for key in keys {
            let chunk = self.pull_chunk(key).await?;
            combined.extend_from_slice(&chunk);
        }

        Ok(combined)
    }

    async fn pull_chunk(&self, key: &str) -> Result<Vec<u8>> {
        for client in self.registry.iter() {
            match client.retrieve(key, self.max_chunk_size).await {
                Ok(data) => return Ok(data),
                Err(e) if e.is_peer_failure() => {
                    tracing::warn!("Replica {} unreachable for chunk {}: {}", client.addr(), key, e);
                }
                Err(e) => {
                    tracing::debug!(
                        "Replica {} could not serve chunk {}: {}",
                        client.addr(),
                        key,
                        e
                    );
                }
            }
        }

        Err(Error::ChunkUnavailable(key.to_string()))
    }
}
