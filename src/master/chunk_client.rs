//! Client for one chunk server
//!
//! Opens a fresh connection per exchange (the protocol is one command per
//! connection) and bounds the whole exchange with a deadline, so a slow or
//! unreachable peer can never wedge a replication task.

use crate::common::proto;
use crate::common::{Error, Result};
use std::time::Duration;
use tokio::io::BufReader;
use tokio::net::TcpStream;

#[derive(Debug, Clone)]
pub struct ChunkClient {
    addr: String,
    timeout: Duration,
}

impl ChunkClient {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Push a blob and wait for the ack.
    pub async fn store(&self, key: &str, data: &[u8]) -> Result<()> {
        let header = format!("STORE {} {}", key, data.len());
        self.exchange(&header, data, proto::MAX_HEADER_LEN).await?;
        Ok(())
    }

    /// Pull a blob.
    pub async fn retrieve(&self, key: &str, max_size: usize) -> Result<Vec<u8>> {
        let header = format!("RETRIEVE {}", key);
        self.exchange(&header, b"", max_size).await
    }

    async fn exchange(&self, header: &str, payload: &[u8], max_body: usize) -> Result<Vec<u8>> {
        let exchange = async {
            let stream = TcpStream::connect(&self.addr)
                .await
                .map_err(|e| Error::PeerUnavailable {
                    addr: self.addr.clone(),
                    reason: e.to_string(),
                })?;

            let (rx, mut tx) = stream.into_split();
            proto::write_request(&mut tx, header, payload).await?;

            let mut reader = BufReader::new(rx);
            proto::read_response(&mut reader, max_body).await
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| Error::Timeout(format!("{} to {}", header, self.addr)))?
    }
}
