//! Client for the master's command surface
//!
//! A thin protocol client: connect, send one command line, stream bytes,
//! read the status frame. Used by the `minidfs` CLI and by tests.

use crate::common::proto;
use crate::common::Result;
use tokio::io::BufReader;
use tokio::net::TcpStream;

const DEFAULT_MAX_RESPONSE: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct MasterClient {
    addr: String,
    max_response: usize,
}

impl MasterClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            max_response: DEFAULT_MAX_RESPONSE,
        }
    }

    /// Upload a file under `filename`.
    pub async fn create(&self, filename: &str, data: &[u8]) -> Result<String> {
        let header = format!("CREATE {} {}", filename, data.len());
        let body = self.exchange(&header, data).await?;
        Ok(String::from_utf8_lossy(&body).to_string())
    }

    /// Filenames known to the master, in upload order.
    pub async fn list(&self) -> Result<Vec<String>> {
        let body = self.exchange("LIST", b"").await?;
        let text = String::from_utf8_lossy(&body);
        Ok(text.lines().filter(|l| !l.is_empty()).map(|l| l.to_string()).collect())
    }

    /// Ordered chunk keys for a filename; empty if the master doesn't know it.
    pub async fn chunks(&self, filename: &str) -> Result<Vec<String>> {
        let body = self.exchange(&format!("GET_CHUNKS {}", filename), b"").await?;
        let text = String::from_utf8_lossy(&body);
        Ok(text.split_whitespace().map(|s| s.to_string()).collect())
    }

    /// Download and reassemble a file.
    pub async fn download(&self, filename: &str) -> Result<Vec<u8>> {
        self.exchange(&format!("DOWNLOAD {}", filename), b"").await
    }

    async fn exchange(&self, header: &str, payload: &[u8]) -> Result<Vec<u8>> {
        let stream = TcpStream::connect(&self.addr).await?;
        let (rx, mut tx) = stream.into_split();
        proto::write_request(&mut tx, header, payload).await?;

        let mut reader = BufReader::new(rx);
        proto::read_response(&mut reader, self.max_response).await
    }
}
