//! Configuration for minidfs components

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Master configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterConfig {
    /// Bind address for the client-facing listener
    pub bind_addr: SocketAddr,

    /// Chunk-server registry, in registration order. Fixed for the process
    /// lifetime; the replication factor equals the registry size.
    pub registry: Vec<String>,

    /// Acks required per chunk before a CREATE succeeds. Zero means
    /// "majority of the registry".
    #[serde(default)]
    pub write_quorum: usize,

    /// Timeout for a single STORE/RETRIEVE exchange with a chunk server
    #[serde(default = "default_peer_timeout_ms")]
    pub peer_timeout_ms: u64,

    /// Maximum concurrent client connections
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

fn default_peer_timeout_ms() -> u64 {
    5_000
}
fn default_max_connections() -> usize {
    256
}
fn default_max_file_size() -> usize {
    64 * 1024 * 1024
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:50050".parse().unwrap(),
            registry: Vec::new(),
            write_quorum: 0,
            peer_timeout_ms: default_peer_timeout_ms(),
            max_connections: default_max_connections(),
            max_file_size: default_max_file_size(),
        }
    }
}

impl MasterConfig {
    /// Effective ack count for a successful chunk write.
    pub fn effective_quorum(&self) -> usize {
        if self.write_quorum == 0 {
            self.registry.len() / 2 + 1
        } else {
            self.write_quorum
        }
    }

    pub fn peer_timeout(&self) -> Duration {
        Duration::from_millis(self.peer_timeout_ms)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.registry.is_empty() {
            return Err(crate::Error::InvalidConfig(
                "registry must contain at least one chunk server".into(),
            ));
        }
        if self.write_quorum > self.registry.len() {
            return Err(crate::Error::InvalidConfig(format!(
                "write quorum {} exceeds registry size {}",
                self.write_quorum,
                self.registry.len()
            )));
        }
        Ok(())
    }
}

/// Chunk server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkServerConfig {
    /// Bind address for the session listener
    pub bind_addr: SocketAddr,

    /// Directory holding one blob file per chunk key
    pub data_dir: PathBuf,

    /// Maximum accepted chunk size in bytes
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Maximum concurrent sessions
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_max_chunk_size() -> usize {
    64 * 1024 * 1024
}

impl Default for ChunkServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:50052".parse().unwrap(),
            data_dir: PathBuf::from("./chunk-data"),
            max_chunk_size: default_max_chunk_size(),
            max_connections: default_max_connections(),
        }
    }
}

/// Load a config struct from a JSON file. CLI flags take priority over the
/// file; the binaries apply that merge.
pub fn load_from_file<T: for<'de> Deserialize<'de>>(path: &Path) -> crate::Result<T> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| crate::Error::InvalidConfig(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_effective_quorum_defaults_to_majority() {
        let mut config = MasterConfig {
            registry: vec!["a:1".into(), "b:2".into(), "c:3".into()],
            ..Default::default()
        };
        assert_eq!(config.effective_quorum(), 2);

        config.write_quorum = 1;
        assert_eq!(config.effective_quorum(), 1);
    }

    #[test]
    fn test_validate_rejects_empty_registry() {
        let config = MasterConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_quorum() {
        let config = MasterConfig {
            registry: vec!["a:1".into()],
            write_quorum: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"bind_addr": "127.0.0.1:9000", "registry": ["127.0.0.1:9001"]}}"#
        )
        .unwrap();

        let config: MasterConfig = load_from_file(file.path()).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.registry.len(), 1);
        assert_eq!(config.peer_timeout_ms, 5_000);
    }
}
