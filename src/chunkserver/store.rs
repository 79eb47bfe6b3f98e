//! Directory-backed chunk storage
//!
//! One blob file per chunk key, stored flat under the data directory. Keys
//! are percent-encoded before touching the filesystem so path separators in
//! a key can never escape the storage root. An in-memory CRC32 index is
//! rebuilt by scanning the directory at startup and checked on every read.

use crate::common::{crc32, decode_key, encode_key, Error, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const CHUNK_EXT: &str = "chunk";

#[derive(Debug, Clone, Copy)]
struct ChunkInfo {
    crc: u32,
    size: u64,
}

/// Chunk store statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub total_chunks: usize,
    pub total_bytes: u64,
}

/// Keyed blob store backed by a local directory
pub struct ChunkStore {
    data_dir: PathBuf,
    index: HashMap<String, ChunkInfo>,
}

impl ChunkStore {
    /// Open or create a chunk store, rebuilding the CRC index from disk.
    pub fn open(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)?;

        let mut index = HashMap::new();
        for entry in fs::read_dir(data_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some(CHUNK_EXT) {
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let key = match decode_key(stem) {
                Ok(key) => key,
                Err(_) => {
                    tracing::warn!("Skipping undecodable blob file {:?}", path);
                    continue;
                }
            };

            let data = fs::read(&path)?;
            index.insert(
                key,
                ChunkInfo {
                    crc: crc32(&data),
                    size: data.len() as u64,
                },
            );
        }

        tracing::info!(
            "ChunkStore opened at {:?}: {} chunks indexed",
            data_dir,
            index.len()
        );

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            index,
        })
    }

    /// Persist a blob under `key`, overwriting any existing blob.
    pub fn put(&mut self, key: &str, data: &[u8]) -> Result<()> {
        fs::write(self.blob_path(key), data)?;
        self.index.insert(
            key.to_string(),
            ChunkInfo {
                crc: crc32(data),
                size: data.len() as u64,
            },
        );
        Ok(())
    }

    /// Fetch the blob stored under `key`, verifying its checksum.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let Some(info) = self.index.get(key) else {
            return Ok(None);
        };

        let data = match fs::read(self.blob_path(key)) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let actual = crc32(&data);
        if actual != info.crc {
            return Err(Error::Corrupted {
                key: key.to_string(),
                expected: info.crc,
                actual,
            });
        }

        Ok(Some(data))
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            total_chunks: self.index.len(),
            total_bytes: self.index.values().map(|info| info.size).sum(),
        }
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.{}", encode_key(key), CHUNK_EXT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_put_get_round_trip() {
        let dir = tempdir().unwrap();
        let mut store = ChunkStore::open(dir.path()).unwrap();

        store.put("a.txt_chunk0", b"HELLO").unwrap();
        store.put("a.txt_chunk1", b"WORLD").unwrap();

        assert_eq!(store.get("a.txt_chunk0").unwrap().unwrap(), b"HELLO");
        assert_eq!(store.get("a.txt_chunk1").unwrap().unwrap(), b"WORLD");
        assert!(store.get("missing_chunk0").unwrap().is_none());
    }

    #[test]
    fn test_overwrite_is_last_writer() {
        let dir = tempdir().unwrap();
        let mut store = ChunkStore::open(dir.path()).unwrap();

        store.put("a.txt_chunk0", b"first").unwrap();
        store.put("a.txt_chunk0", b"second").unwrap();

        assert_eq!(store.get("a.txt_chunk0").unwrap().unwrap(), b"second");
        assert_eq!(store.stats().total_chunks, 1);
    }

    #[test]
    fn test_index_rebuilt_on_reopen() {
        let dir = tempdir().unwrap();

        {
            let mut store = ChunkStore::open(dir.path()).unwrap();
            store.put("a.txt_chunk0", b"HELLO").unwrap();
            store.put("dir/with/slashes_chunk1", b"WORLD").unwrap();
        }

        let store = ChunkStore::open(dir.path()).unwrap();
        assert_eq!(store.get("a.txt_chunk0").unwrap().unwrap(), b"HELLO");
        assert_eq!(
            store.get("dir/with/slashes_chunk1").unwrap().unwrap(),
            b"WORLD"
        );
        assert_eq!(store.stats().total_chunks, 2);
    }

    #[test]
    fn test_path_unsafe_keys_stay_inside_data_dir() {
        let dir = tempdir().unwrap();
        let mut store = ChunkStore::open(dir.path()).unwrap();

        store.put("../escape_chunk0", b"data").unwrap();

        // The blob landed inside the data dir, not its parent.
        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(store.get("../escape_chunk0").unwrap().unwrap(), b"data");
    }

    #[test]
    fn test_corrupted_blob_detected() {
        let dir = tempdir().unwrap();
        let mut store = ChunkStore::open(dir.path()).unwrap();
        store.put("a.txt_chunk0", b"HELLO").unwrap();

        // Flip the on-disk bytes behind the store's back.
        let path = dir.path().join(format!("{}.{}", encode_key("a.txt_chunk0"), CHUNK_EXT));
        fs::write(&path, b"XELLO").unwrap();

        let err = store.get("a.txt_chunk0").unwrap_err();
        assert!(matches!(err, Error::Corrupted { .. }));
    }
}
