//! Common utilities and types shared across minidfs

pub mod config;
pub mod error;
pub mod proto;
pub mod utils;

pub use config::{load_from_file, ChunkServerConfig, MasterConfig};
pub use error::{Error, Result};
pub use utils::{crc32, decode_key, encode_key, format_bytes, validate_filename};
