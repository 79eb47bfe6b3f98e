//! # minidfs
//!
//! A minimal distributed file store:
//! - a master partitions uploads into chunks and replicates every chunk to
//!   every registered chunk server
//! - chunk servers persist blobs on the local filesystem, one file per key
//! - downloads reassemble chunks from the first replica that answers
//! - plain TCP, one command per connection, structured status responses
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  CREATE/LIST/GET_CHUNKS/DOWNLOAD  ┌─────────────┐
//! │    Client    │──────────────────────────────────▶│   Master    │
//! └──────────────┘                                   │ (metadata,  │
//!                                                    │  registry)  │
//!                                                    └──────┬──────┘
//!                                         STORE / RETRIEVE │
//!                    ┌──────────────────┬───────────────────┤
//!                    │                  │                   │
//!             ┌──────▼──────┐    ┌──────▼──────┐     ┌──────▼──────┐
//!             │ Chunk srv 1 │    │ Chunk srv 2 │     │ Chunk srv N │
//!             │ (all chunks)│    │ (all chunks)│     │ (all chunks)│
//!             └─────────────┘    └─────────────┘     └─────────────┘
//! ```
//!
//! File metadata lives only in the master's memory; chunk blobs are the
//! only durable state.
//!
//! ## Usage
//!
//! ### Start chunk servers
//! ```bash
//! minidfs-chunkserver serve --bind 0.0.0.0:50052 --data-dir ./chunk-a
//! minidfs-chunkserver serve --bind 0.0.0.0:50054 --data-dir ./chunk-b
//! ```
//!
//! ### Start the master
//! ```bash
//! minidfs-master serve \
//!   --bind 0.0.0.0:50050 \
//!   --peers 127.0.0.1:50052,127.0.0.1:50054
//! ```
//!
//! ### Use the CLI
//! ```bash
//! minidfs --master 127.0.0.1:50050 upload ./report.pdf
//! minidfs --master 127.0.0.1:50050 list
//! minidfs --master 127.0.0.1:50050 chunks report.pdf
//! minidfs --master 127.0.0.1:50050 download report.pdf --output ./report.pdf
//! ```

pub mod chunkserver;
pub mod client;
pub mod common;
pub mod master;

// Re-export commonly used types
pub use chunkserver::ChunkServer;
pub use client::MasterClient;
pub use common::{ChunkServerConfig, Error, MasterConfig, Result};
pub use master::MasterServer;

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
