//! Master implementation
//!
//! The master owns the file → chunk-key metadata and the chunk-server
//! registry, and drives the chunk lifecycle:
//! - CREATE: partition the payload and replicate every chunk to every
//!   registry member, awaited at a write quorum
//! - DOWNLOAD: pull each chunk from the first replica that answers and
//!   concatenate in index order
//! - LIST / GET_CHUNKS: metadata only

pub mod chunk_client;
pub mod chunking;
pub mod metadata;
pub mod replication;
pub mod server;

pub use server::MasterServer;
