//! Chunk server implementation
//!
//! A keyed blob store behind a session-oriented TCP listener:
//! - one blob file per chunk key under the data directory
//! - CRC32 index rebuilt at startup, verified on every read
//! - one command per connection, structured status responses

pub mod server;
pub mod store;

pub use server::ChunkServer;
pub use store::ChunkStore;
