//! Error types for minidfs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Protocol Errors ===
    #[error("Protocol error: {0}")]
    Protocol(String),

    // === Storage Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Corrupted chunk {key}: expected crc {expected:08x}, got {actual:08x}")]
    Corrupted {
        key: String,
        expected: u32,
        actual: u32,
    },

    // === Network Errors ===
    #[error("Peer unavailable: {addr}: {reason}")]
    PeerUnavailable { addr: String, reason: String },

    #[error("Operation timeout: {0}")]
    Timeout(String),

    // === Replication Errors ===
    #[error("Quorum failed for chunk {key}: need {needed} acks, got {acked}")]
    QuorumFailed {
        key: String,
        needed: usize,
        acked: usize,
    },

    #[error("No replica available for chunk {0}")]
    ChunkUnavailable(String),

    // === Config Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // === Generic ===
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Remote error ({code}): {message}")]
    Remote { code: String, message: String },
}

impl Error {
    /// Is this a peer-side failure the caller may skip past (try the next
    /// replica) rather than escalate?
    pub fn is_peer_failure(&self) -> bool {
        matches!(
            self,
            Error::PeerUnavailable { .. } | Error::Timeout(_) | Error::Io(_)
        )
    }

    /// Wire status code for the ERR frame.
    pub fn wire_code(&self) -> &'static str {
        match self {
            Error::Protocol(_) | Error::InvalidConfig(_) => "bad_request",
            Error::NotFound(_) => "not_found",
            Error::PeerUnavailable { .. }
            | Error::Timeout(_)
            | Error::QuorumFailed { .. }
            | Error::ChunkUnavailable(_) => "unavailable",
            Error::Corrupted { .. } => "corrupted",
            Error::Remote { code, .. } => match code.as_str() {
                "bad_request" => "bad_request",
                "not_found" => "not_found",
                "unavailable" => "unavailable",
                "corrupted" => "corrupted",
                _ => "internal",
            },
            _ => "internal",
        }
    }

    /// Rebuild an error from an ERR frame received off the wire.
    pub fn from_wire(code: &str, message: String) -> Self {
        match code {
            "not_found" => Error::NotFound(message),
            _ => Error::Remote {
                code: code.to_string(),
                message,
            },
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_code_mapping() {
        assert_eq!(Error::NotFound("x".into()).wire_code(), "not_found");
        assert_eq!(Error::Protocol("bad".into()).wire_code(), "bad_request");
        assert_eq!(
            Error::ChunkUnavailable("a_chunk0".into()).wire_code(),
            "unavailable"
        );
        assert_eq!(Error::Internal("boom".into()).wire_code(), "internal");
    }

    #[test]
    fn test_from_wire_round_trip() {
        let err = Error::from_wire("not_found", "file a.txt".into());
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(err.wire_code(), "not_found");

        let err = Error::from_wire("corrupted", "crc mismatch".into());
        assert_eq!(err.wire_code(), "corrupted");
    }

    #[test]
    fn test_peer_failure_classification() {
        let err = Error::PeerUnavailable {
            addr: "127.0.0.1:1".into(),
            reason: "refused".into(),
        };
        assert!(err.is_peer_failure());
        assert!(!Error::NotFound("k".into()).is_peer_failure());
    }
}
