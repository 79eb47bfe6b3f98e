//! Payload partitioning and chunk key derivation
//!
//! A payload of `L` bytes is cut into contiguous shards of `ceil(L/R)`
//! bytes, `R` being the registry size. Every shard except the last is
//! full-sized; the last holds the remainder. An empty payload yields no
//! chunks.

use bytes::Bytes;

/// Deterministic chunk key for (filename, index).
pub fn chunk_key(filename: &str, index: usize) -> String {
    format!("{}_chunk{}", filename, index)
}

/// Split a payload into shards for a registry of `fanout` members.
///
/// Slices share the underlying buffer; no payload bytes are copied.
pub fn split_payload(payload: &Bytes, fanout: usize) -> Vec<Bytes> {
    assert!(fanout > 0, "fanout must be positive");

    if payload.is_empty() {
        return Vec::new();
    }

    let chunk_size = payload.len().div_ceil(fanout);
    (0..payload.len())
        .step_by(chunk_size)
        .map(|start| payload.slice(start..usize::min(start + chunk_size, payload.len())))
        .collect()
}

/// Pair every shard of `payload` with its chunk key.
pub fn plan_chunks(filename: &str, payload: &Bytes, fanout: usize) -> Vec<(String, Bytes)> {
    split_payload(payload, fanout)
        .into_iter()
        .enumerate()
        .map(|(i, shard)| (chunk_key(filename, i), shard))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_key_format() {
        assert_eq!(chunk_key("a.txt", 0), "a.txt_chunk0");
        assert_eq!(chunk_key("a.txt", 12), "a.txt_chunk12");
    }

    #[test]
    fn test_split_even() {
        let payload = Bytes::from_static(b"HELLOWORLD");
        let chunks = split_payload(&payload, 2);
        assert_eq!(chunks, vec![Bytes::from_static(b"HELLO"), Bytes::from_static(b"WORLD")]);
    }

    #[test]
    fn test_split_with_remainder() {
        let payload = Bytes::from_static(b"HELLOWORLD");
        let chunks = split_payload(&payload, 3);
        // ceil(10/3) = 4 bytes per shard, last holds the remainder
        assert_eq!(
            chunks,
            vec![
                Bytes::from_static(b"HELL"),
                Bytes::from_static(b"OWOR"),
                Bytes::from_static(b"LD"),
            ]
        );
    }

    #[test]
    fn test_split_shorter_than_fanout() {
        let payload = Bytes::from_static(b"AB");
        let chunks = split_payload(&payload, 3);
        assert_eq!(chunks, vec![Bytes::from_static(b"A"), Bytes::from_static(b"B")]);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_payload(&Bytes::new(), 4).is_empty());
    }

    #[test]
    fn test_concatenation_reconstructs_payload() {
        let payload = Bytes::from(vec![7u8; 1031]);
        for fanout in 1..=8 {
            let joined: Vec<u8> = split_payload(&payload, fanout)
                .iter()
                .flat_map(|c| c.iter().copied())
                .collect();
            assert_eq!(joined, payload.to_vec(), "fanout {}", fanout);
        }
    }

    #[test]
    fn test_plan_chunks_indices_follow_byte_order() {
        let payload = Bytes::from_static(b"HELLOWORLD");
        let plan = plan_chunks("a.txt", &payload, 2);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0], ("a.txt_chunk0".to_string(), Bytes::from_static(b"HELLO")));
        assert_eq!(plan[1], ("a.txt_chunk1".to_string(), Bytes::from_static(b"WORLD")));
    }
}
