//! Utility functions for minidfs

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Percent-encoding set for chunk keys used as file names (includes path
/// separators, %, and control chars)
const KEY_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b'/')
    .add(b'\\')
    .add(b'%')
    .add(b' ')
    .add(b'.')
    .add(b':');

/// Maximum accepted filename length in bytes
pub const MAX_FILENAME_LEN: usize = 255;

/// Encode a chunk key for filesystem usage
pub fn encode_key(key: &str) -> String {
    utf8_percent_encode(key, KEY_ENCODE_SET).to_string()
}

/// Decode a percent-encoded chunk key back from a file name
pub fn decode_key(encoded: &str) -> crate::Result<String> {
    percent_decode_str(encoded)
        .decode_utf8()
        .map(|s| s.to_string())
        .map_err(|e| crate::Error::Internal(format!("Failed to decode key: {}", e)))
}

/// Validate a client-supplied filename.
///
/// Filenames travel in a space-delimited header line and are embedded into
/// chunk keys, so whitespace and control characters are rejected outright.
pub fn validate_filename(name: &str) -> crate::Result<()> {
    if name.is_empty() {
        return Err(crate::Error::Protocol("filename cannot be empty".into()));
    }

    if name.len() > MAX_FILENAME_LEN {
        return Err(crate::Error::Protocol(format!(
            "filename too long (max {} bytes)",
            MAX_FILENAME_LEN
        )));
    }

    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(crate::Error::Protocol(
            "filename contains whitespace or control characters".into(),
        ));
    }

    Ok(())
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_idx])
}

/// Calculate CRC32 checksum
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_key() {
        let key = "reports/2024.txt_chunk0";
        let encoded = encode_key(key);
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('.'));

        let decoded = decode_key(&encoded).unwrap();
        assert_eq!(decoded, key);
    }

    #[test]
    fn test_encode_key_plain_stays_readable() {
        assert_eq!(encode_key("a_chunk0"), "a_chunk0");
    }

    #[test]
    fn test_validate_filename() {
        assert!(validate_filename("a.txt").is_ok());
        assert!(validate_filename("report-2024_final").is_ok());
        assert!(validate_filename("").is_err());
        assert!(validate_filename("has space").is_err());
        assert!(validate_filename("tab\there").is_err());
        assert!(validate_filename(&"x".repeat(300)).is_err());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0.00 B");
        assert_eq!(format_bytes(1023), "1023.00 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
    }
}
