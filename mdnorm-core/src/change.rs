// Change detection
//
// Comparison is byte-exact and happens on re-encoded output, so a CRLF file
// that the rules left alone compares equal to its source even though the
// rules themselves worked on LF text.

use sha2::{Digest, Sha256};

/// True when `output` differs from `original` in any byte
pub fn detect_change(original: &[u8], output: &[u8]) -> bool {
    original != output
}

/// Hex SHA-256 of file content, for reports
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Document, RuleEngine};

    #[test]
    fn test_identical_bytes_unchanged() {
        assert!(!detect_change(b"# A\n", b"# A\n"));
        assert!(detect_change(b"# A\n", b"# A\r\n"));
    }

    #[test]
    fn test_clean_crlf_document_is_unchanged() {
        let raw = b"# Title\r\n\r\nText\r\n";
        let doc = Document::from_bytes(raw).unwrap();
        let result = RuleEngine::default().normalize(&doc).unwrap();
        assert!(!detect_change(raw, result.output_text.as_bytes()));
        assert!(!result.changed);
    }

    #[test]
    fn test_hash_consistency() {
        assert_eq!(content_hash(b"abc"), content_hash(b"abc"));
        assert_ne!(content_hash(b"abc"), content_hash(b"abd"));
        assert_eq!(content_hash(b"").len(), 64);
    }
}
