//! Content preprocessing for embedding generation.

/// Maximum content length for embedding input (characters, not tokens)
const MAX_CONTENT_LENGTH: usize = 2048;

/// Trim and cap message text before embedding.
///
/// Returns `None` for blank content.
pub fn preprocess_content(content: &str) -> Option<String> {
    let content = content.trim();
    if content.is_empty() {
        return None;
    }

    Some(content.chars().take(MAX_CONTENT_LENGTH).collect())
}

/// Hash of the raw content, used to decide whether a cached vector is stale.
pub fn content_hash(content: &str) -> u64 {
    use sha2::{Digest, Sha256};

    let digest = Sha256::digest(content.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_content_returns_none() {
        assert!(preprocess_content("").is_none());
        assert!(preprocess_content(" \n\t ").is_none());
    }

    #[test]
    fn test_truncates_on_char_boundary() {
        let long = "移".repeat(3000);
        let content = preprocess_content(&long).unwrap();
        assert_eq!(content.chars().count(), MAX_CONTENT_LENGTH);
    }

    #[test]
    fn test_short_content_untouched() {
        assert_eq!(preprocess_content("  Fee: £30 million "), Some("Fee: £30 million".to_string()));
    }

    #[test]
    fn test_content_hash_stable_and_distinct() {
        assert_eq!(content_hash("a"), content_hash("a"));
        assert_ne!(content_hash("a"), content_hash("b"));
    }
}
