//! Content fingerprints for change detection.

use blake3::Hasher;

/// Compute a 64-character hex BLAKE3 digest of file contents.
#[must_use]
pub fn content_hash(content: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(content.as_bytes());
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(content_hash("// v1"), content_hash("// v1"));
    }

    #[test]
    fn test_hash_differs_on_change() {
        assert_ne!(content_hash("// v1"), content_hash("// v2"));
        assert_ne!(content_hash(""), content_hash(" "));
    }

    #[test]
    fn test_hash_format() {
        let digest = content_hash("hello");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
