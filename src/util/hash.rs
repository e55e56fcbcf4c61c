//! Content fingerprints for rendered documents.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `content`.
pub fn fingerprint(content: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(content.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_known_value() {
        assert_eq!(
            fingerprint("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_fingerprint_str_matches_bytes() {
        assert_eq!(fingerprint("adapterkit"), fingerprint(b"adapterkit"));
    }
}
