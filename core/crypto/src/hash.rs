//! Cryptographic hashing with constant-time digest verification.
//!
//! Digests are exchanged as lowercase hex strings. Verification decodes the
//! expected digest and compares in constant time, so integrity checks do not
//! leak how many leading bytes matched.

use sha2::{Digest, Sha256, Sha512};
use sha3::{Sha3_256, Sha3_512};
use subtle::ConstantTimeEq;

use seallink_common::HashAlgorithm;

/// Compute the raw digest of `data`.
pub fn digest(algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    match algorithm {
        HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        HashAlgorithm::Sha3_256 => Sha3_256::digest(data).to_vec(),
        HashAlgorithm::Sha3_512 => Sha3_512::digest(data).to_vec(),
    }
}

/// Compute the lowercase hex digest of `data`.
pub fn digest_hex(algorithm: HashAlgorithm, data: &[u8]) -> String {
    hex::encode(digest(algorithm, data))
}

/// Verify `data` against an expected hex digest in constant time.
///
/// Returns `false` for a malformed expected digest rather than erroring;
/// a digest that cannot be decoded can never match.
pub fn verify_digest(algorithm: HashAlgorithm, data: &[u8], expected_hex: &str) -> bool {
    let computed = digest(algorithm, data);
    let Ok(expected) = hex::decode(expected_hex) else {
        return false;
    };
    computed.ct_eq(&expected).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sha256_vector() {
        // SHA-256("abc")
        assert_eq!(
            digest_hex(HashAlgorithm::Sha256, b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_known_sha3_256_vector() {
        // SHA3-256("abc")
        assert_eq!(
            digest_hex(HashAlgorithm::Sha3_256, b"abc"),
            "3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532"
        );
    }

    #[test]
    fn test_digest_lengths() {
        for alg in [
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha512,
            HashAlgorithm::Sha3_256,
            HashAlgorithm::Sha3_512,
        ] {
            assert_eq!(digest(alg, b"data").len(), alg.digest_bytes());
            assert_eq!(digest_hex(alg, b"data").len(), alg.digest_bytes() * 2);
        }
    }

    #[test]
    fn test_verify_digest() {
        let expected = digest_hex(HashAlgorithm::Sha512, b"hello world");
        assert!(verify_digest(HashAlgorithm::Sha512, b"hello world", &expected));
        assert!(!verify_digest(HashAlgorithm::Sha512, b"hello worlD", &expected));
    }

    #[test]
    fn test_verify_rejects_malformed_hex() {
        assert!(!verify_digest(HashAlgorithm::Sha256, b"data", "zzzz"));
        assert!(!verify_digest(HashAlgorithm::Sha256, b"data", "abcd"));
    }

    #[test]
    fn test_determinism() {
        assert_eq!(
            digest_hex(HashAlgorithm::Sha3_512, b"stable"),
            digest_hex(HashAlgorithm::Sha3_512, b"stable")
        );
    }
}
