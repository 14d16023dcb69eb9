//! Merkle tree over fixed-size content chunks.
//!
//! Leaves are the hex SHA-256 digests of each chunk. Internal nodes hash the
//! UTF-8 concatenation of their children's hex strings, and an odd node at
//! any level is paired with itself. This keeps every node a printable string
//! that can be stored or shipped as-is.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use seallink_common::{Error, Result};

/// Default chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Which side a proof sibling sits on relative to the running hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// Inclusion proof for a single chunk.
///
/// Carries everything a verifier needs; verification is a pure function of
/// the proof and does not require the tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerkleProof {
    pub chunk_index: usize,
    pub chunk_hash: String,
    /// Sibling hashes from leaf level upward.
    pub siblings: Vec<(String, Side)>,
    pub root_hash: String,
}

/// Merkle tree with all intermediate levels retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerkleTree {
    chunk_size: usize,
    total_size: usize,
    /// `levels[0]` holds the leaf hashes; the last level holds the root.
    levels: Vec<Vec<String>>,
}

fn hash_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

impl MerkleTree {
    /// Build a tree over `data` split into `chunk_size`-byte chunks.
    ///
    /// The final chunk may be short. Empty input produces an empty tree
    /// whose root is the empty string.
    ///
    /// # Panics
    /// Panics if `chunk_size` is zero.
    pub fn new(data: &[u8], chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be nonzero");

        let leaves: Vec<String> = data.chunks(chunk_size).map(hash_hex).collect();
        let levels = Self::build_levels(leaves);
        Self {
            chunk_size,
            total_size: data.len(),
            levels,
        }
    }

    /// Build with the default 4 KiB chunk size.
    pub fn with_default_chunks(data: &[u8]) -> Self {
        Self::new(data, DEFAULT_CHUNK_SIZE)
    }

    fn build_levels(leaves: Vec<String>) -> Vec<Vec<String>> {
        if leaves.is_empty() {
            return Vec::new();
        }
        let mut levels = vec![leaves];
        while levels[levels.len() - 1].len() > 1 {
            let current = &levels[levels.len() - 1];
            let mut next = Vec::with_capacity(current.len().div_ceil(2));
            for pair in current.chunks(2) {
                let left = &pair[0];
                let right = pair.get(1).unwrap_or(left);
                next.push(hash_hex(format!("{left}{right}").as_bytes()));
            }
            levels.push(next);
        }
        levels
    }

    /// The root hash, or the empty string for an empty tree.
    pub fn root(&self) -> String {
        self.levels
            .last()
            .and_then(|level| level.first())
            .cloned()
            .unwrap_or_default()
    }

    /// Number of leaf chunks.
    pub fn chunk_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Chunk size the tree was built with.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Total content size in bytes.
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Tree height: the number of hashing levels above the leaves.
    pub fn height(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    /// Generate an inclusion proof for the chunk at `index`.
    ///
    /// # Errors
    /// Validation error when the index is out of range.
    pub fn generate_proof(&self, index: usize) -> Result<MerkleProof> {
        let chunk_hash = self
            .levels
            .first()
            .and_then(|leaves| leaves.get(index))
            .cloned()
            .ok_or_else(|| {
                Error::Validation(format!(
                    "chunk index {index} out of range for {} chunks",
                    self.chunk_count()
                ))
            })?;

        let mut siblings = Vec::with_capacity(self.height());
        let mut idx = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let (sibling_idx, side) = if idx % 2 == 0 {
                (idx + 1, Side::Right)
            } else {
                (idx - 1, Side::Left)
            };
            // An unpaired node hashes against its own duplicate.
            let sibling = level.get(sibling_idx).unwrap_or(&level[idx]);
            siblings.push((sibling.clone(), side));
            idx /= 2;
        }

        Ok(MerkleProof {
            chunk_index: index,
            chunk_hash,
            siblings,
            root_hash: self.root(),
        })
    }

    /// Check a proof by recomputing the path to its root.
    pub fn verify_proof(proof: &MerkleProof) -> bool {
        let mut current = proof.chunk_hash.clone();
        for (sibling, side) in &proof.siblings {
            let combined = match side {
                Side::Right => format!("{current}{sibling}"),
                Side::Left => format!("{sibling}{current}"),
            };
            current = hash_hex(combined.as_bytes());
        }
        current == proof.root_hash
    }

    /// Verify that `chunk` is the content of the chunk at `proof.chunk_index`.
    pub fn verify_chunk(chunk: &[u8], proof: &MerkleProof) -> bool {
        hash_hex(chunk) == proof.chunk_hash && Self::verify_proof(proof)
    }

    /// Rebuild a tree over `data` and compare against an expected root.
    pub fn verify_root(data: &[u8], chunk_size: usize, expected_root: &str) -> bool {
        Self::new(data, chunk_size).root() == expected_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_data() {
        let tree = MerkleTree::with_default_chunks(b"");
        assert_eq!(tree.root(), "");
        assert_eq!(tree.chunk_count(), 0);
        assert_eq!(tree.height(), 0);
        assert!(matches!(
            tree.generate_proof(0),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_single_chunk_root_is_leaf() {
        let tree = MerkleTree::with_default_chunks(b"small content");
        assert_eq!(tree.chunk_count(), 1);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.root(), hash_hex(b"small content"));

        let proof = tree.generate_proof(0).unwrap();
        assert!(proof.siblings.is_empty());
        assert!(MerkleTree::verify_proof(&proof));
    }

    #[test]
    fn test_two_chunks() {
        let data = vec![0xAB; 8];
        let tree = MerkleTree::new(&data, 4);
        assert_eq!(tree.chunk_count(), 2);
        assert_eq!(tree.height(), 1);

        let left = hash_hex(&data[..4]);
        let right = hash_hex(&data[4..]);
        let expected = hash_hex(format!("{left}{right}").as_bytes());
        assert_eq!(tree.root(), expected);
    }

    #[test]
    fn test_ten_kilobytes_default_chunks() {
        // 10 kB over 4096-byte chunks: 4096 + 4096 + 1808, two hashing levels.
        let data = vec![0x5A; 10_000];
        let tree = MerkleTree::with_default_chunks(&data);
        assert_eq!(tree.chunk_count(), 3);
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.total_size(), 10_000);

        let root = tree.root();
        assert_eq!(root.len(), 64);
        assert!(root.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(MerkleTree::verify_root(&data, DEFAULT_CHUNK_SIZE, &root));
    }

    #[test]
    fn test_odd_leaf_duplicates_itself() {
        let data = vec![1u8, 2, 3];
        let tree = MerkleTree::new(&data, 1);

        let h0 = hash_hex(&[1]);
        let h1 = hash_hex(&[2]);
        let h2 = hash_hex(&[3]);
        let p01 = hash_hex(format!("{h0}{h1}").as_bytes());
        let p22 = hash_hex(format!("{h2}{h2}").as_bytes());
        let root = hash_hex(format!("{p01}{p22}").as_bytes());
        assert_eq!(tree.root(), root);

        // The proof for the unpaired leaf carries its own hash as sibling.
        let proof = tree.generate_proof(2).unwrap();
        assert_eq!(proof.siblings[0], (h2, Side::Right));
        assert!(MerkleTree::verify_proof(&proof));
    }

    #[test]
    fn test_all_proofs_verify() {
        let data: Vec<u8> = (0..100u8).collect();
        let tree = MerkleTree::new(&data, 7);
        for i in 0..tree.chunk_count() {
            let proof = tree.generate_proof(i).unwrap();
            assert_eq!(proof.chunk_index, i);
            assert!(MerkleTree::verify_proof(&proof), "proof {i} failed");
        }
        assert!(matches!(
            tree.generate_proof(tree.chunk_count()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_verify_chunk_detects_substitution() {
        let data: Vec<u8> = (0..64).collect();
        let tree = MerkleTree::new(&data, 16);
        let proof = tree.generate_proof(1).unwrap();

        assert!(MerkleTree::verify_chunk(&data[16..32], &proof));
        assert!(!MerkleTree::verify_chunk(&data[0..16], &proof));
        assert!(!MerkleTree::verify_chunk(b"something else!!", &proof));
    }

    #[test]
    fn test_forged_sibling_fails() {
        let data: Vec<u8> = (0..32).collect();
        let tree = MerkleTree::new(&data, 8);
        let mut proof = tree.generate_proof(0).unwrap();
        proof.siblings[0].0 = hash_hex(b"forged");
        assert!(!MerkleTree::verify_proof(&proof));
    }

    #[test]
    fn test_root_changes_with_content() {
        let a = MerkleTree::new(b"identical prefix A", 4);
        let b = MerkleTree::new(b"identical prefix B", 4);
        assert_ne!(a.root(), b.root());
    }

    #[test]
    #[should_panic(expected = "chunk size must be nonzero")]
    fn test_zero_chunk_size_panics() {
        let _ = MerkleTree::new(b"data", 0);
    }

    #[test]
    fn test_side_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Side::Left).unwrap(), "\"left\"");
        assert_eq!(serde_json::to_string(&Side::Right).unwrap(), "\"right\"");
    }

    #[test]
    fn test_proof_serde_roundtrip() {
        let tree = MerkleTree::new(&[7u8; 100], 9);
        let proof = tree.generate_proof(3).unwrap();
        let json = serde_json::to_string(&proof).unwrap();
        let restored: MerkleProof = serde_json::from_str(&json).unwrap();
        assert!(MerkleTree::verify_proof(&restored));
    }

    proptest! {
        #[test]
        fn prop_deterministic(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let a = MerkleTree::new(&data, 128);
            let b = MerkleTree::new(&data, 128);
            prop_assert_eq!(a.root(), b.root());
        }

        #[test]
        fn prop_bit_flip_changes_root(
            data in proptest::collection::vec(any::<u8>(), 1..2048),
            flip in any::<usize>(),
        ) {
            let tree = MerkleTree::new(&data, 64);
            let mut mutated = data.clone();
            let idx = flip % mutated.len();
            mutated[idx] ^= 0x01;
            prop_assert!(!MerkleTree::verify_root(&mutated, 64, &tree.root()));
        }

        #[test]
        fn prop_every_proof_verifies(
            data in proptest::collection::vec(any::<u8>(), 1..1024),
            chunk_size in 1usize..200,
        ) {
            let tree = MerkleTree::new(&data, chunk_size);
            for i in 0..tree.chunk_count() {
                let proof = tree.generate_proof(i).unwrap();
                prop_assert!(MerkleTree::verify_proof(&proof));
            }
        }
    }
}
