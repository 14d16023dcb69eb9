//! Chunk-level integrity verification with Merkle trees.
//!
//! Content is split into fixed-size chunks and hashed into a binary tree
//! whose root commits to every byte. Individual chunks can then be proven
//! against the root without rehashing the whole payload.

pub mod merkle;

pub use merkle::{MerkleProof, MerkleTree, Side, DEFAULT_CHUNK_SIZE};
