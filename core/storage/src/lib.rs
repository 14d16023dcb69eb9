//! Persistence layer for encrypted records, share links, and policies.
//!
//! Storage is expressed as traits so the engine never depends on a concrete
//! backend; the in-memory implementation backs tests and single-process
//! deployments.

pub mod memory;
pub mod records;
pub mod store;

pub use memory::{MemoryDataStore, MemoryPolicyStore, MemoryShareStore};
pub use records::{DataRecord, ShareMetadata, ShareRecord, ShareState};
pub use store::{DataStore, PolicyStore, ShareStore};
