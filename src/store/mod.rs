//! Storage backends for the trie nodes

mod memory;

pub use memory::MemoryStore;

/// Thread safety marker trait
#[cfg(feature = "multi-thread")]
pub trait ThreadSafe: Send + Sync {}
#[cfg(feature = "multi-thread")]
impl<T: Send + Sync> ThreadSafe for T {}

#[cfg(not(feature = "multi-thread"))]
pub trait ThreadSafe {}
#[cfg(not(feature = "multi-thread"))]
impl<T> ThreadSafe for T {}

/// Content addressed store for the encoded trie nodes.
///
/// This trait must be implemented by any storage backend used with the trie.
/// Nodes are written under their digest and never rewritten with a different
/// content, so a `set` of an existing digest can be ignored.
pub trait NodeStore<const HASH_SIZE: usize>: ThreadSafe {
    /// The error type for store operations
    type StoreError;

    /// Get the encoded node stored under `digest`, if any.
    fn get(&self, digest: &[u8; HASH_SIZE]) -> Result<Option<Vec<u8>>, Self::StoreError>;

    /// Store an encoded node under its digest.
    fn set(&mut self, digest: [u8; HASH_SIZE], node: Vec<u8>) -> Result<(), Self::StoreError>;

    /// Delete the node stored under `digest`. Deleting a missing node is not an
    /// error.
    fn delete(&mut self, digest: &[u8; HASH_SIZE]) -> Result<(), Self::StoreError>;
}
