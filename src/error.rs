//! Error types for the sparse Merkle trie implementation

use thiserror::Error;

use crate::node::EncodingError;

/// Error type for trie operations
///
/// # Type Parameters
/// * `StoreError` - error type of the [`crate::NodeStore`] backing the trie
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TrieError<StoreError> {
    /// No leaf is stored under the requested key
    #[error("key not found")]
    KeyNotFound,
    /// A node referenced by the trie is not in the store
    #[error("node {0} is referenced by the trie but missing from the store")]
    MissingNode(String),
    /// A persisted node could not be decoded
    #[error("corrupt node: {0}")]
    Encoding(#[from] EncodingError),
    /// Store error
    #[error("node store error: {0}")]
    Store(StoreError),
    /// Sum overflow
    #[error("sum overflow")]
    SumOverflow,
}
