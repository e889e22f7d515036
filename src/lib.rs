//! Sparse Merkle tries
//!
//! This crate provides an authenticated key value map, a Sparse Merkle Trie
//! (SMT), and its weighted variant, a Sparse Merkle Sum Trie (SMST), in which
//! every leaf carries a weight and every digest commits to the total weight
//! below it.
//!
//! The tries support:
//! - Path compression through extension nodes
//! - Lazy loading of the nodes from the store
//! - Incremental sum and non-empty leaf count at each node
//! - Transactional commits pruning the replaced nodes
//! - Membership and non-membership proofs
//! - Flexible storage backend through the `NodeStore` trait

mod error;
mod node;
mod path;
mod proof;
mod scheme;
mod store;
mod trie;

pub use error::TrieError;
pub use node::{
    Count, EncodingError, ExtensionNode, Hasher, InnerNode, LazyNode, LeafNode, Node, Sum,
};
pub use proof::{CompressedProof, Proof, ProofError, ProofNode, ProofTerminal};
pub use scheme::DigestScheme;
pub use store::{MemoryStore, NodeStore, ThreadSafe};
pub use trie::{SparseMerkleSumTrie, SparseMerkleTrie};

#[cfg(test)]
mod tests;
