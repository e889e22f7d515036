mod encoding;
mod extension;
mod inner;
mod lazy;
mod leaf;

use sha2::{Digest, Sha256};
use std::fmt::Display;

pub use encoding::EncodingError;
pub use extension::ExtensionNode;
pub use inner::InnerNode;
pub use lazy::LazyNode;
pub use leaf::LeafNode;

pub(crate) use encoding::{decode, Decoded, INNER_PREFIX, LEAF_PREFIX};

impl Hasher<32> for Sha256 {
    fn hash(data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hasher.finalize().into()
    }
}

/// Aggregated weight of a subtree.
pub type Sum = u64;
/// Number of non-empty leaves in a subtree.
pub type Count = u64;

/// Simple hash trait required to derive paths and hash the nodes in the trie
///
/// # Type Parameters
/// * `HASH_SIZE` - The size of the hash digest in bytes
pub trait Hasher<const HASH_SIZE: usize> {
    fn hash(data: &[u8]) -> [u8; HASH_SIZE];
}

/// All possible nodes in the trie.
///
/// Nodes are immutable once built. Children are shared through [`std::sync::Arc`] so
/// replacing a node on a path only reallocates that path.
///
/// # Type Parameters
/// * `HASH_SIZE` - The size of the hash digest in bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<const HASH_SIZE: usize> {
    /// The canonical empty subtree. Never persisted.
    Placeholder,
    /// A stored key.
    Leaf(LeafNode<HASH_SIZE>),
    /// A binary split with two non-empty children.
    Inner(InnerNode<HASH_SIZE>),
    /// A compressed run of single-child inner nodes.
    Extension(ExtensionNode<HASH_SIZE>),
    /// A subtree that has not been loaded from the store yet.
    Lazy(LazyNode<HASH_SIZE>),
}

impl<const HASH_SIZE: usize> Node<HASH_SIZE> {
    /// Digest of the placeholder node.
    pub const PLACEHOLDER_DIGEST: [u8; HASH_SIZE] = [0; HASH_SIZE];

    /// Returns the digest of the node. NO HASHING IS DONE HERE.
    pub fn digest(&self) -> [u8; HASH_SIZE] {
        match self {
            Self::Placeholder => Self::PLACEHOLDER_DIGEST,
            Self::Leaf(leaf) => leaf.digest(),
            Self::Inner(inner) => inner.digest(),
            Self::Extension(extension) => extension.digest(),
            Self::Lazy(lazy) => lazy.digest(),
        }
    }

    /// Returns the sum of a [`Node`]. NO OPERATION IS DONE HERE.
    pub fn sum(&self) -> Sum {
        match self {
            Self::Placeholder => 0,
            Self::Leaf(leaf) => leaf.weight(),
            Self::Inner(inner) => inner.sum(),
            Self::Extension(extension) => extension.sum(),
            Self::Lazy(lazy) => lazy.sum(),
        }
    }

    /// Returns the number of non-empty leaves below this node.
    pub fn count(&self) -> Count {
        match self {
            Self::Placeholder => 0,
            Self::Leaf(leaf) => leaf.count(),
            Self::Inner(inner) => inner.count(),
            Self::Extension(extension) => extension.count(),
            Self::Lazy(lazy) => lazy.count(),
        }
    }

    /// Whether the node is already written to the store under its digest.
    pub fn is_persisted(&self) -> bool {
        match self {
            Self::Placeholder => false,
            Self::Leaf(leaf) => leaf.is_persisted(),
            Self::Inner(inner) => inner.is_persisted(),
            Self::Extension(extension) => extension.is_persisted(),
            Self::Lazy(_) => true,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }
}

impl<const HASH_SIZE: usize> Display for Node<HASH_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Placeholder => write!(
                f,
                "Placeholder {{ hash: {} }}",
                hex::encode(Self::PLACEHOLDER_DIGEST.as_slice())
            ),
            Self::Leaf(leaf) => write!(f, "{}", leaf),
            Self::Inner(inner) => write!(f, "{}", inner),
            Self::Extension(extension) => write!(f, "{}", extension),
            Self::Lazy(lazy) => write!(f, "{}", lazy),
        }
    }
}
