use std::fmt::Display;
use std::sync::Arc;

use super::{Count, Node, Sum};

/// An inner node is the binary split of the trie at one depth. Both of its
/// children are non-empty: a split with a single populated side is either a
/// floating leaf or part of an [`super::ExtensionNode`].
/// Those nodes hold the sum and the non-empty leaf count of all their descendants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerNode<const HASH_SIZE: usize> {
    left: Arc<Node<HASH_SIZE>>,
    right: Arc<Node<HASH_SIZE>>,
    sum: Sum,
    count: Count,
    node_hash: [u8; HASH_SIZE],
    persisted: bool,
}

impl<const HASH_SIZE: usize> InnerNode<HASH_SIZE> {
    pub(crate) fn from_parts(
        left: Arc<Node<HASH_SIZE>>,
        right: Arc<Node<HASH_SIZE>>,
        sum: Sum,
        count: Count,
        node_hash: [u8; HASH_SIZE],
        persisted: bool,
    ) -> Self {
        Self {
            left,
            right,
            sum,
            count,
            node_hash,
            persisted,
        }
    }

    /// Returns the hash of the node. NO HASHING IS DONE HERE.
    pub fn digest(&self) -> [u8; HASH_SIZE] {
        self.node_hash
    }

    pub fn sum(&self) -> Sum {
        self.sum
    }

    pub fn count(&self) -> Count {
        self.count
    }

    /// Returns the left and right children of this node.
    pub fn children(&self) -> (&Arc<Node<HASH_SIZE>>, &Arc<Node<HASH_SIZE>>) {
        (&self.left, &self.right)
    }

    pub fn left(&self) -> &Arc<Node<HASH_SIZE>> {
        &self.left
    }

    pub fn right(&self) -> &Arc<Node<HASH_SIZE>> {
        &self.right
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Same node, flagged as persisted, over children that may themselves have
    /// just been persisted. The children must carry the digests this node was
    /// hashed from.
    pub(crate) fn persisted_with(
        &self,
        left: Arc<Node<HASH_SIZE>>,
        right: Arc<Node<HASH_SIZE>>,
    ) -> Self {
        debug_assert_eq!(left.digest(), self.left.digest());
        debug_assert_eq!(right.digest(), self.right.digest());
        Self {
            left,
            right,
            sum: self.sum,
            count: self.count,
            node_hash: self.node_hash,
            persisted: true,
        }
    }
}

impl<const HASH_SIZE: usize> Display for InnerNode<HASH_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Inner {{ sum: {}, count: {}, hash: {} }}",
            self.sum(),
            self.count(),
            hex::encode(self.digest().as_slice())
        )
    }
}
