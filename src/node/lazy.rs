use std::fmt::Display;

use super::{Count, Sum};

/// Stands in for a persisted subtree that has not been loaded yet.
///
/// Besides the digest it carries the sum and count its parent recorded, so
/// aggregates can be recomputed on the way up without fetching the subtree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LazyNode<const HASH_SIZE: usize> {
    node_hash: [u8; HASH_SIZE],
    sum: Sum,
    count: Count,
}

impl<const HASH_SIZE: usize> LazyNode<HASH_SIZE> {
    pub fn new(node_hash: [u8; HASH_SIZE], sum: Sum, count: Count) -> Self {
        Self {
            node_hash,
            sum,
            count,
        }
    }

    /// Returns the hash of the node.
    pub fn digest(&self) -> [u8; HASH_SIZE] {
        self.node_hash
    }

    /// Returns the sum of the node.
    pub fn sum(&self) -> Sum {
        self.sum
    }

    pub fn count(&self) -> Count {
        self.count
    }
}

impl<const HASH_SIZE: usize> Display for LazyNode<HASH_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Lazy {{ sum: {}, count: {}, hash: {} }}",
            self.sum(),
            self.count(),
            hex::encode(self.digest().as_slice())
        )
    }
}
