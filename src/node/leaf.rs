use std::fmt::Display;

use super::{Count, Sum};

/// A Leaf is a node that has no children and stores one key of the trie.
/// It lives at the shallowest depth where its path is unique and holds
/// the full `path` of the key, the `value` as bytes and a `weight`
/// (always `0` outside of a sum trie).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode<const HASH_SIZE: usize> {
    path: [u8; HASH_SIZE],
    value: Vec<u8>,
    value_hash: [u8; HASH_SIZE],
    weight: Sum,
    node_hash: [u8; HASH_SIZE],
    persisted: bool,
}

impl<const HASH_SIZE: usize> LeafNode<HASH_SIZE> {
    /// Assembles a leaf from already computed hashes. Use
    /// [`crate::DigestScheme::leaf`] to build one from a value.
    pub(crate) fn from_parts(
        path: [u8; HASH_SIZE],
        value: Vec<u8>,
        value_hash: [u8; HASH_SIZE],
        weight: Sum,
        node_hash: [u8; HASH_SIZE],
        persisted: bool,
    ) -> Self {
        Self {
            path,
            value,
            value_hash,
            weight,
            node_hash,
            persisted,
        }
    }

    /// Returns the hash of the node. NO HASHING IS DONE HERE.
    pub fn digest(&self) -> [u8; HASH_SIZE] {
        self.node_hash
    }

    pub fn path(&self) -> &[u8; HASH_SIZE] {
        &self.path
    }

    /// Returns the value of the node.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn value_hash(&self) -> &[u8; HASH_SIZE] {
        &self.value_hash
    }

    pub fn weight(&self) -> Sum {
        self.weight
    }

    /// `1` if the leaf holds a non-empty value, `0` otherwise.
    pub fn count(&self) -> Count {
        if self.value.is_empty() {
            0
        } else {
            1
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub(crate) fn into_persisted(self) -> Self {
        Self {
            persisted: true,
            ..self
        }
    }
}

impl<const HASH_SIZE: usize> Display for LeafNode<HASH_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Leaf {{ weight: {}, hash: {}, value: {:?} }}",
            self.weight(),
            hex::encode(self.digest().as_slice()),
            self.value()
        )
    }
}
