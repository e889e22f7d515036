//! Hashing rules of the trie: how keys become paths and how each node kind is
//! committed to.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::node::{
    decode, Count, Decoded, EncodingError, ExtensionNode, Hasher, InnerNode, LeafNode, Node, Sum,
    INNER_PREFIX, LEAF_PREFIX,
};
use crate::path::{bit_index, clear_from};

/// Digest rules shared by every node of a trie.
///
/// A plain scheme commits to keys and values only. A sum scheme additionally
/// binds each leaf weight and each inner node sum in the digests. Leaf counts are
/// never part of a digest.
///
/// # Type Parameters
/// * `HASH_SIZE` - size of the hash digest in bytes, paths are `HASH_SIZE * 8` bits
/// * `H` - hasher used for both path derivation and node hashing
#[derive(Debug, Clone)]
pub struct DigestScheme<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> {
    sum_trie: bool,
    _phantom: PhantomData<H>,
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> DigestScheme<HASH_SIZE, H> {
    /// Scheme of a sparse Merkle trie.
    pub fn plain() -> Self {
        Self {
            sum_trie: false,
            _phantom: PhantomData,
        }
    }

    /// Scheme of a sparse Merkle sum trie.
    pub fn sum() -> Self {
        Self {
            sum_trie: true,
            _phantom: PhantomData,
        }
    }

    pub fn is_sum_trie(&self) -> bool {
        self.sum_trie
    }

    /// Number of bits in a path.
    pub const fn path_len() -> usize {
        HASH_SIZE * 8
    }

    /// Path of a key in the trie.
    pub fn path(&self, key: &[u8]) -> [u8; HASH_SIZE] {
        H::hash(key)
    }

    pub fn value_hash(&self, value: &[u8]) -> [u8; HASH_SIZE] {
        H::hash(value)
    }

    /// `H(0x00 || path || value_hash [|| weight])`
    pub fn leaf_digest(
        &self,
        path: &[u8; HASH_SIZE],
        value_hash: &[u8; HASH_SIZE],
        weight: Sum,
    ) -> [u8; HASH_SIZE] {
        let mut preimage = Vec::with_capacity(1 + 2 * HASH_SIZE + 8);
        preimage.push(LEAF_PREFIX);
        preimage.extend_from_slice(path);
        preimage.extend_from_slice(value_hash);
        if self.sum_trie {
            preimage.extend_from_slice(&weight.to_be_bytes());
        }
        H::hash(&preimage)
    }

    /// `H(0x01 || left || right [|| sum])`
    pub fn inner_digest(
        &self,
        left: &[u8; HASH_SIZE],
        right: &[u8; HASH_SIZE],
        sum: Sum,
    ) -> [u8; HASH_SIZE] {
        let mut preimage = Vec::with_capacity(1 + 2 * HASH_SIZE + 8);
        preimage.push(INNER_PREFIX);
        preimage.extend_from_slice(left);
        preimage.extend_from_slice(right);
        if self.sum_trie {
            preimage.extend_from_slice(&sum.to_be_bytes());
        }
        H::hash(&preimage)
    }

    /// Digest of the chain of inner nodes covering the bits `[start, end)` of
    /// `path`, each one having a placeholder as the child off the path.
    pub fn extension_digest(
        &self,
        path: &[u8; HASH_SIZE],
        start: usize,
        end: usize,
        child: &[u8; HASH_SIZE],
        sum: Sum,
    ) -> [u8; HASH_SIZE] {
        let placeholder = Node::<HASH_SIZE>::PLACEHOLDER_DIGEST;
        // Walk up and recreate the compressed inner nodes
        (start..end).rev().fold(*child, |current, depth| {
            if bit_index(depth, path) == 0 {
                self.inner_digest(&current, &placeholder, sum)
            } else {
                self.inner_digest(&placeholder, &current, sum)
            }
        })
    }

    /// Creates a new dirty [`LeafNode`]. This function performs two hashes.
    pub fn leaf(&self, path: [u8; HASH_SIZE], value: Vec<u8>, weight: Sum) -> LeafNode<HASH_SIZE> {
        self.build_leaf(path, value, weight, false)
    }

    /// Creates a new dirty [`InnerNode`]. This function performs a hash and two
    /// additions. Returns `None` if the sum of the children overflows.
    pub fn inner(
        &self,
        left: Arc<Node<HASH_SIZE>>,
        right: Arc<Node<HASH_SIZE>>,
    ) -> Option<InnerNode<HASH_SIZE>> {
        self.build_inner(left, right, false)
    }

    /// Creates a new dirty [`ExtensionNode`]. This function performs
    /// `end - start` hashes.
    pub fn extension(
        &self,
        path: [u8; HASH_SIZE],
        start: usize,
        end: usize,
        child: Arc<Node<HASH_SIZE>>,
    ) -> ExtensionNode<HASH_SIZE> {
        self.build_extension(path, start, end, child, false)
    }

    /// Decodes a node fetched from the store and checks it hashes to `digest`.
    /// Its children come back as lazy nodes.
    pub fn decode(
        &self,
        digest: &[u8; HASH_SIZE],
        data: &[u8],
    ) -> Result<Node<HASH_SIZE>, EncodingError> {
        let decoded = decode::<HASH_SIZE>(data)?;
        if !self.sum_trie {
            reject_sums(&decoded)?;
        }
        let node = match decoded {
            Decoded::Leaf {
                path,
                weight,
                value,
            } => Node::Leaf(self.build_leaf(path, value, weight, true)),
            Decoded::Inner { left, right } => Node::Inner(
                self.build_inner(left, right, true)
                    .ok_or(EncodingError::SumOverflow)?,
            ),
            Decoded::Extension {
                path,
                start,
                end,
                child,
            } => Node::Extension(self.build_extension(path, start, end, child, true)),
        };
        if node.digest() != *digest {
            return Err(EncodingError::DigestMismatch {
                expected: hex::encode(digest),
                actual: hex::encode(node.digest()),
            });
        }
        Ok(node)
    }

    fn build_leaf(
        &self,
        path: [u8; HASH_SIZE],
        value: Vec<u8>,
        weight: Sum,
        persisted: bool,
    ) -> LeafNode<HASH_SIZE> {
        let weight = if self.sum_trie { weight } else { 0 };
        let value_hash = self.value_hash(&value);
        let node_hash = self.leaf_digest(&path, &value_hash, weight);
        LeafNode::from_parts(path, value, value_hash, weight, node_hash, persisted)
    }

    fn build_inner(
        &self,
        left: Arc<Node<HASH_SIZE>>,
        right: Arc<Node<HASH_SIZE>>,
        persisted: bool,
    ) -> Option<InnerNode<HASH_SIZE>> {
        let sum = left.sum().checked_add(right.sum())?;
        let count: Count = left.count() + right.count();
        let node_hash = self.inner_digest(&left.digest(), &right.digest(), sum);
        Some(InnerNode::from_parts(
            left, right, sum, count, node_hash, persisted,
        ))
    }

    fn build_extension(
        &self,
        path: [u8; HASH_SIZE],
        start: usize,
        end: usize,
        child: Arc<Node<HASH_SIZE>>,
        persisted: bool,
    ) -> ExtensionNode<HASH_SIZE> {
        // Bits past the extension depend on which leaf built it
        let path = clear_from(&path, end);
        let node_hash = self.extension_digest(&path, start, end, &child.digest(), child.sum());
        ExtensionNode::from_parts(path, start, end, child, node_hash, persisted)
    }
}

/// A plain trie carries no weights, any stored sum is corrupt.
fn reject_sums<const HASH_SIZE: usize>(decoded: &Decoded<HASH_SIZE>) -> Result<(), EncodingError> {
    let sums = match decoded {
        Decoded::Leaf { weight, .. } => vec![*weight],
        Decoded::Inner { left, right } => vec![left.sum(), right.sum()],
        Decoded::Extension { child, .. } => vec![child.sum()],
    };
    match sums.into_iter().find(|sum| *sum != 0) {
        Some(sum) => Err(EncodingError::UnexpectedSum(sum)),
        None => Ok(()),
    }
}
