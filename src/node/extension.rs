use std::fmt::Display;
use std::sync::Arc;

use super::{Count, Node, Sum};

/// Compresses a run of inner nodes that each have a single non-empty child into
/// one node spanning the path bits `[start, end)`.
///
/// The hash is the one of the uncompressed chain, so an extension is invisible
/// in the root digest. The bits of `path` before `end` are shared by every leaf
/// below the extension, the bits from `end` on are zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionNode<const HASH_SIZE: usize> {
    path: [u8; HASH_SIZE],
    start: usize,
    end: usize,
    child: Arc<Node<HASH_SIZE>>,
    node_hash: [u8; HASH_SIZE],
    persisted: bool,
}

impl<const HASH_SIZE: usize> ExtensionNode<HASH_SIZE> {
    pub(crate) fn from_parts(
        path: [u8; HASH_SIZE],
        start: usize,
        end: usize,
        child: Arc<Node<HASH_SIZE>>,
        node_hash: [u8; HASH_SIZE],
        persisted: bool,
    ) -> Self {
        debug_assert!(start < end && end <= HASH_SIZE * 8);
        Self {
            path,
            start,
            end,
            child,
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

    /// First depth covered by the extension.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Depth of the child, one past the last covered depth.
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn child(&self) -> &Arc<Node<HASH_SIZE>> {
        &self.child
    }

    /// Mirrored from the child.
    pub fn sum(&self) -> Sum {
        self.child.sum()
    }

    /// Mirrored from the child.
    pub fn count(&self) -> Count {
        self.child.count()
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub(crate) fn persisted_with(&self, child: Arc<Node<HASH_SIZE>>) -> Self {
        debug_assert_eq!(child.digest(), self.child.digest());
        Self {
            path: self.path,
            start: self.start,
            end: self.end,
            child,
            node_hash: self.node_hash,
            persisted: true,
        }
    }
}

impl<const HASH_SIZE: usize> Display for ExtensionNode<HASH_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Extension {{ bounds: [{}, {}), sum: {}, count: {}, hash: {} }}",
            self.start(),
            self.end(),
            self.sum(),
            self.count(),
            hex::encode(self.digest().as_slice())
        )
    }
}
