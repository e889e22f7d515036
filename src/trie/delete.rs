use std::sync::Arc;

use log::trace;

use super::{step_order, Trie};
use crate::{
    node::{Hasher, Node},
    path::{common_prefix_len, flip_bit},
    NodeStore, TrieError,
};

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone, S: NodeStore<HASH_SIZE>>
    Trie<HASH_SIZE, H, S>
{
    /// Removes the leaf of `key`.
    ///
    /// Fails with [`TrieError::KeyNotFound`] if there is none, the trie is
    /// then left untouched.
    pub fn delete(&mut self, key: &[u8]) -> Result<(), TrieError<S::StoreError>> {
        let path = self.scheme.path(key);
        trace!("deleting {}", hex::encode(path));
        let mut orphans = Vec::new();
        let root = self.root.clone();
        let root = self.remove_at(&root, 0, &path, &mut orphans)?;
        self.apply(root, orphans);
        Ok(())
    }

    /// Removes the leaf at `path` from the subtree `node` sitting at `depth`,
    /// returns the new subtree.
    fn remove_at(
        &self,
        node: &Arc<Node<HASH_SIZE>>,
        depth: usize,
        path: &[u8; HASH_SIZE],
        orphans: &mut Vec<[u8; HASH_SIZE]>,
    ) -> Result<Arc<Node<HASH_SIZE>>, TrieError<S::StoreError>> {
        match node.as_ref() {
            Node::Placeholder => Err(TrieError::KeyNotFound),
            Node::Lazy(lazy) => {
                let resolved = self.load(lazy)?;
                self.remove_at(&resolved, depth, path, orphans)
            }
            Node::Leaf(leaf) => {
                if leaf.path() != path {
                    return Err(TrieError::KeyNotFound);
                }
                Self::orphan(node, orphans);
                Ok(Arc::new(Node::Placeholder))
            }
            Node::Inner(inner) => {
                let (next, sibling) = step_order(depth, path, inner.left(), inner.right());
                let new_next = self.remove_at(next, depth + 1, path, orphans)?;
                Self::orphan(node, orphans);
                if !new_next.is_placeholder() {
                    return self.branch(depth, path, new_next, sibling.clone());
                }
                // Only the sibling is left: it takes the place of this node, under
                // a one bit extension if it is not a leaf.
                let sibling = self.resolve(sibling)?;
                Ok(self.extend(&flip_bit(path, depth), depth, depth + 1, sibling, orphans))
            }
            Node::Extension(extension) => {
                let (start, end) = (extension.start(), extension.end());
                if common_prefix_len(extension.path(), path, start, end) != end {
                    return Err(TrieError::KeyNotFound);
                }
                let new_child = self.remove_at(extension.child(), end, path, orphans)?;
                Self::orphan(node, orphans);
                Ok(self.extend(extension.path(), start, end, new_child, orphans))
            }
        }
    }
}
