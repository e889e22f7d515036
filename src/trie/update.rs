use std::sync::Arc;

use log::trace;

use super::{step_order, Trie};
use crate::{
    node::{Hasher, LeafNode, Node, Sum},
    path::{bit_index, common_prefix_len},
    NodeStore, TrieError,
};

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone, S: NodeStore<HASH_SIZE>>
    Trie<HASH_SIZE, H, S>
{
    /// Inserts or replaces the leaf of `key`.
    ///
    /// Returns an error if the new weight would overflow a subtree sum, in
    /// which case the trie is left untouched.
    pub fn update(
        &mut self,
        key: &[u8],
        value: Vec<u8>,
        weight: Sum,
    ) -> Result<(), TrieError<S::StoreError>> {
        let path = self.scheme.path(key);
        trace!("updating {}", hex::encode(path));
        let leaf = self.scheme.leaf(path, value, weight);
        let mut orphans = Vec::new();
        let root = self.root.clone();
        let root = self.insert_at(&root, 0, leaf, &mut orphans)?;
        self.apply(root, orphans);
        Ok(())
    }

    /// Inserts `leaf` in the subtree `node` sitting at `depth`, returns the new
    /// subtree.
    fn insert_at(
        &self,
        node: &Arc<Node<HASH_SIZE>>,
        depth: usize,
        leaf: LeafNode<HASH_SIZE>,
        orphans: &mut Vec<[u8; HASH_SIZE]>,
    ) -> Result<Arc<Node<HASH_SIZE>>, TrieError<S::StoreError>> {
        let path = *leaf.path();
        match node.as_ref() {
            Node::Placeholder => Ok(Arc::new(Node::Leaf(leaf))),
            Node::Lazy(lazy) => {
                let resolved = self.load(lazy)?;
                self.insert_at(&resolved, depth, leaf, orphans)
            }
            Node::Leaf(current) if *current.path() == path => {
                // Same value and weight, nothing to replace
                if current.digest() == leaf.digest() {
                    return Ok(node.clone());
                }
                Self::orphan(node, orphans);
                Ok(Arc::new(Node::Leaf(leaf)))
            }
            Node::Leaf(current) => {
                // Both paths share the bits above `depth`, the current leaf only
                // moves down and keeps its digest.
                let split = common_prefix_len(current.path(), &path, depth, Self::path_len());
                let inner = self.branch(split, &path, Arc::new(Node::Leaf(leaf)), node.clone())?;
                Ok(self.extend(&path, depth, split, inner, orphans))
            }
            Node::Inner(inner) => {
                let (next, sibling) = step_order(depth, &path, inner.left(), inner.right());
                let new_next = self.insert_at(next, depth + 1, leaf, orphans)?;
                if new_next.digest() == next.digest() {
                    return Ok(node.clone());
                }
                Self::orphan(node, orphans);
                self.branch(depth, &path, new_next, sibling.clone())
            }
            Node::Extension(extension) => {
                let (start, end) = (extension.start(), extension.end());
                let split = common_prefix_len(extension.path(), &path, start, end);
                if split == end {
                    let child = extension.child();
                    let new_child = self.insert_at(child, end, leaf, orphans)?;
                    if new_child.digest() == child.digest() {
                        return Ok(node.clone());
                    }
                    Self::orphan(node, orphans);
                    return Ok(self.extend(extension.path(), start, end, new_child, orphans));
                }
                // The new leaf leaves the extension at `split`: cut it in an upper
                // part, a split, and a lower part.
                Self::orphan(node, orphans);
                let lower = self.extend(
                    extension.path(),
                    split + 1,
                    end,
                    extension.child().clone(),
                    orphans,
                );
                let inner = self.branch(split, &path, Arc::new(Node::Leaf(leaf)), lower)?;
                Ok(self.extend(&path, start, split, inner, orphans))
            }
        }
    }

    /// Builds the inner node at `depth` with `ours` on the side of `path`.
    pub(super) fn branch(
        &self,
        depth: usize,
        path: &[u8; HASH_SIZE],
        ours: Arc<Node<HASH_SIZE>>,
        theirs: Arc<Node<HASH_SIZE>>,
    ) -> Result<Arc<Node<HASH_SIZE>>, TrieError<S::StoreError>> {
        let inner = if bit_index(depth, path) == 0 {
            self.scheme.inner(ours, theirs)
        } else {
            self.scheme.inner(theirs, ours)
        };
        Ok(Arc::new(Node::Inner(inner.ok_or(TrieError::SumOverflow)?)))
    }

    /// Places `child` below the bits `[start, end)` of `path`, keeping the
    /// subtree canonical: a leaf floats up on its own, an extension below is
    /// merged, only an inner node gets a new extension.
    pub(super) fn extend(
        &self,
        path: &[u8; HASH_SIZE],
        start: usize,
        end: usize,
        child: Arc<Node<HASH_SIZE>>,
        orphans: &mut Vec<[u8; HASH_SIZE]>,
    ) -> Arc<Node<HASH_SIZE>> {
        if start == end {
            return child;
        }
        match child.as_ref() {
            Node::Placeholder | Node::Leaf(_) => child,
            Node::Extension(extension) => {
                Self::orphan(&child, orphans);
                Arc::new(Node::Extension(self.scheme.extension(
                    *extension.path(),
                    start,
                    extension.end(),
                    extension.child().clone(),
                )))
            }
            Node::Inner(_) | Node::Lazy(_) => Arc::new(Node::Extension(
                self.scheme.extension(*path, start, end, child.clone()),
            )),
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use sha2::Sha256;

    use super::Trie;
    use crate::{DigestScheme, MemoryStore, Node, TrieError};

    fn sum_trie() -> Trie<32, Sha256, MemoryStore<32>> {
        Trie::new(MemoryStore::new(), DigestScheme::sum())
    }

    /// Checks the shape rules and the aggregates of every in-memory node.
    fn assert_canonical(node: &Arc<Node<32>>, is_root: bool) {
        match node.as_ref() {
            Node::Placeholder => assert!(is_root, "placeholder below the root"),
            Node::Leaf(_) | Node::Lazy(_) => {}
            Node::Inner(inner) => {
                let (left, right) = inner.children();
                assert!(!left.is_placeholder() && !right.is_placeholder());
                assert_eq!(inner.sum(), left.sum() + right.sum());
                assert_eq!(inner.count(), left.count() + right.count());
                assert_canonical(left, false);
                assert_canonical(right, false);
            }
            Node::Extension(extension) => {
                assert!(matches!(
                    extension.child().as_ref(),
                    Node::Inner(_) | Node::Lazy(_)
                ));
                assert_canonical(extension.child(), false);
            }
        }
    }

    #[test]
    fn test_first_leaf_is_the_root() {
        let mut trie = sum_trie();
        trie.update(b"key1", b"value1".to_vec(), 10).unwrap();
        let Node::Leaf(leaf) = trie.root().as_ref() else {
            panic!("expected a leaf root");
        };
        assert_eq!(leaf.value(), b"value1");
        assert_eq!(trie.root().sum(), 10);
        assert_eq!(trie.root().count(), 1);
    }

    #[test]
    fn test_split_keeps_canonical_shape() {
        let mut trie = sum_trie();
        for i in 0..64u8 {
            trie.update(&[i], vec![i], u64::from(i)).unwrap();
            assert_canonical(trie.root(), true);
        }
        assert_eq!(trie.root().sum(), (0..64).sum::<u64>());
        // the value of key 0 is the single byte 0, which is not empty
        assert_eq!(trie.root().count(), 64);
    }

    #[test]
    fn test_update_replaces_leaf() {
        let mut trie = sum_trie();
        trie.update(b"key1", b"value1".to_vec(), 10).unwrap();
        trie.update(b"key2", b"value2".to_vec(), 1).unwrap();
        trie.update(b"key1", b"other".to_vec(), 5).unwrap();
        assert_eq!(trie.root().sum(), 6);
        assert_eq!(trie.root().count(), 2);
        assert_eq!(trie.get(b"key1").unwrap().unwrap().value(), b"other");
    }

    #[test]
    fn test_same_value_is_a_no_op() {
        let mut trie = sum_trie();
        trie.update(b"key1", b"value1".to_vec(), 10).unwrap();
        trie.update(b"key2", b"value2".to_vec(), 1).unwrap();
        trie.commit().unwrap();
        let root = trie.root().clone();
        trie.update(b"key1", b"value1".to_vec(), 10).unwrap();
        assert!(Arc::ptr_eq(&root, trie.root()));
        assert!(trie.pending_orphans().is_empty());
    }

    #[test]
    fn test_empty_value_counts_zero() {
        let mut trie = sum_trie();
        trie.update(b"key1", Vec::new(), 3).unwrap();
        trie.update(b"key2", b"value2".to_vec(), 1).unwrap();
        assert_eq!(trie.root().count(), 1);
        assert_eq!(trie.root().sum(), 4);
        trie.update(b"key1", b"value1".to_vec(), 3).unwrap();
        assert_eq!(trie.root().count(), 2);
    }

    #[test]
    fn test_sum_overflow_leaves_trie_untouched() {
        let mut trie = sum_trie();
        trie.update(b"key1", b"value1".to_vec(), u64::MAX).unwrap();
        let root = trie.root().digest();
        assert_eq!(
            trie.update(b"key2", b"value2".to_vec(), 1),
            Err(TrieError::SumOverflow)
        );
        assert_eq!(trie.root().digest(), root);
        // replacing the heavy leaf itself is fine
        trie.update(b"key1", b"value1".to_vec(), 1).unwrap();
        trie.update(b"key2", b"value2".to_vec(), 1).unwrap();
        assert_eq!(trie.root().sum(), 2);
    }

    #[test]
    fn test_plain_trie_ignores_weight() {
        let mut trie: Trie<32, Sha256, MemoryStore<32>> =
            Trie::new(MemoryStore::new(), DigestScheme::plain());
        trie.update(b"key1", b"value1".to_vec(), 10).unwrap();
        let root = trie.root().digest();
        trie.update(b"key1", b"value1".to_vec(), 5).unwrap();
        assert_eq!(trie.root().digest(), root);
        assert_eq!(trie.root().sum(), 0);
    }
}
