use std::{collections::HashSet, sync::Arc};

use log::{debug, trace};

use super::Trie;
use crate::{
    node::{Hasher, Node},
    NodeStore, TrieError,
};

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone, S: NodeStore<HASH_SIZE>>
    Trie<HASH_SIZE, H, S>
{
    /// Writes every dirty node reachable from the root to the store, then
    /// deletes the orphans recorded since the last commit.
    ///
    /// A node written by this commit is never deleted, even if an earlier
    /// operation orphaned the same digest. If a write fails the in-memory trie
    /// is left as it was. Once every node is written the new root is committed,
    /// a failing delete then leaves the orphans not pruned yet to the next
    /// commit.
    pub fn commit(&mut self) -> Result<(), TrieError<S::StoreError>> {
        let mut written = HashSet::new();
        let root = self.root.clone();
        let root = Self::persist(&mut self.store, &root, &mut written)?;
        self.committed = root.clone();
        self.root = root;

        let operations = self.orphans.len();
        let pending: Vec<_> = std::mem::take(&mut self.unpruned)
            .into_iter()
            .chain(std::mem::take(&mut self.orphans).into_iter().flatten())
            .filter(|digest| !written.contains(digest))
            .collect();
        for (pruned, digest) in pending.iter().enumerate() {
            if let Err(error) = self.store.delete(digest) {
                debug!(
                    "pruning stopped after {} of {} orphans",
                    pruned,
                    pending.len()
                );
                self.unpruned = pending[pruned..].to_vec();
                return Err(TrieError::Store(error));
            }
        }

        debug!(
            "committed root {}: {} nodes written, {} orphans pruned from {} operations",
            hex::encode(self.committed.digest()),
            written.len(),
            pending.len(),
            operations
        );
        Ok(())
    }

    /// Drops every change made since the last commit. Orphans a failed commit
    /// could not prune are kept.
    pub fn rollback(&mut self) {
        debug!(
            "rolling back to {}, dropping {} operations",
            hex::encode(self.committed.digest()),
            self.orphans.len()
        );
        self.orphans.clear();
        self.root = self.committed.clone();
    }

    /// Persists the dirty part of `node`, children first, and returns the same
    /// subtree flagged as persisted.
    fn persist(
        store: &mut S,
        node: &Arc<Node<HASH_SIZE>>,
        written: &mut HashSet<[u8; HASH_SIZE]>,
    ) -> Result<Arc<Node<HASH_SIZE>>, TrieError<S::StoreError>> {
        if node.is_persisted() {
            return Ok(node.clone());
        }
        let (persisted, encoded) = match node.as_ref() {
            Node::Placeholder | Node::Lazy(_) => return Ok(node.clone()),
            Node::Leaf(leaf) => (Node::Leaf(leaf.clone().into_persisted()), leaf.encode()),
            Node::Inner(inner) => {
                let left = Self::persist(store, inner.left(), written)?;
                let right = Self::persist(store, inner.right(), written)?;
                (Node::Inner(inner.persisted_with(left, right)), inner.encode())
            }
            Node::Extension(extension) => {
                let child = Self::persist(store, extension.child(), written)?;
                (
                    Node::Extension(extension.persisted_with(child)),
                    extension.encode(),
                )
            }
        };
        let digest = persisted.digest();
        store.set(digest, encoded).map_err(TrieError::Store)?;
        trace!("persisted {}", persisted);
        written.insert(digest);
        Ok(Arc::new(persisted))
    }
}
