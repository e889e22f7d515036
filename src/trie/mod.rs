//! Path compressed trie engine shared by the plain and the sum tries.
//!
//! The in-memory tree is made of immutable nodes. Every mutation rebuilds the
//! nodes on the touched path, records the persisted nodes it replaced as
//! orphans and only swaps the root once it fully succeeded. Subtrees that were
//! not visited yet stay [`Node::Lazy`] and are loaded from the store on demand.

mod commit;
mod delete;
mod smst;
mod smt;
mod update;

use std::sync::Arc;

use log::trace;

pub use smst::SparseMerkleSumTrie;
pub use smt::SparseMerkleTrie;

use crate::{
    node::{EncodingError, Hasher, LazyNode, LeafNode, Node},
    path::{bit_index, common_prefix_len},
    proof::{Proof, ProofNode, ProofTerminal},
    DigestScheme, NodeStore, TrieError,
};

/// Trie engine.
/// * `HASH_SIZE` - size of the hash digest in bytes.
/// * `H` - Hasher that will be used to derive paths and hash nodes.
/// * `S` - Store the nodes are loaded from and committed to.
pub(crate) struct Trie<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone, S: NodeStore<HASH_SIZE>>
{
    store: S,
    scheme: DigestScheme<HASH_SIZE, H>,
    root: Arc<Node<HASH_SIZE>>,
    /// Root as of the last successful commit. Fully persisted.
    committed: Arc<Node<HASH_SIZE>>,
    /// One batch of replaced persisted digests per operation since the last
    /// commit.
    orphans: Vec<Vec<[u8; HASH_SIZE]>>,
    /// Orphans of committed operations a failed commit did not delete.
    unpruned: Vec<[u8; HASH_SIZE]>,
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone, S: NodeStore<HASH_SIZE>>
    Trie<HASH_SIZE, H, S>
{
    /// Creates an empty trie on top of `store`.
    pub fn new(store: S, scheme: DigestScheme<HASH_SIZE, H>) -> Self {
        let root = Arc::new(Node::Placeholder);
        Self {
            store,
            scheme,
            committed: root.clone(),
            root,
            orphans: Vec::new(),
            unpruned: Vec::new(),
        }
    }

    /// Reopens a trie committed under `root`. Only the root node is loaded.
    pub fn import(
        store: S,
        scheme: DigestScheme<HASH_SIZE, H>,
        root: [u8; HASH_SIZE],
    ) -> Result<Self, TrieError<S::StoreError>> {
        let mut trie = Self::new(store, scheme);
        if root != Node::<HASH_SIZE>::PLACEHOLDER_DIGEST {
            let node = Arc::new(trie.fetch(&root)?);
            trie.root = node.clone();
            trie.committed = node;
        }
        Ok(trie)
    }

    /// Returns the path length of the trie (HASH_SIZE * 8)
    pub const fn path_len() -> usize {
        HASH_SIZE * 8
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn root(&self) -> &Arc<Node<HASH_SIZE>> {
        &self.root
    }

    pub fn committed_root(&self) -> [u8; HASH_SIZE] {
        self.committed.digest()
    }

    pub fn pending_orphans(&self) -> &[Vec<[u8; HASH_SIZE]>] {
        &self.orphans
    }

    pub fn unpruned(&self) -> &[[u8; HASH_SIZE]] {
        &self.unpruned
    }

    /// Replaces the root after a successful operation.
    fn apply(&mut self, root: Arc<Node<HASH_SIZE>>, orphans: Vec<[u8; HASH_SIZE]>) {
        if !orphans.is_empty() {
            self.orphans.push(orphans);
        }
        self.root = root;
    }

    /// Records `node` as replaced. Nodes that never reached the store have
    /// nothing to prune.
    fn orphan(node: &Node<HASH_SIZE>, orphans: &mut Vec<[u8; HASH_SIZE]>) {
        if node.is_persisted() {
            orphans.push(node.digest());
        }
    }

    /// Reads and decodes the node stored under `digest`.
    fn fetch(&self, digest: &[u8; HASH_SIZE]) -> Result<Node<HASH_SIZE>, TrieError<S::StoreError>> {
        let encoded = self
            .store
            .get(digest)
            .map_err(TrieError::Store)?
            .ok_or_else(|| TrieError::MissingNode(hex::encode(digest)))?;
        let node = self.scheme.decode(digest, &encoded)?;
        trace!("loaded {}", node);
        Ok(node)
    }

    /// Loads the subtree a lazy node stands for. The loaded node must agree
    /// with the count and the sum its parent recorded: a digest only binds the
    /// total sum of a node, not how it splits between the children.
    fn load(
        &self,
        lazy: &LazyNode<HASH_SIZE>,
    ) -> Result<Arc<Node<HASH_SIZE>>, TrieError<S::StoreError>> {
        let node = self.fetch(&lazy.digest())?;
        if node.count() != lazy.count() {
            return Err(EncodingError::CountMismatch {
                expected: lazy.count(),
                actual: node.count(),
            }
            .into());
        }
        if node.sum() != lazy.sum() {
            return Err(EncodingError::SumMismatch {
                expected: lazy.sum(),
                actual: node.sum(),
            }
            .into());
        }
        Ok(Arc::new(node))
    }

    /// Returns `node` itself unless it is lazy, in which case it is loaded.
    fn resolve(
        &self,
        node: &Arc<Node<HASH_SIZE>>,
    ) -> Result<Arc<Node<HASH_SIZE>>, TrieError<S::StoreError>> {
        match node.as_ref() {
            Node::Lazy(lazy) => self.load(lazy),
            _ => Ok(node.clone()),
        }
    }

    /// Returns the leaf stored under `key`, if any.
    pub fn get(&self, key: &[u8]) -> Result<Option<LeafNode<HASH_SIZE>>, TrieError<S::StoreError>> {
        let path = self.scheme.path(key);
        let mut current = self.root.clone();
        let mut depth = 0;
        loop {
            let next = match current.as_ref() {
                Node::Placeholder => return Ok(None),
                Node::Leaf(leaf) => {
                    return Ok((*leaf.path() == path).then(|| leaf.clone()));
                }
                Node::Lazy(lazy) => self.load(lazy)?,
                Node::Inner(inner) => {
                    let (next, _) = step_order(depth, &path, inner.left(), inner.right());
                    depth += 1;
                    next.clone()
                }
                Node::Extension(extension) => {
                    let end = extension.end();
                    if common_prefix_len(extension.path(), &path, extension.start(), end) != end {
                        return Ok(None);
                    }
                    depth = end;
                    extension.child().clone()
                }
            };
            current = next;
        }
    }

    /// Collects the siblings along the path of `key` down to the node the
    /// path ends on.
    pub fn prove(&self, key: &[u8]) -> Result<Proof<HASH_SIZE>, TrieError<S::StoreError>> {
        let path = self.scheme.path(key);
        let mut siblings = Vec::new();
        let mut current = self.root.clone();
        let mut depth = 0;
        let terminal = loop {
            let next = match current.as_ref() {
                Node::Placeholder => break ProofTerminal::Placeholder,
                Node::Leaf(leaf) => {
                    break ProofTerminal::Leaf {
                        path: *leaf.path(),
                        value_hash: *leaf.value_hash(),
                        weight: leaf.weight(),
                    }
                }
                Node::Lazy(lazy) => self.load(lazy)?,
                Node::Inner(inner) => {
                    let (next, sibling) = step_order(depth, &path, inner.left(), inner.right());
                    siblings.push(ProofNode::new(sibling.digest(), sibling.sum()));
                    depth += 1;
                    next.clone()
                }
                Node::Extension(extension) => {
                    let (start, end) = (extension.start(), extension.end());
                    let split = common_prefix_len(extension.path(), &path, start, end);
                    // Every compressed level has an empty sibling
                    siblings.extend((start..split).map(|_| ProofNode::placeholder()));
                    if split < end {
                        // The path leaves the extension: its own side is empty and
                        // the sibling is the rest of the chain.
                        let child = extension.child();
                        let remainder = self.scheme.extension_digest(
                            extension.path(),
                            split + 1,
                            end,
                            &child.digest(),
                            child.sum(),
                        );
                        siblings.push(ProofNode::new(remainder, child.sum()));
                        break ProofTerminal::Placeholder;
                    }
                    depth = end;
                    extension.child().clone()
                }
            };
            current = next;
        };
        Ok(Proof::new(siblings, terminal))
    }
}

/// Orders two children as (on the path, off the path) for the bit of `path` at
/// `depth`.
#[inline]
fn step_order<'a, T>(depth: usize, path: &[u8], left: &'a T, right: &'a T) -> (&'a T, &'a T) {
    if bit_index(depth, path) == 0 {
        (left, right)
    } else {
        (right, left)
    }
}

#[cfg(test)]
mod test {
    use sha2::Sha256;

    use super::Trie;
    use crate::{DigestScheme, MemoryStore, Node, NodeStore, TrieError};

    #[test]
    fn test_new_trie_is_empty() {
        let trie = Trie::new(MemoryStore::<32>::new(), DigestScheme::<32, Sha256>::plain());
        assert!(trie.root().is_placeholder());
        assert_eq!(trie.committed_root(), [0; 32]);
        assert!(trie.pending_orphans().is_empty());
        assert_eq!(trie.get(b"key").unwrap(), None);
    }

    #[test]
    fn test_import_placeholder_root_reads_nothing() {
        let trie = Trie::import(
            MemoryStore::<32>::new(),
            DigestScheme::<32, Sha256>::plain(),
            [0; 32],
        )
        .unwrap();
        assert!(trie.root().is_placeholder());
    }

    #[test]
    fn test_import_missing_root() {
        let result = Trie::import(
            MemoryStore::<32>::new(),
            DigestScheme::<32, Sha256>::plain(),
            [7; 32],
        );
        assert_eq!(
            result.err(),
            Some(TrieError::MissingNode(hex::encode([7; 32])))
        );
    }

    #[test]
    fn test_import_corrupt_root() {
        let mut store = MemoryStore::<32>::new();
        store.set([7; 32], vec![9, 9, 9]).unwrap();
        let result = Trie::import(store, DigestScheme::<32, Sha256>::plain(), [7; 32]);
        assert!(matches!(result.err(), Some(TrieError::Encoding(_))));
    }

    #[test]
    fn test_import_loads_only_the_root() {
        let mut trie = Trie::new(MemoryStore::<32>::new(), DigestScheme::<32, Sha256>::sum());
        for i in 0..8u8 {
            trie.update(&[i], vec![i + 1], 1).unwrap();
        }
        trie.commit().unwrap();
        let root = trie.root().digest();
        let store = trie.store().clone();

        let imported = Trie::import(store, DigestScheme::<32, Sha256>::sum(), root).unwrap();
        let Node::Inner(inner) = imported.root().as_ref() else {
            panic!("expected an inner root");
        };
        assert!(matches!(inner.left().as_ref(), Node::Lazy(_)));
        assert!(matches!(inner.right().as_ref(), Node::Lazy(_)));
        assert_eq!(imported.root().count(), 8);
        assert_eq!(imported.root().sum(), 8);
        assert_eq!(imported.get(&[3]).unwrap().unwrap().value(), &[4]);
    }
}
