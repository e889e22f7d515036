use crate::{
    node::{Count, Hasher},
    DigestScheme, NodeStore, Proof, ProofError, TrieError,
};

use super::Trie;

/// Sparse merkle trie.
/// * `HASH_SIZE` - size of the hash digest in bytes.
/// * `H` - Hasher that will be used to derive paths and hash nodes.
/// * `S` - Store for the nodes.
///
/// Changes live in memory until [`SparseMerkleTrie::commit`] writes them to the
/// store. A key holding an empty value is present but does not count as a
/// non-empty leaf.
pub struct SparseMerkleTrie<
    const HASH_SIZE: usize,
    H: Hasher<HASH_SIZE> + Clone,
    S: NodeStore<HASH_SIZE>,
> {
    trie: Trie<HASH_SIZE, H, S>,
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone, S: NodeStore<HASH_SIZE>>
    SparseMerkleTrie<HASH_SIZE, H, S>
{
    /// Creates an empty trie on top of `store`.
    pub fn new(store: S) -> Self {
        Self {
            trie: Trie::new(store, DigestScheme::plain()),
        }
    }

    /// Reopens the trie committed under `root`.
    pub fn import(store: S, root: [u8; HASH_SIZE]) -> Result<Self, TrieError<S::StoreError>> {
        Ok(Self {
            trie: Trie::import(store, DigestScheme::plain(), root)?,
        })
    }

    /// Sets the value of `key`.
    pub fn update(&mut self, key: &[u8], value: &[u8]) -> Result<(), TrieError<S::StoreError>> {
        self.trie.update(key, value.to_vec(), 0)
    }

    /// Removes `key`, fails with [`TrieError::KeyNotFound`] if it is absent.
    pub fn delete(&mut self, key: &[u8]) -> Result<(), TrieError<S::StoreError>> {
        self.trie.delete(key)
    }

    /// Returns the value of `key`, `None` if it is absent.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, TrieError<S::StoreError>> {
        Ok(self.trie.get(key)?.map(|leaf| leaf.value().to_vec()))
    }

    pub fn has(&self, key: &[u8]) -> Result<bool, TrieError<S::StoreError>> {
        Ok(self.trie.get(key)?.is_some())
    }

    /// Writes the pending changes to the store and prunes the replaced nodes.
    pub fn commit(&mut self) -> Result<(), TrieError<S::StoreError>> {
        self.trie.commit()
    }

    /// Drops the changes made since the last commit.
    pub fn rollback(&mut self) {
        self.trie.rollback()
    }

    /// Digest of the current root.
    pub fn root(&self) -> [u8; HASH_SIZE] {
        self.trie.root().digest()
    }

    /// Digest of the root as of the last commit.
    pub fn committed_root(&self) -> [u8; HASH_SIZE] {
        self.trie.committed_root()
    }

    /// Number of keys holding a non-empty value. Read from the root.
    pub fn total_non_empty_leaves(&self) -> Count {
        self.trie.root().count()
    }

    /// Returns the merkle proof for the given key, whether it is present or not.
    pub fn prove(&self, key: &[u8]) -> Result<Proof<HASH_SIZE>, TrieError<S::StoreError>> {
        self.trie.prove(key)
    }

    /// Verifies that `proof` shows `value` under `key` in the trie committing to
    /// `root`, or the absence of `key` if `value` is `None`.
    pub fn verify_proof(
        proof: &Proof<HASH_SIZE>,
        root: &[u8; HASH_SIZE],
        key: &[u8],
        value: Option<&[u8]>,
    ) -> Result<(), ProofError> {
        proof.verify(
            &DigestScheme::<HASH_SIZE, H>::plain(),
            root,
            key,
            value.map(|value| (value, 0)),
        )
    }

    pub fn store(&self) -> &S {
        self.trie.store()
    }

    /// Digests replaced by each operation since the last commit.
    pub fn pending_orphans(&self) -> &[Vec<[u8; HASH_SIZE]>] {
        self.trie.pending_orphans()
    }

    /// Orphans a commit could not delete. The next commit prunes them.
    pub fn unpruned_orphans(&self) -> &[[u8; HASH_SIZE]] {
        self.trie.unpruned()
    }
}
