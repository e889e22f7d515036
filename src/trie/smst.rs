use crate::{
    node::{Count, Hasher, Sum},
    DigestScheme, NodeStore, Proof, ProofError, TrieError,
};

use super::Trie;

/// Sparse merkle sum trie: every key carries a weight and every digest binds
/// the total weight below it.
/// * `HASH_SIZE` - size of the hash digest in bytes.
/// * `H` - Hasher that will be used to derive paths and hash nodes.
/// * `S` - Store for the nodes.
pub struct SparseMerkleSumTrie<
    const HASH_SIZE: usize,
    H: Hasher<HASH_SIZE> + Clone,
    S: NodeStore<HASH_SIZE>,
> {
    trie: Trie<HASH_SIZE, H, S>,
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone, S: NodeStore<HASH_SIZE>>
    SparseMerkleSumTrie<HASH_SIZE, H, S>
{
    pub fn new(store: S) -> Self {
        Self {
            trie: Trie::new(store, DigestScheme::sum()),
        }
    }

    /// Reopens the trie committed under `root`.
    pub fn import(store: S, root: [u8; HASH_SIZE]) -> Result<Self, TrieError<S::StoreError>> {
        Ok(Self {
            trie: Trie::import(store, DigestScheme::sum(), root)?,
        })
    }

    /// Sets the value and the weight of `key`.
    ///
    /// Returns an error if the total weight of the trie would overflow.
    pub fn update(
        &mut self,
        key: &[u8],
        value: &[u8],
        weight: Sum,
    ) -> Result<(), TrieError<S::StoreError>> {
        self.trie.update(key, value.to_vec(), weight)
    }

    pub fn delete(&mut self, key: &[u8]) -> Result<(), TrieError<S::StoreError>> {
        self.trie.delete(key)
    }

    /// Returns the value and the weight of `key`, `None` if it is absent.
    pub fn get(&self, key: &[u8]) -> Result<Option<(Vec<u8>, Sum)>, TrieError<S::StoreError>> {
        Ok(self
            .trie
            .get(key)?
            .map(|leaf| (leaf.value().to_vec(), leaf.weight())))
    }

    pub fn has(&self, key: &[u8]) -> Result<bool, TrieError<S::StoreError>> {
        Ok(self.trie.get(key)?.is_some())
    }

    pub fn commit(&mut self) -> Result<(), TrieError<S::StoreError>> {
        self.trie.commit()
    }

    pub fn rollback(&mut self) {
        self.trie.rollback()
    }

    pub fn root(&self) -> [u8; HASH_SIZE] {
        self.trie.root().digest()
    }

    pub fn committed_root(&self) -> [u8; HASH_SIZE] {
        self.trie.committed_root()
    }

    /// Sum of all the weights. Read from the root.
    pub fn total_weight(&self) -> Sum {
        self.trie.root().sum()
    }

    /// Number of keys holding a non-empty value. Read from the root.
    pub fn total_non_empty_leaves(&self) -> Count {
        self.trie.root().count()
    }

    pub fn prove(&self, key: &[u8]) -> Result<Proof<HASH_SIZE>, TrieError<S::StoreError>> {
        self.trie.prove(key)
    }

    /// Verifies that `proof` shows `value` with `weight` under `key` in the trie
    /// committing to `root`, or the absence of `key` if `leaf` is `None`.
    pub fn verify_proof(
        proof: &Proof<HASH_SIZE>,
        root: &[u8; HASH_SIZE],
        key: &[u8],
        leaf: Option<(&[u8], Sum)>,
    ) -> Result<(), ProofError> {
        proof.verify(&DigestScheme::<HASH_SIZE, H>::sum(), root, key, leaf)
    }

    pub fn store(&self) -> &S {
        self.trie.store()
    }

    pub fn pending_orphans(&self) -> &[Vec<[u8; HASH_SIZE]>] {
        self.trie.pending_orphans()
    }

    pub fn unpruned_orphans(&self) -> &[[u8; HASH_SIZE]] {
        self.trie.unpruned()
    }
}
