//! Scenario tests for the sparse merkle tries

mod commit;

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use thiserror::Error;

use crate::{MemoryStore, NodeStore};

/// Memory store counting the reads made through it.
#[derive(Debug, Default)]
pub struct CountingStore<const HASH_SIZE: usize> {
    inner: MemoryStore<HASH_SIZE>,
    reads: Arc<AtomicUsize>,
}

impl<const HASH_SIZE: usize> CountingStore<HASH_SIZE> {
    pub fn new(inner: MemoryStore<HASH_SIZE>) -> Self {
        Self {
            inner,
            reads: Arc::default(),
        }
    }

    /// Handle on the read counter, still usable once the store is moved in a
    /// trie.
    pub fn reads(&self) -> Arc<AtomicUsize> {
        self.reads.clone()
    }
}

impl<const HASH_SIZE: usize> NodeStore<HASH_SIZE> for CountingStore<HASH_SIZE> {
    type StoreError = <MemoryStore<HASH_SIZE> as NodeStore<HASH_SIZE>>::StoreError;

    fn get(&self, digest: &[u8; HASH_SIZE]) -> Result<Option<Vec<u8>>, Self::StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(digest)
    }

    fn set(&mut self, digest: [u8; HASH_SIZE], node: Vec<u8>) -> Result<(), Self::StoreError> {
        self.inner.set(digest, node)
    }

    fn delete(&mut self, digest: &[u8; HASH_SIZE]) -> Result<(), Self::StoreError> {
        self.inner.delete(digest)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("store unavailable")]
pub struct Unavailable;

/// Memory store whose operations all fail while its switch is on. Deletes also
/// fail once their budget is spent.
#[derive(Debug)]
pub struct FailingStore<const HASH_SIZE: usize> {
    inner: MemoryStore<HASH_SIZE>,
    failing: Arc<AtomicBool>,
    deletes: Arc<AtomicUsize>,
}

impl<const HASH_SIZE: usize> Default for FailingStore<HASH_SIZE> {
    fn default() -> Self {
        Self::new(MemoryStore::default())
    }
}

impl<const HASH_SIZE: usize> FailingStore<HASH_SIZE> {
    pub fn new(inner: MemoryStore<HASH_SIZE>) -> Self {
        Self {
            inner,
            failing: Arc::default(),
            deletes: Arc::new(AtomicUsize::new(usize::MAX)),
        }
    }

    /// Handle turning failures on and off.
    pub fn switch(&self) -> Arc<AtomicBool> {
        self.failing.clone()
    }

    /// Handle on the number of deletes left before they fail. `usize::MAX`
    /// never runs out.
    pub fn delete_budget(&self) -> Arc<AtomicUsize> {
        self.deletes.clone()
    }

    pub fn inner(&self) -> &MemoryStore<HASH_SIZE> {
        &self.inner
    }

    fn check(&self) -> Result<(), Unavailable> {
        if self.failing.load(Ordering::SeqCst) {
            Err(Unavailable)
        } else {
            Ok(())
        }
    }
}

impl<const HASH_SIZE: usize> NodeStore<HASH_SIZE> for FailingStore<HASH_SIZE> {
    type StoreError = Unavailable;

    fn get(&self, digest: &[u8; HASH_SIZE]) -> Result<Option<Vec<u8>>, Self::StoreError> {
        self.check()?;
        Ok(self.inner.nodes().get(digest).cloned())
    }

    fn set(&mut self, digest: [u8; HASH_SIZE], node: Vec<u8>) -> Result<(), Self::StoreError> {
        self.check()?;
        self.inner.set(digest, node).map_err(|never| match never {})
    }

    fn delete(&mut self, digest: &[u8; HASH_SIZE]) -> Result<(), Self::StoreError> {
        self.check()?;
        self.deletes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                0 => None,
                usize::MAX => Some(usize::MAX),
                left => Some(left - 1),
            })
            .map_err(|_| Unavailable)?;
        self.inner.delete(digest).map_err(|never| match never {})
    }
}
