use std::{collections::HashMap, convert::Infallible};

use super::NodeStore;

/// A simple in-memory store implementation for testing
#[derive(Debug, Clone, Default)]
pub struct MemoryStore<const HASH_SIZE: usize> {
    nodes: HashMap<[u8; HASH_SIZE], Vec<u8>>,
}

impl<const HASH_SIZE: usize> MemoryStore<HASH_SIZE> {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// Number of nodes in the store.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, digest: &[u8; HASH_SIZE]) -> bool {
        self.nodes.contains_key(digest)
    }

    pub fn nodes(&self) -> &HashMap<[u8; HASH_SIZE], Vec<u8>> {
        &self.nodes
    }
}

impl<const HASH_SIZE: usize> NodeStore<HASH_SIZE> for MemoryStore<HASH_SIZE> {
    type StoreError = Infallible;

    fn get(&self, digest: &[u8; HASH_SIZE]) -> Result<Option<Vec<u8>>, Self::StoreError> {
        Ok(self.nodes.get(digest).cloned())
    }

    fn set(&mut self, digest: [u8; HASH_SIZE], node: Vec<u8>) -> Result<(), Self::StoreError> {
        self.nodes.insert(digest, node);
        Ok(())
    }

    fn delete(&mut self, digest: &[u8; HASH_SIZE]) -> Result<(), Self::StoreError> {
        self.nodes.remove(digest);
        Ok(())
    }
}
