//! Example of implementing a custom hasher for the Sparse Merkle Trie
//!
//! This example demonstrates:
//! - Creating a custom hasher implementation
//! - Using it with the trie
//! - Basic trie operations with the custom hasher

use sha2::{Digest, Sha256};
use smst::{Hasher, MemoryStore, SparseMerkleSumTrie};

// Custom hasher that uses SHA256 but adds a prefix to the input
#[derive(Clone)]
struct PrefixedSha256;

impl Hasher<32> for PrefixedSha256 {
    fn hash(data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        // Add a custom prefix to the input
        hasher.update(b"custom_prefix:");
        hasher.update(data);
        hasher.finalize().into()
    }
}

fn main() {
    // Create a new trie with our custom hasher
    let mut trie = SparseMerkleSumTrie::<32, PrefixedSha256, _>::new(MemoryStore::new());
    trie.update(&[1; 32], &[1, 2, 3], 100).unwrap();
    println!("Root hash with custom hasher: {}", hex::encode(trie.root()));

    // Compare with standard SHA256
    let mut standard_trie = SparseMerkleSumTrie::<32, Sha256, _>::new(MemoryStore::new());
    standard_trie.update(&[1; 32], &[1, 2, 3], 100).unwrap();
    println!(
        "Root hash with standard SHA256: {}",
        hex::encode(standard_trie.root())
    );

    // The hasher also derives the paths, so the whole layout changes
    println!("\nThe hashes are different because our custom hasher adds a prefix to the input.");
}
