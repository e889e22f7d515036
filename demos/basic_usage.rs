//! Basic example of using the Sparse Merkle Trie
//!
//! This example demonstrates:
//! - Creating a new trie
//! - Updating, reading and deleting keys
//! - Committing to the store and reopening the trie from its root
//! - Verifying merkle proofs

use sha2::Sha256;
use smst::{MemoryStore, SparseMerkleTrie, TrieError};

fn main() -> Result<(), TrieError<std::convert::Infallible>> {
    // Create a new trie with 32-byte digests using SHA256
    let mut trie = SparseMerkleTrie::<32, Sha256, _>::new(MemoryStore::new());

    trie.update(b"alice", b"apples")?;
    trie.update(b"bob", b"bananas")?;
    trie.update(b"carol", b"")?;
    println!("Root hash: {}", hex::encode(trie.root()));
    // carol holds an empty value, she is present but not counted
    println!("Non-empty leaves: {}", trie.total_non_empty_leaves());
    println!("carol present: {}", trie.has(b"carol")?);

    // Nothing reaches the store before a commit
    println!("Stored nodes before commit: {}", trie.store().len());
    trie.commit()?;
    println!("Stored nodes after commit: {}", trie.store().len());

    // Reopen the trie: only the root node is read, the rest loads on demand
    let mut reopened =
        SparseMerkleTrie::<32, Sha256, _>::import(trie.store().clone(), trie.committed_root())?;
    println!(
        "bob -> {:?}",
        reopened.get(b"bob")?.map(String::from_utf8)
    );

    reopened.delete(b"alice")?;
    match reopened.delete(b"alice") {
        Err(TrieError::KeyNotFound) => println!("alice was already deleted"),
        other => println!("unexpected: {other:?}"),
    }
    reopened.commit()?;

    // Prove that bob is in the trie and that alice is not
    let root = reopened.root();
    let proof = reopened.prove(b"bob")?;
    println!("Merkle proof length: {}", proof.siblings().len());
    let result = SparseMerkleTrie::<32, Sha256, MemoryStore<32>>::verify_proof(
        &proof,
        &root,
        b"bob",
        Some(b"bananas".as_slice()),
    );
    println!("Membership proof verification: {}", result.is_ok());

    let proof = reopened.prove(b"alice")?;
    let result =
        SparseMerkleTrie::<32, Sha256, MemoryStore<32>>::verify_proof(&proof, &root, b"alice", None);
    println!("Non-membership proof verification: {}", result.is_ok());

    let compressed = proof.compress().encode();
    println!("Compressed proof size: {} bytes", compressed.len());
    Ok(())
}
