//! Example of using the Sparse Merkle Sum Trie
//!
//! Every key carries a weight, the root commits to the total weight and a proof
//! binds the weight of the proven key.

use sha2::Sha256;
use smst::{CompressedProof, MemoryStore, SparseMerkleSumTrie, TrieError};

type Ledger = SparseMerkleSumTrie<32, Sha256, MemoryStore<32>>;

fn main() {
    let mut ledger = Ledger::new(MemoryStore::new());

    ledger.update(b"account-1", b"savings", 100).unwrap();
    ledger.update(b"account-2", b"checking", 250).unwrap();
    ledger.update(b"account-3", b"escrow", 50).unwrap();
    println!("Root hash: {}", hex::encode(ledger.root()));
    println!("Total weight: {}", ledger.total_weight());

    // Replacing a key replaces its weight
    ledger.update(b"account-1", b"savings", 120).unwrap();
    println!("Total weight after update: {}", ledger.total_weight());

    // The total can never wrap around
    match ledger.update(b"account-4", b"overflow", u64::MAX) {
        Err(TrieError::SumOverflow) => println!("Rejected an update overflowing the total"),
        other => println!("unexpected: {other:?}"),
    }
    ledger.commit().unwrap();

    // Ship a compressed proof and check it on the other side
    let root = ledger.root();
    let encoded = ledger.prove(b"account-2").unwrap().compress().encode();
    println!("Encoded proof: {} bytes", encoded.len());

    let proof = CompressedProof::<32>::decode(&encoded)
        .and_then(|compressed| compressed.decompress())
        .unwrap();
    let valid = Ledger::verify_proof(&proof, &root, b"account-2", Some((&b"checking"[..], 250)));
    let forged = Ledger::verify_proof(&proof, &root, b"account-2", Some((&b"checking"[..], 1)));
    println!("Proof with the real weight: {}", valid.is_ok());
    println!("Proof with a forged weight: {}", forged.is_ok());
}
