use std::sync::atomic::Ordering;

use sha2::Sha256;

use super::{FailingStore, Unavailable};
use crate::{MemoryStore, SparseMerkleSumTrie, SparseMerkleTrie, TrieError};

type Smt = SparseMerkleTrie<32, Sha256, FailingStore<32>>;

fn populated() -> Smt {
    let mut smt = SparseMerkleTrie::new(FailingStore::default());
    for i in 0..16u8 {
        smt.update(&[i], &[i, i]).unwrap();
    }
    smt.commit().unwrap();
    smt
}

/// The state of [`populated`] after `[3]` changed and `[4]` was deleted,
/// committed to a fresh store.
fn changed() -> SparseMerkleTrie<32, Sha256, MemoryStore<32>> {
    let mut reference = SparseMerkleTrie::new(MemoryStore::new());
    for i in 0..16u8 {
        if i != 4 {
            let value = if i == 3 { b"changed".to_vec() } else { vec![i, i] };
            reference.update(&[i], &value).unwrap();
        }
    }
    reference.commit().unwrap();
    reference
}

#[test]
fn test_failed_commit_can_be_retried() {
    let mut smt = populated();
    let committed = smt.root();
    smt.update(&[3], b"changed").unwrap();
    smt.delete(&[4]).unwrap();
    let pending = smt.root();
    let orphans = smt.pending_orphans().to_vec();

    let switch = smt.store().switch();
    switch.store(true, Ordering::SeqCst);
    assert_eq!(smt.commit(), Err(TrieError::Store(Unavailable)));
    assert_eq!(smt.root(), pending);
    assert_eq!(smt.committed_root(), committed);
    assert_eq!(smt.pending_orphans(), orphans.as_slice());

    switch.store(false, Ordering::SeqCst);
    smt.commit().unwrap();
    assert_eq!(smt.committed_root(), pending);
    assert!(smt.pending_orphans().is_empty());

    let reference = changed();
    assert_eq!(reference.root(), pending);
    assert_eq!(smt.store().inner().nodes(), reference.store().nodes());
}

#[test]
fn test_failed_pruning_is_finished_by_the_next_commit() {
    let mut smt = populated();
    smt.update(&[3], b"changed").unwrap();
    smt.delete(&[4]).unwrap();
    let pending = smt.root();

    let budget = smt.store().delete_budget();
    budget.store(1, Ordering::SeqCst);
    assert_eq!(smt.commit(), Err(TrieError::Store(Unavailable)));
    // every node was written, so the new root is committed
    assert_eq!(smt.committed_root(), pending);
    assert!(smt.pending_orphans().is_empty());
    assert!(!smt.unpruned_orphans().is_empty());

    smt.rollback();
    assert_eq!(smt.root(), pending);
    assert!(!smt.unpruned_orphans().is_empty());
    let store = FailingStore::new(smt.store().inner().clone());
    let imported = Smt::import(store, pending).unwrap();
    for i in 0..16u8 {
        let expected = match i {
            3 => Some(b"changed".to_vec()),
            4 => None,
            _ => Some(vec![i, i]),
        };
        assert_eq!(smt.get(&[i]).unwrap(), expected);
        assert_eq!(imported.get(&[i]).unwrap(), expected);
    }

    budget.store(usize::MAX, Ordering::SeqCst);
    smt.commit().unwrap();
    assert!(smt.unpruned_orphans().is_empty());
    assert_eq!(smt.store().inner().nodes(), changed().store().nodes());
}

#[test]
fn test_store_failure_while_loading() {
    let smt = populated();
    let store = FailingStore::new(smt.store().inner().clone());
    let switch = store.switch();
    let mut imported = Smt::import(store, smt.root()).unwrap();

    switch.store(true, Ordering::SeqCst);
    assert_eq!(imported.get(&[1]), Err(TrieError::Store(Unavailable)));
    assert_eq!(
        imported.update(&[1], b"value"),
        Err(TrieError::Store(Unavailable))
    );
    assert_eq!(imported.delete(&[1]), Err(TrieError::Store(Unavailable)));
    assert!(imported.prove(&[1]).is_err());
    assert_eq!(imported.root(), smt.root());
    assert_eq!(imported.total_non_empty_leaves(), 16);
    assert!(imported.pending_orphans().is_empty());

    switch.store(false, Ordering::SeqCst);
    assert_eq!(imported.get(&[1]).unwrap(), Some(vec![1, 1]));
}

#[test]
fn test_rollback_after_import() {
    let smt = populated();
    let store = FailingStore::new(smt.store().inner().clone());
    let mut imported = Smt::import(store, smt.root()).unwrap();

    imported.update(&[100], b"new").unwrap();
    imported.delete(&[0]).unwrap();
    assert_ne!(imported.root(), smt.root());
    imported.rollback();

    assert_eq!(imported.root(), smt.root());
    assert!(imported.pending_orphans().is_empty());
    assert_eq!(imported.get(&[0]).unwrap(), Some(vec![0, 0]));
    assert_eq!(imported.get(&[100]).unwrap(), None);
    // nothing reached the store
    assert_eq!(imported.store().inner().nodes(), smt.store().inner().nodes());
}

#[test]
fn test_orphans_are_batched_per_operation() {
    let mut smst = SparseMerkleSumTrie::<32, Sha256, _>::new(MemoryStore::new());
    for i in 0..8u8 {
        smst.update(&[i], &[i], 1).unwrap();
    }
    // nothing was persisted yet, so nothing is orphaned
    assert!(smst.pending_orphans().is_empty());
    smst.commit().unwrap();

    smst.update(&[1], &[1], 2).unwrap();
    smst.update(&[2], &[2], 1).unwrap();
    smst.delete(&[3]).unwrap();
    let batches = smst.pending_orphans();
    assert_eq!(batches.len(), 2);
    // the replaced leaf and every node above it
    assert!(batches.iter().all(|batch| batch.len() >= 2));

    let committed = smst.committed_root();
    smst.commit().unwrap();
    assert!(!smst.store().contains(&committed));
    assert_eq!(smst.total_weight(), 8);
}
