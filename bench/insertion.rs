use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use sha2::Sha256;
use smst::{MemoryStore, SparseMerkleSumTrie, SparseMerkleTrie};

pub fn generate_random_key() -> [u8; 32] {
    rand::random()
}

pub fn generate_random_value() -> Vec<u8> {
    (0..32).map(|_| rand::random()).collect()
}

fn bench_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("Trie Insertion");

    group.bench_function("Sparse Merkle Trie", |b| {
        b.iter(|| {
            let mut trie = SparseMerkleTrie::<32, Sha256, _>::new(MemoryStore::new());
            for _ in 0..100 {
                trie.update(&generate_random_key(), &generate_random_value())
                    .unwrap();
            }
        })
    });

    group.bench_function("Sparse Merkle Sum Trie", |b| {
        b.iter(|| {
            let mut trie = SparseMerkleSumTrie::<32, Sha256, _>::new(MemoryStore::new());
            for _ in 0..100 {
                trie.update(
                    &generate_random_key(),
                    &generate_random_value(),
                    rand::random::<u32>() as u64,
                )
                .unwrap();
            }
        })
    });

    group.finish();
}

fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("Trie Commit");

    // 100 updates on top of a committed trie of 1000 keys
    group.bench_function("Sparse Merkle Sum Trie", |b| {
        b.iter_batched(
            || {
                let mut trie = SparseMerkleSumTrie::<32, Sha256, _>::new(MemoryStore::new());
                for _ in 0..1000 {
                    trie.update(&generate_random_key(), &generate_random_value(), 1)
                        .unwrap();
                }
                trie.commit().unwrap();
                for _ in 0..100 {
                    trie.update(&generate_random_key(), &generate_random_value(), 1)
                        .unwrap();
                }
                trie
            },
            |mut trie| trie.commit().unwrap(),
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_insertion, bench_commit);
criterion_main!(benches);
