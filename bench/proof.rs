use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sha2::Sha256;
use smst::{MemoryStore, SparseMerkleSumTrie};

type Smst = SparseMerkleSumTrie<32, Sha256, MemoryStore<32>>;

pub fn generate_random_key() -> [u8; 32] {
    rand::random()
}

pub fn generate_random_value() -> Vec<u8> {
    (0..32).map(|_| rand::random()).collect()
}

fn setup_trie(num_leaves: usize) -> (Smst, Vec<([u8; 32], Vec<u8>, u64)>) {
    let mut trie = Smst::new(MemoryStore::new());
    let mut leaves = Vec::with_capacity(num_leaves);
    for _ in 0..num_leaves {
        let key = generate_random_key();
        let value = generate_random_value();
        let weight = rand::random::<u32>() as u64;
        trie.update(&key, &value, weight).unwrap();
        leaves.push((key, value, weight));
    }
    (trie, leaves)
}

fn bench_proof_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Trie Proof Generation");

    let (trie, leaves) = setup_trie(100);

    group.bench_function("Proof", |b| {
        b.iter(|| {
            for (key, _, _) in &leaves {
                black_box(trie.prove(key)).unwrap();
            }
        })
    });

    group.bench_function("Compressed Proof", |b| {
        b.iter(|| {
            for (key, _, _) in &leaves {
                black_box(trie.prove(key).unwrap().compress().encode());
            }
        })
    });

    group.finish();
}

fn bench_proof_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("Trie Proof Verification");

    let (trie, leaves) = setup_trie(100);
    let root = trie.root();
    let proofs: Vec<_> = leaves
        .iter()
        .map(|(key, _, _)| trie.prove(key).unwrap())
        .collect();

    group.bench_function("Proof", |b| {
        b.iter(|| {
            for ((key, value, weight), proof) in leaves.iter().zip(proofs.iter()) {
                black_box(Smst::verify_proof(
                    proof,
                    &root,
                    key,
                    Some((value.as_slice(), *weight)),
                ))
                .unwrap();
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_proof_generation, bench_proof_verification);
criterion_main!(benches);
