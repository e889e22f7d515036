//! Bit level helpers over hashed paths.
//!
//! Bits are read least significant first inside each byte: bit `i` of a path
//! is `(path[i / 8] >> (i % 8)) & 1`. A `0` bit goes left.

use bitvec::{order::Lsb0, view::BitView};

/// Get the bit at the given index in the key.
pub fn bit_index(index: usize, key: &[u8]) -> u8 {
    // `index / 8` to get the index of the interesting byte
    // `index % 8` to get the interesting bit index in the previously selected byte
    // right shift it and keep only this interesting bit with & 1.
    (key[index / 8] >> (index % 8)) & 1
}

/// Index of the first bit in `[from, to)` where `a` and `b` differ, or `to` if
/// they agree on the whole range.
pub fn common_prefix_len(a: &[u8], b: &[u8], from: usize, to: usize) -> usize {
    let (a, b) = (&a.view_bits::<Lsb0>()[from..to], &b.view_bits::<Lsb0>()[from..to]);
    a.iter()
        .by_vals()
        .zip(b.iter().by_vals())
        .position(|(x, y)| x != y)
        .map_or(to, |offset| from + offset)
}

/// Copy of `path` with the bit at `index` inverted.
pub fn flip_bit<const HASH_SIZE: usize>(path: &[u8; HASH_SIZE], index: usize) -> [u8; HASH_SIZE] {
    let mut flipped = *path;
    let bits = flipped[..].view_bits_mut::<Lsb0>();
    let bit = bits[index];
    bits.set(index, !bit);
    flipped
}

/// Copy of `path` with every bit from `index` on cleared.
pub fn clear_from<const HASH_SIZE: usize>(path: &[u8; HASH_SIZE], index: usize) -> [u8; HASH_SIZE] {
    let mut cleared = *path;
    cleared[..].view_bits_mut::<Lsb0>()[index..].fill(false);
    cleared
}
