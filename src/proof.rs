//! Proofs are used to verify the membership or the absence of a key against a
//! root digest.
//!
//! A proof is the list of the siblings met on the path of the key, from the root
//! down, followed by the node the path ends on.
//!
//! A proof can be compressed into a bitvector marking the empty siblings.
//!
//! A compressed proof can be decompressed into a proof.

use bitvec::order::Lsb0;
use bitvec::vec::BitVec;
use thiserror::Error;

use crate::{
    node::{Hasher, Node, Sum},
    path::{bit_index, common_prefix_len},
    DigestScheme,
};

const TERMINAL_PLACEHOLDER: u8 = 0;
const TERMINAL_LEAF: u8 = 1;

/// Error type for proof verification
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ProofError {
    /// The proof does not lead to the expected root or does not show the
    /// expected leaf
    #[error("invalid proof")]
    InvalidProof,
    /// The sums of the proof overflow
    #[error("sum overflow")]
    SumOverflow,
    /// A compressed proof could not be decoded
    #[error("malformed compressed proof")]
    MalformedCompression,
}

/// A sibling in a proof: the digest and the sum of the subtree off the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofNode<const HASH_SIZE: usize> {
    digest: [u8; HASH_SIZE],
    sum: Sum,
}

impl<const HASH_SIZE: usize> ProofNode<HASH_SIZE> {
    pub fn new(digest: [u8; HASH_SIZE], sum: Sum) -> Self {
        Self { digest, sum }
    }

    /// The empty subtree.
    pub fn placeholder() -> Self {
        Self::new(Node::<HASH_SIZE>::PLACEHOLDER_DIGEST, 0)
    }

    pub fn digest(&self) -> [u8; HASH_SIZE] {
        self.digest
    }

    pub fn sum(&self) -> Sum {
        self.sum
    }

    pub fn is_placeholder(&self) -> bool {
        self.digest == Node::<HASH_SIZE>::PLACEHOLDER_DIGEST && self.sum == 0
    }
}

/// Node the path of the proven key ends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofTerminal<const HASH_SIZE: usize> {
    /// Nothing is stored on the path.
    Placeholder,
    /// The leaf stored on the path. It may belong to another key sharing the
    /// walked prefix.
    Leaf {
        path: [u8; HASH_SIZE],
        value_hash: [u8; HASH_SIZE],
        weight: Sum,
    },
}

/// A merkle proof for a given key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof<const HASH_SIZE: usize> {
    /// Sibling at depth `i` is at index `i`.
    siblings: Vec<ProofNode<HASH_SIZE>>,
    terminal: ProofTerminal<HASH_SIZE>,
}

impl<const HASH_SIZE: usize> Proof<HASH_SIZE> {
    pub fn new(siblings: Vec<ProofNode<HASH_SIZE>>, terminal: ProofTerminal<HASH_SIZE>) -> Self {
        Self { siblings, terminal }
    }

    /// Returns the siblings in the proof, root first.
    pub fn siblings(&self) -> &[ProofNode<HASH_SIZE>] {
        &self.siblings
    }

    pub fn terminal(&self) -> &ProofTerminal<HASH_SIZE> {
        &self.terminal
    }

    /// Computes the root digest and sum the proof leads to when walking up
    /// `path`.
    pub fn root<H: Hasher<HASH_SIZE> + Clone>(
        &self,
        scheme: &DigestScheme<HASH_SIZE, H>,
        path: &[u8; HASH_SIZE],
    ) -> Result<([u8; HASH_SIZE], Sum), ProofError> {
        if self.siblings.len() > HASH_SIZE * 8 {
            return Err(ProofError::InvalidProof);
        }
        let start = match &self.terminal {
            ProofTerminal::Placeholder => (Node::<HASH_SIZE>::PLACEHOLDER_DIGEST, 0),
            ProofTerminal::Leaf {
                path,
                value_hash,
                weight,
            } => (scheme.leaf_digest(path, value_hash, *weight), *weight),
        };
        self.siblings
            .iter()
            .enumerate()
            .rev()
            .try_fold(start, |(digest, sum), (depth, sibling)| {
                let sum = sum
                    .checked_add(sibling.sum())
                    .ok_or(ProofError::SumOverflow)?;
                let digest = if bit_index(depth, path) == 0 {
                    scheme.inner_digest(&digest, &sibling.digest(), sum)
                } else {
                    scheme.inner_digest(&sibling.digest(), &digest, sum)
                };
                Ok((digest, sum))
            })
    }

    /// Verify a merkle proof for a given key.
    ///
    /// # Arguments
    ///
    /// * `scheme` - The digest scheme of the trie the proof comes from
    /// * `root` - The expected root of the trie
    /// * `key` - The key to verify the proof for
    /// * `leaf` - The value and weight expected under `key`, `None` to verify
    ///   that the key is absent
    ///
    /// # Returns
    ///
    /// Returns `Ok(())` if the proof is valid, otherwise returns an error.
    pub fn verify<H: Hasher<HASH_SIZE> + Clone>(
        &self,
        scheme: &DigestScheme<HASH_SIZE, H>,
        root: &[u8; HASH_SIZE],
        key: &[u8],
        leaf: Option<(&[u8], Sum)>,
    ) -> Result<(), ProofError> {
        let path = scheme.path(key);
        let (computed, _) = self.root(scheme, &path)?;
        let depth = self.siblings.len();
        let shows_expected = match (&self.terminal, leaf) {
            (ProofTerminal::Placeholder, None) => true,
            (ProofTerminal::Placeholder, Some(_)) => false,
            // The leaf must sit where the path of `key` ends
            (ProofTerminal::Leaf { path: other, .. }, None) => {
                *other != path && common_prefix_len(other, &path, 0, depth) == depth
            }
            (
                ProofTerminal::Leaf {
                    path: leaf_path,
                    value_hash,
                    weight,
                },
                Some((value, expected_weight)),
            ) => {
                let expected_weight = if scheme.is_sum_trie() {
                    expected_weight
                } else {
                    0
                };
                *leaf_path == path
                    && *value_hash == scheme.value_hash(value)
                    && *weight == expected_weight
            }
        };
        if shows_expected && computed == *root {
            Ok(())
        } else {
            Err(ProofError::InvalidProof)
        }
    }

    /// Compresses the proof into a compressed proof.
    pub fn compress(&self) -> CompressedProof<HASH_SIZE> {
        let mut bits = BitVec::with_capacity(self.siblings.len());
        let mut nodes = Vec::new();
        for sibling in &self.siblings {
            if sibling.is_placeholder() {
                bits.push(true);
            } else {
                bits.push(false);
                nodes.push(*sibling);
            }
        }
        CompressedProof::new(nodes, bits, self.terminal.clone())
    }
}

/// A compressed merkle proof for a given key.
/// We don't store the siblings that are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedProof<const HASH_SIZE: usize> {
    nodes: Vec<ProofNode<HASH_SIZE>>,
    /// One bit per depth, set when the sibling is empty.
    bits: BitVec<u8, Lsb0>,
    terminal: ProofTerminal<HASH_SIZE>,
}

impl<const HASH_SIZE: usize> CompressedProof<HASH_SIZE> {
    /// Creates a new compressed proof from a list of nodes and a bitvector.
    pub fn new(
        nodes: Vec<ProofNode<HASH_SIZE>>,
        bits: BitVec<u8, Lsb0>,
        terminal: ProofTerminal<HASH_SIZE>,
    ) -> Self {
        Self {
            nodes,
            bits,
            terminal,
        }
    }

    pub fn nodes(&self) -> &[ProofNode<HASH_SIZE>] {
        &self.nodes
    }

    /// Decompresses the proof into a proof.
    pub fn decompress(&self) -> Result<Proof<HASH_SIZE>, ProofError> {
        if self.nodes.len() != self.bits.count_zeros() || self.bits.len() > HASH_SIZE * 8 {
            return Err(ProofError::MalformedCompression);
        }
        let mut nodes = self.nodes.iter();
        let siblings = self
            .bits
            .iter()
            .by_vals()
            .map(|empty| {
                if empty {
                    Ok(ProofNode::placeholder())
                } else {
                    nodes.next().copied().ok_or(ProofError::MalformedCompression)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Proof::new(siblings, self.terminal.clone()))
    }

    /// Encodes the proof into a byte vector.
    ///
    /// `depth(2) || bits || (digest || sum(8))* || terminal`
    pub fn encode(&self) -> Vec<u8> {
        let mut encoded = Vec::new();
        encoded.extend_from_slice(&(self.bits.len() as u16).to_be_bytes());
        encoded.extend_from_slice(self.bits.as_raw_slice());
        for node in &self.nodes {
            encoded.extend_from_slice(&node.digest());
            encoded.extend_from_slice(&node.sum().to_be_bytes());
        }
        match &self.terminal {
            ProofTerminal::Placeholder => encoded.push(TERMINAL_PLACEHOLDER),
            ProofTerminal::Leaf {
                path,
                value_hash,
                weight,
            } => {
                encoded.push(TERMINAL_LEAF);
                encoded.extend_from_slice(path);
                encoded.extend_from_slice(value_hash);
                encoded.extend_from_slice(&weight.to_be_bytes());
            }
        }
        encoded
    }

    /// Decodes a proof from a byte vector.
    pub fn decode(data: &[u8]) -> Result<Self, ProofError> {
        let mut reader = Reader(data);
        let depth = u16::from_be_bytes(reader.take()?) as usize;
        let raw_bits = reader.bytes(depth.div_ceil(8))?;
        let mut bits = BitVec::<u8, Lsb0>::from_slice(raw_bits);
        bits.truncate(depth);

        let nodes = (0..bits.count_zeros())
            .map(|_| -> Result<ProofNode<HASH_SIZE>, ProofError> {
                Ok(ProofNode::new(reader.take()?, Sum::from_be_bytes(reader.take()?)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let terminal = match reader.take::<1>()? {
            [TERMINAL_PLACEHOLDER] => ProofTerminal::Placeholder,
            [TERMINAL_LEAF] => ProofTerminal::Leaf {
                path: reader.take()?,
                value_hash: reader.take()?,
                weight: Sum::from_be_bytes(reader.take()?),
            },
            _ => return Err(ProofError::MalformedCompression),
        };
        if !reader.0.is_empty() {
            return Err(ProofError::MalformedCompression);
        }
        Ok(Self::new(nodes, bits, terminal))
    }
}

/// Cursor over an encoded compressed proof.
struct Reader<'a>(&'a [u8]);

impl<'a> Reader<'a> {
    fn bytes(&mut self, len: usize) -> Result<&'a [u8], ProofError> {
        if self.0.len() < len {
            return Err(ProofError::MalformedCompression);
        }
        let (head, tail) = self.0.split_at(len);
        self.0 = tail;
        Ok(head)
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], ProofError> {
        let mut array = [0; N];
        array.copy_from_slice(self.bytes(N)?);
        Ok(array)
    }
}
