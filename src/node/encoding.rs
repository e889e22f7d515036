//! Byte encoding of the nodes written to a [`crate::NodeStore`].
//!
//! * leaf: `0x00 || path || weight || value`
//! * inner: `0x01 || left || right` where each child is `digest || sum || count`
//! * extension: `0x02 || start || end || path || child`
//!
//! Integers are big endian, bounds are 2 bytes, sums and counts 8 bytes.
//! Children are decoded as [`LazyNode`]s.

use std::sync::Arc;

use thiserror::Error;

use super::{Count, ExtensionNode, InnerNode, LazyNode, LeafNode, Node, Sum};

pub(crate) const LEAF_PREFIX: u8 = 0;
pub(crate) const INNER_PREFIX: u8 = 1;
pub(crate) const EXTENSION_PREFIX: u8 = 2;

const SUM_SIZE: usize = 8;
const COUNT_SIZE: usize = 8;
const BOUND_SIZE: usize = 2;

/// A persisted node could not be decoded. The trie never treats such a node as
/// an empty subtree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("encoded node is empty")]
    Empty,
    #[error("unknown node prefix {0:#04x}")]
    UnknownPrefix(u8),
    #[error("encoded node has {actual} bytes, expected {expected}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("invalid extension bounds [{start}, {end})")]
    InvalidBounds { start: usize, end: usize },
    #[error("placeholder child carries sum {sum} and count {count}")]
    NonEmptyPlaceholder { sum: Sum, count: Count },
    #[error("extension child cannot be a placeholder")]
    EmptyExtension,
    #[error("node decoded to digest {actual}, expected {expected}")]
    DigestMismatch { expected: String, actual: String },
    #[error("node holds {actual} non-empty leaves but its parent recorded {expected}")]
    CountMismatch { expected: Count, actual: Count },
    #[error("node sums to {actual} but its parent recorded {expected}")]
    SumMismatch { expected: Sum, actual: Sum },
    #[error("sum {0} stored in a trie without weights")]
    UnexpectedSum(Sum),
    #[error("sum of the children overflows")]
    SumOverflow,
}

/// Raw content of an encoded node, before any hashing.
#[derive(Debug)]
pub(crate) enum Decoded<const HASH_SIZE: usize> {
    Leaf {
        path: [u8; HASH_SIZE],
        weight: Sum,
        value: Vec<u8>,
    },
    Inner {
        left: Arc<Node<HASH_SIZE>>,
        right: Arc<Node<HASH_SIZE>>,
    },
    Extension {
        path: [u8; HASH_SIZE],
        start: usize,
        end: usize,
        child: Arc<Node<HASH_SIZE>>,
    },
}

impl<const HASH_SIZE: usize> LeafNode<HASH_SIZE> {
    pub fn encode(&self) -> Vec<u8> {
        let mut encoded = Vec::with_capacity(1 + HASH_SIZE + SUM_SIZE + self.value().len());
        encoded.push(LEAF_PREFIX);
        encoded.extend_from_slice(self.path());
        encoded.extend_from_slice(&self.weight().to_be_bytes());
        encoded.extend_from_slice(self.value());
        encoded
    }
}

impl<const HASH_SIZE: usize> InnerNode<HASH_SIZE> {
    pub fn encode(&self) -> Vec<u8> {
        let mut encoded = Vec::with_capacity(1 + 2 * child_size::<HASH_SIZE>());
        encoded.push(INNER_PREFIX);
        encode_child(&mut encoded, self.left());
        encode_child(&mut encoded, self.right());
        encoded
    }
}

impl<const HASH_SIZE: usize> ExtensionNode<HASH_SIZE> {
    /// Bounds are encoded on 2 bytes, paths can't be longer.
    const BOUNDS_FIT: () = assert!(HASH_SIZE * 8 <= u16::MAX as usize);

    pub fn encode(&self) -> Vec<u8> {
        let () = Self::BOUNDS_FIT;
        let mut encoded =
            Vec::with_capacity(1 + 2 * BOUND_SIZE + HASH_SIZE + child_size::<HASH_SIZE>());
        encoded.push(EXTENSION_PREFIX);
        encoded.extend_from_slice(&(self.start() as u16).to_be_bytes());
        encoded.extend_from_slice(&(self.end() as u16).to_be_bytes());
        encoded.extend_from_slice(self.path());
        encode_child(&mut encoded, self.child());
        encoded
    }
}

const fn child_size<const HASH_SIZE: usize>() -> usize {
    HASH_SIZE + SUM_SIZE + COUNT_SIZE
}

fn encode_child<const HASH_SIZE: usize>(encoded: &mut Vec<u8>, child: &Node<HASH_SIZE>) {
    encoded.extend_from_slice(&child.digest());
    encoded.extend_from_slice(&child.sum().to_be_bytes());
    encoded.extend_from_slice(&child.count().to_be_bytes());
}

/// Splits the encoded node in its fields. Digests are not checked here.
pub(crate) fn decode<const HASH_SIZE: usize>(
    data: &[u8],
) -> Result<Decoded<HASH_SIZE>, EncodingError> {
    let (&prefix, body) = data.split_first().ok_or(EncodingError::Empty)?;
    match prefix {
        LEAF_PREFIX => {
            expect_len(body, HASH_SIZE + SUM_SIZE, false)?;
            let (path, rest) = body.split_at(HASH_SIZE);
            let (weight, value) = rest.split_at(SUM_SIZE);
            Ok(Decoded::Leaf {
                path: array(path),
                weight: Sum::from_be_bytes(array(weight)),
                value: value.to_vec(),
            })
        }
        INNER_PREFIX => {
            expect_len(body, 2 * child_size::<HASH_SIZE>(), true)?;
            let (left, right) = body.split_at(child_size::<HASH_SIZE>());
            Ok(Decoded::Inner {
                left: decode_child(left)?,
                right: decode_child(right)?,
            })
        }
        EXTENSION_PREFIX => {
            expect_len(
                body,
                2 * BOUND_SIZE + HASH_SIZE + child_size::<HASH_SIZE>(),
                true,
            )?;
            let (start, rest) = body.split_at(BOUND_SIZE);
            let (end, rest) = rest.split_at(BOUND_SIZE);
            let (path, child) = rest.split_at(HASH_SIZE);
            let start = u16::from_be_bytes(array(start)) as usize;
            let end = u16::from_be_bytes(array(end)) as usize;
            if start >= end || end > HASH_SIZE * 8 {
                return Err(EncodingError::InvalidBounds { start, end });
            }
            let child = decode_child(child)?;
            if child.is_placeholder() {
                return Err(EncodingError::EmptyExtension);
            }
            Ok(Decoded::Extension {
                path: array(path),
                start,
                end,
                child,
            })
        }
        prefix => Err(EncodingError::UnknownPrefix(prefix)),
    }
}

fn decode_child<const HASH_SIZE: usize>(
    data: &[u8],
) -> Result<Arc<Node<HASH_SIZE>>, EncodingError> {
    let (digest, rest) = data.split_at(HASH_SIZE);
    let (sum, count) = rest.split_at(SUM_SIZE);
    let digest: [u8; HASH_SIZE] = array(digest);
    let sum = Sum::from_be_bytes(array(sum));
    let count = Count::from_be_bytes(array(count));
    if digest == Node::<HASH_SIZE>::PLACEHOLDER_DIGEST {
        if sum != 0 || count != 0 {
            return Err(EncodingError::NonEmptyPlaceholder { sum, count });
        }
        return Ok(Arc::new(Node::Placeholder));
    }
    Ok(Arc::new(Node::Lazy(LazyNode::new(digest, sum, count))))
}

fn expect_len(body: &[u8], expected: usize, exact: bool) -> Result<(), EncodingError> {
    let valid = if exact {
        body.len() == expected
    } else {
        body.len() >= expected
    };
    if valid {
        Ok(())
    } else {
        Err(EncodingError::InvalidLength {
            expected: expected + 1,
            actual: body.len() + 1,
        })
    }
}

/// Callers check the length beforehand.
fn array<const N: usize>(slice: &[u8]) -> [u8; N] {
    let mut array = [0; N];
    array.copy_from_slice(slice);
    array
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::{decode, Decoded, EncodingError};
    use crate::node::{ExtensionNode, InnerNode, LazyNode, LeafNode, Node};

    #[test]
    fn test_leaf_encoding_layout() {
        let leaf = LeafNode::<32>::from_parts([1; 32], vec![9, 9], [2; 32], 258, [3; 32], false);
        let encoded = leaf.encode();
        assert_eq!(encoded.len(), 1 + 32 + 8 + 2);
        assert_eq!(encoded[0], 0);
        assert_eq!(&encoded[33..41], &[0, 0, 0, 0, 0, 0, 1, 2]);
        let Decoded::Leaf {
            path,
            weight,
            value,
        } = decode::<32>(&encoded).unwrap()
        else {
            panic!("expected a leaf");
        };
        assert_eq!(path, [1; 32]);
        assert_eq!(weight, 258);
        assert_eq!(value, vec![9, 9]);
    }

    #[test]
    fn test_inner_children_decode_lazily() {
        let left = Arc::new(Node::Lazy(LazyNode::new([4; 32], 7, 2)));
        let right = Arc::new(Node::Placeholder);
        let inner = InnerNode::from_parts(left, right, 7, 2, [5; 32], false);
        let Decoded::Inner { left, right } = decode::<32>(&inner.encode()).unwrap() else {
            panic!("expected an inner node");
        };
        assert_eq!(*left, Node::Lazy(LazyNode::new([4; 32], 7, 2)));
        assert!(right.is_placeholder());
    }

    #[test]
    fn test_extension_round_trip_bounds() {
        let child = Arc::new(Node::Lazy(LazyNode::new([4; 32], 7, 2)));
        let extension = ExtensionNode::from_parts([6; 32], 3, 256, child, [5; 32], false);
        let Decoded::Extension {
            path, start, end, ..
        } = decode::<32>(&extension.encode()).unwrap()
        else {
            panic!("expected an extension");
        };
        assert_eq!((path, start, end), ([6; 32], 3, 256));
    }

    #[test]
    fn test_wide_extension_bounds() {
        let child = Arc::new(Node::Lazy(LazyNode::new([4; 64], 7, 2)));
        let extension = ExtensionNode::from_parts([0; 64], 300, 512, child, [5; 64], false);
        let encoded = extension.encode();
        assert_eq!(&encoded[1..5], &[0x01, 0x2c, 0x02, 0x00]);
        let Decoded::Extension { start, end, .. } = decode::<64>(&encoded).unwrap() else {
            panic!("expected an extension");
        };
        assert_eq!((start, end), (300, 512));
    }

    #[test]
    fn test_malformed_nodes_are_rejected() {
        assert_eq!(decode::<32>(&[]).unwrap_err(), EncodingError::Empty);
        assert_eq!(
            decode::<32>(&[7, 1, 2]).unwrap_err(),
            EncodingError::UnknownPrefix(7)
        );
        assert_eq!(
            decode::<32>(&[1, 0, 0]).unwrap_err(),
            EncodingError::InvalidLength {
                expected: 97,
                actual: 3
            }
        );
        let mut extension = vec![2, 0, 9, 0, 9];
        extension.extend_from_slice(&[0; 32 + 48]);
        assert_eq!(
            decode::<32>(&extension).unwrap_err(),
            EncodingError::InvalidBounds { start: 9, end: 9 }
        );
    }

    #[test]
    fn test_placeholder_child_with_sum_is_rejected() {
        let mut inner = vec![1];
        inner.extend_from_slice(&[0; 32]);
        inner.extend_from_slice(&5u64.to_be_bytes());
        inner.extend_from_slice(&0u64.to_be_bytes());
        inner.extend_from_slice(&[1; 48]);
        assert_eq!(
            decode::<32>(&inner).unwrap_err(),
            EncodingError::NonEmptyPlaceholder { sum: 5, count: 0 }
        );
    }
}
