//! # Purchases Commitment
//!
//! Canonical serialization of a purchase batch and its reduction to the
//! 32-byte commitment the authority signs over. The layout is fixed:
//! every bundle id as a big-endian, left-zero-padded 32-byte word in
//! order, then every value likewise, ids block first, hashed with
//! Keccak-256. Order matters for the commitment — swapping two items
//! yields a different digest — even though claim semantics key each id
//! independently.

use std::collections::HashSet;

use primitive_types::U256;

use crate::crypto::keccak256;
use crate::purchase::error::PurchaseError;

/// Encodes a 256-bit value as a big-endian, left-zero-padded 32-byte word.
pub(crate) fn encode_word(value: &U256) -> [u8; 32] {
    value.to_big_endian()
}

/// A validated batch of (bundle id, value) pairs.
///
/// Construction is the validation gate: a `PurchaseBatch` that exists has
/// matching non-empty sequences and no repeated bundle id. Depending on
/// the engine's pricing mode the values are either prices or quantities;
/// the commitment covers whichever the authority signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseBatch {
    bundle_ids: Vec<U256>,
    values: Vec<U256>,
}

impl PurchaseBatch {
    /// Validates and builds a batch.
    ///
    /// # Errors
    ///
    /// Returns [`PurchaseError::MalformedBatch`] on mismatched lengths,
    /// [`PurchaseError::EmptyBatch`] on an empty batch, and
    /// [`PurchaseError::DuplicateItem`] when a bundle id repeats.
    pub fn new(bundle_ids: Vec<U256>, values: Vec<U256>) -> Result<Self, PurchaseError> {
        if bundle_ids.len() != values.len() {
            return Err(PurchaseError::MalformedBatch {
                ids: bundle_ids.len(),
                values: values.len(),
            });
        }
        if bundle_ids.is_empty() {
            return Err(PurchaseError::EmptyBatch);
        }

        let mut seen = HashSet::with_capacity(bundle_ids.len());
        for id in &bundle_ids {
            if !seen.insert(*id) {
                return Err(PurchaseError::DuplicateItem { id: *id });
            }
        }

        Ok(Self { bundle_ids, values })
    }

    /// The bundle ids, in submission order.
    pub fn bundle_ids(&self) -> &[U256] {
        &self.bundle_ids
    }

    /// The values (prices or quantities), in submission order.
    pub fn values(&self) -> &[U256] {
        &self.values
    }

    /// Number of items in the batch.
    pub fn len(&self) -> usize {
        self.bundle_ids.len()
    }

    /// Always false — empty batches cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.bundle_ids.is_empty()
    }

    /// The purchases commitment: Keccak-256 over the id block followed by
    /// the value block.
    pub fn commitment(&self) -> [u8; 32] {
        let mut encoded = Vec::with_capacity(32 * 2 * self.bundle_ids.len());
        for id in &self.bundle_ids {
            encoded.extend_from_slice(&encode_word(id));
        }
        for value in &self.values {
            encoded.extend_from_slice(&encode_word(value));
        }
        keccak256(&encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<U256> {
        raw.iter().copied().map(U256::from).collect()
    }

    #[test]
    fn mismatched_lengths_rejected() {
        let err = PurchaseBatch::new(ids(&[1, 2]), ids(&[1])).unwrap_err();
        assert!(matches!(
            err,
            PurchaseError::MalformedBatch { ids: 2, values: 1 }
        ));
    }

    #[test]
    fn empty_batch_rejected() {
        let err = PurchaseBatch::new(vec![], vec![]).unwrap_err();
        assert!(matches!(err, PurchaseError::EmptyBatch));
    }

    #[test]
    fn duplicate_id_rejected() {
        let err = PurchaseBatch::new(ids(&[1, 2, 1]), ids(&[10, 20, 30])).unwrap_err();
        assert!(matches!(
            err,
            PurchaseError::DuplicateItem { id } if id == U256::from(1)
        ));
    }

    #[test]
    fn duplicate_values_are_fine() {
        // Only ids must be unique; two bundles may share a price.
        assert!(PurchaseBatch::new(ids(&[1, 2]), ids(&[10, 10])).is_ok());
    }

    #[test]
    fn words_are_left_padded_big_endian() {
        let word = encode_word(&U256::from(0x0102u64));
        assert_eq!(&word[..30], &[0u8; 30]);
        assert_eq!(&word[30..], &[0x01, 0x02]);
    }

    #[test]
    fn commitment_matches_manual_layout() {
        let batch = PurchaseBatch::new(ids(&[1, 2]), ids(&[3, 4])).unwrap();

        let mut manual = Vec::new();
        for v in [1u64, 2, 3, 4] {
            manual.extend_from_slice(&encode_word(&U256::from(v)));
        }
        assert_eq!(batch.commitment(), keccak256(&manual));
    }

    #[test]
    fn commitment_is_order_sensitive() {
        let a = PurchaseBatch::new(ids(&[1, 2]), ids(&[3, 4])).unwrap();
        let b = PurchaseBatch::new(ids(&[2, 1]), ids(&[4, 3])).unwrap();
        assert_ne!(a.commitment(), b.commitment());
    }

    #[test]
    fn commitment_binds_values() {
        let a = PurchaseBatch::new(ids(&[1, 2]), ids(&[3, 4])).unwrap();
        let b = PurchaseBatch::new(ids(&[1, 2]), ids(&[3, 5])).unwrap();
        assert_ne!(a.commitment(), b.commitment());
    }
}
