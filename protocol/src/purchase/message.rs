//! # Order Message
//!
//! Builds the digest the off-chain authority signs. The message binds the
//! buyer and the timestamp to the purchases commitment under fixed domain
//! tags, so a signed order cannot be replayed by a different buyer, moved
//! to a different time, or reinterpreted as authorization for an
//! unrelated message format.
//!
//! Layout, hashed with Keccak-256:
//!
//! ```text
//! "Purchase" ‖ buyer (20B) ‖ "Timestamp" ‖ timestamp (32B BE word)
//!            ‖ "Champz" ‖ commitment (32B)
//! ```

use primitive_types::U256;

use crate::config::{DOMAIN_TAG, PURCHASE_TAG, TIMESTAMP_TAG};
use crate::crypto::keccak256_multi;
use crate::purchase::commitment::encode_word;
use crate::types::Address;

/// Encodes a Unix-seconds timestamp as the 32-byte word the message
/// layout carries.
pub(crate) fn timestamp_word(timestamp: u64) -> [u8; 32] {
    encode_word(&U256::from(timestamp))
}

/// The order digest: what the authority's wallet is asked to sign
/// (after its own signed-message prefixing).
pub fn order_digest(buyer: &Address, timestamp: u64, commitment: &[u8; 32]) -> [u8; 32] {
    keccak256_multi(&[
        PURCHASE_TAG,
        buyer.as_bytes(),
        TIMESTAMP_TAG,
        &timestamp_word(timestamp),
        DOMAIN_TAG,
        commitment,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keccak256;

    fn buyer() -> Address {
        Address::new([0x11; 20])
    }

    #[test]
    fn digest_matches_manual_concatenation() {
        let commitment = [0x22u8; 32];
        let ts = 1_700_000_000u64;

        let mut manual = Vec::new();
        manual.extend_from_slice(b"Purchase");
        manual.extend_from_slice(&[0x11; 20]);
        manual.extend_from_slice(b"Timestamp");
        manual.extend_from_slice(&timestamp_word(ts));
        manual.extend_from_slice(b"Champz");
        manual.extend_from_slice(&commitment);

        assert_eq!(order_digest(&buyer(), ts, &commitment), keccak256(&manual));
    }

    #[test]
    fn digest_binds_the_buyer() {
        let commitment = [0u8; 32];
        let other = Address::new([0x12; 20]);
        assert_ne!(
            order_digest(&buyer(), 1, &commitment),
            order_digest(&other, 1, &commitment)
        );
    }

    #[test]
    fn digest_binds_the_timestamp() {
        let commitment = [0u8; 32];
        assert_ne!(
            order_digest(&buyer(), 1, &commitment),
            order_digest(&buyer(), 2, &commitment)
        );
    }

    #[test]
    fn digest_binds_the_commitment() {
        assert_ne!(
            order_digest(&buyer(), 1, &[0u8; 32]),
            order_digest(&buyer(), 1, &[1u8; 32])
        );
    }

    #[test]
    fn timestamp_word_is_left_padded() {
        let word = timestamp_word(1);
        assert_eq!(&word[..31], &[0u8; 31]);
        assert_eq!(word[31], 1);
    }
}
