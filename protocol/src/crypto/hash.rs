//! # Keccak-256
//!
//! The protocol's only hash primitive. Both digests the scheme produces —
//! the purchases commitment and the signed order digest — are Keccak-256,
//! because the off-chain authority signs with Ethereum tooling and the two
//! sides must agree byte for byte. Note this is the original Keccak
//! padding, not NIST SHA-3: `sha3::Keccak256`, not `sha3::Sha3_256`.

use sha3::{Digest, Keccak256};

/// Compute the Keccak-256 hash of the input data.
///
/// Returns the 32-byte digest as a fixed-size array.
///
/// # Example
///
/// ```
/// use champz_protocol::crypto::keccak256;
///
/// let digest = keccak256(b"Champz");
/// assert_eq!(digest.len(), 32);
/// ```
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash multiple byte slices as one message, without concatenating them
/// into a temporary buffer first.
///
/// Feeding the parts sequentially into the hasher produces exactly the
/// digest of their concatenation. This is how the tagged order message
/// (`tag ‖ buyer ‖ tag ‖ timestamp ‖ tag ‖ commitment`) is hashed.
pub fn keccak256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_known_vector() {
        // Keccak-256 of the empty string. Distinct from the SHA3-256 vector,
        // which is the quickest way to catch a wrong padding variant.
        let digest = keccak256(b"");
        let expected =
            hex::decode("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
                .unwrap();
        assert_eq!(digest.as_slice(), expected.as_slice());
    }

    #[test]
    fn abc_known_vector() {
        let digest = keccak256(b"abc");
        let expected =
            hex::decode("4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45")
                .unwrap();
        assert_eq!(digest.as_slice(), expected.as_slice());
    }

    #[test]
    fn deterministic() {
        assert_eq!(keccak256(b"champz"), keccak256(b"champz"));
    }

    #[test]
    fn different_inputs_differ() {
        assert_ne!(keccak256(b"champz"), keccak256(b"Champz"));
    }

    #[test]
    fn multi_matches_concatenation() {
        let multi = keccak256_multi(&[b"Purchase", b"Timestamp", b"Champz"]);
        let single = keccak256(b"PurchaseTimestampChampz");
        assert_eq!(multi, single);
    }

    #[test]
    fn multi_with_empty_parts() {
        let multi = keccak256_multi(&[b"", b"abc", b""]);
        assert_eq!(multi, keccak256(b"abc"));
    }
}
