//! # Core Wire Types
//!
//! Fixed-width byte types shared across the protocol: the 20-byte account
//! [`Address`] and the 65-byte recoverable [`Signature`]. Both render as
//! `0x`-prefixed hex everywhere a human or a JSON payload sees them, and
//! both parse the prefix back off leniently.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::config::{ADDRESS_LENGTH, SIGNATURE_LENGTH};

/// Errors from parsing hex-encoded wire types.
#[derive(Debug, Error, PartialEq)]
pub enum ParseBytesError {
    /// The hex payload decoded to the wrong number of bytes.
    #[error("expected {expected} bytes, got {actual}")]
    BadLength {
        /// Required byte width.
        expected: usize,
        /// Width actually supplied.
        actual: usize,
    },

    /// The string was not valid hexadecimal.
    #[error("invalid hex: {0}")]
    BadHex(#[from] hex::FromHexError),
}

/// Strips an optional `0x`/`0X` prefix.
fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte account identifier.
///
/// The same shape Ethereum uses: the low 20 bytes of the Keccak-256 hash
/// of an uncompressed secp256k1 public key. Plays three roles in this
/// protocol — authorized signer, payment receiver, and buyer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address(pub [u8; ADDRESS_LENGTH]);

impl Address {
    /// Wraps a raw 20-byte array.
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = ParseBytesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = hex::decode(strip_hex_prefix(s))?;
        let bytes: [u8; ADDRESS_LENGTH] =
            raw.as_slice()
                .try_into()
                .map_err(|_| ParseBytesError::BadLength {
                    expected: ADDRESS_LENGTH,
                    actual: raw.len(),
                })?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A 65-byte recoverable secp256k1 signature: `r ‖ s ‖ v`.
///
/// The recovery byte `v` follows the `eth_sign` convention (27 or 28);
/// the raw recovery ids 0 and 1 are accepted on the way in. The bytes are
/// opaque here — interpretation lives in [`crate::crypto::recover`].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; SIGNATURE_LENGTH]);

impl Signature {
    /// Wraps a raw 65-byte array.
    pub const fn new(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Builds a signature from a variable-length slice, enforcing the
    /// 65-byte width. This is the entry point for bytes off the wire.
    pub fn from_slice(raw: &[u8]) -> Result<Self, ParseBytesError> {
        let bytes: [u8; SIGNATURE_LENGTH] =
            raw.try_into().map_err(|_| ParseBytesError::BadLength {
                expected: SIGNATURE_LENGTH,
                actual: raw.len(),
            })?;
        Ok(Self(bytes))
    }

    /// The 64-byte `r ‖ s` half.
    pub fn rs(&self) -> &[u8] {
        &self.0[..64]
    }

    /// The recovery byte `v`.
    pub fn v(&self) -> u8 {
        self.0[64]
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

impl FromStr for Signature {
    type Err = ParseBytesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = hex::decode(strip_hex_prefix(s))?;
        Self::from_slice(&raw)
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
