//! # Claim Ledger — Persistent Store
//!
//! The durable half of the engine, built on sled's embedded key-value
//! store. Everything that must survive a restart lives here: the claim
//! table, the authorized-signer and payment-receiver identities, the
//! optional unit price, the cumulative collected payment, and the
//! purchase audit log.
//!
//! ## Tree Layout
//!
//! | Tree     | Key                  | Value                         |
//! |----------|----------------------|-------------------------------|
//! | `claims` | bundle id (32B BE)   | `[1]` (presence = claimed)    |
//! | `meta`   | name (UTF-8)         | raw bytes (see accessors)     |
//! | `events` | sequence id (8B BE)  | `bincode(BundlesPurchased)`   |
//!
//! Claim keys are big-endian words so sled's lexicographic order matches
//! numeric order. A claim entry is never removed — absence means
//! unclaimed, presence means claimed, forever.
//!
//! ## Atomicity
//!
//! [`claim_all`](ClaimLedger::claim_all) applies every flip of a batch in
//! one sled `Batch`: either the whole batch lands or none of it does.

use primitive_types::U256;
use sled::{Batch, Db, Tree};
use std::path::Path;
use thiserror::Error;

use crate::purchase::commitment::encode_word;
use crate::purchase::event::BundlesPurchased;
use crate::types::Address;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("corrupt ledger value for {key}: {reason}")]
    Corrupt {
        /// Which stored value failed to decode.
        key: &'static str,
        /// What went wrong.
        reason: String,
    },
}

pub type LedgerResult<T> = Result<T, LedgerError>;

// ---------------------------------------------------------------------------
// Meta Keys
// ---------------------------------------------------------------------------

const META_OWNER: &[u8] = b"owner";
const META_PAYMENT_RECEIVER: &[u8] = b"payment_receiver";
const META_UNIT_PRICE: &[u8] = b"unit_price";
const META_COLLECTED: &[u8] = b"collected";

/// Value stored for a claimed bundle id.
const CLAIMED: &[u8] = &[1];

// ---------------------------------------------------------------------------
// ClaimLedger
// ---------------------------------------------------------------------------

/// Persistent state store for the purchase engine.
///
/// sled trees are individually thread-safe; `ClaimLedger` is `Clone` and
/// can be shared freely. Check-then-write sequencing across calls is the
/// engine's job, not the ledger's.
#[derive(Debug, Clone)]
pub struct ClaimLedger {
    /// Underlying sled handle, kept for id generation and flushing.
    db: Db,
    /// Claimed bundle ids.
    claims: Tree,
    /// Identities, unit price, and collected total.
    meta: Tree,
    /// Append-only purchase audit log.
    events: Tree,
}

impl ClaimLedger {
    /// Open or create a ledger at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> LedgerResult<Self> {
        Self::from_db(sled::open(path)?)
    }

    /// Create a temporary ledger that is discarded on drop. For tests.
    pub fn open_temporary() -> LedgerResult<Self> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: Db) -> LedgerResult<Self> {
        let claims = db.open_tree("claims")?;
        let meta = db.open_tree("meta")?;
        let events = db.open_tree("events")?;
        Ok(Self {
            db,
            claims,
            meta,
            events,
        })
    }

    // -- claims -------------------------------------------------------------

    /// Whether a bundle id has been claimed.
    pub fn is_claimed(&self, id: U256) -> LedgerResult<bool> {
        Ok(self.claims.contains_key(encode_word(&id))?)
    }

    /// Marks every id in the batch claimed, atomically.
    pub fn claim_all(&self, ids: &[U256]) -> LedgerResult<()> {
        let mut batch = Batch::default();
        for id in ids {
            batch.insert(&encode_word(id), CLAIMED);
        }
        self.claims.apply_batch(batch)?;
        Ok(())
    }

    /// Number of claimed bundles. For status reporting.
    pub fn claimed_count(&self) -> usize {
        self.claims.len()
    }

    // -- identities ---------------------------------------------------------

    /// The authorized-signer identity, if initialized.
    pub fn owner(&self) -> LedgerResult<Option<Address>> {
        self.read_address(META_OWNER)
    }

    /// Stores the authorized-signer identity (initialize or transfer).
    pub fn set_owner(&self, owner: &Address) -> LedgerResult<()> {
        self.meta.insert(META_OWNER, &owner.0[..])?;
        Ok(())
    }

    /// The payment receiver, if initialized.
    pub fn payment_receiver(&self) -> LedgerResult<Option<Address>> {
        self.read_address(META_PAYMENT_RECEIVER)
    }

    /// Stores the payment-receiver identity.
    pub fn set_payment_receiver(&self, receiver: &Address) -> LedgerResult<()> {
        self.meta.insert(META_PAYMENT_RECEIVER, &receiver.0[..])?;
        Ok(())
    }

    fn read_address(&self, key: &'static [u8]) -> LedgerResult<Option<Address>> {
        match self.meta.get(key)? {
            None => Ok(None),
            Some(raw) => {
                let bytes: [u8; 20] =
                    raw.as_ref()
                        .try_into()
                        .map_err(|_| LedgerError::Corrupt {
                            key: "address",
                            reason: format!("expected 20 bytes, found {}", raw.len()),
                        })?;
                Ok(Some(Address::new(bytes)))
            }
        }
    }

    // -- pricing ------------------------------------------------------------

    /// The stored unit price, when unit-price mode was configured.
    pub fn unit_price(&self) -> LedgerResult<Option<U256>> {
        match self.meta.get(META_UNIT_PRICE)? {
            None => Ok(None),
            Some(raw) => Ok(Some(Self::decode_u256("unit_price", &raw)?)),
        }
    }

    /// Stores the unit price.
    pub fn set_unit_price(&self, price: &U256) -> LedgerResult<()> {
        self.meta.insert(META_UNIT_PRICE, &encode_word(price)[..])?;
        Ok(())
    }

    // -- payment ------------------------------------------------------------

    /// Cumulative payment collected for the receiver.
    pub fn collected(&self) -> LedgerResult<U256> {
        match self.meta.get(META_COLLECTED)? {
            None => Ok(U256::zero()),
            Some(raw) => Self::decode_u256("collected", &raw),
        }
    }

    /// Credits a payment to the receiver's running total and returns the
    /// new total.
    pub fn add_collected(&self, amount: U256) -> LedgerResult<U256> {
        let total = self.collected()?.saturating_add(amount);
        self.meta.insert(META_COLLECTED, &encode_word(&total)[..])?;
        Ok(total)
    }

    fn decode_u256(key: &'static str, raw: &[u8]) -> LedgerResult<U256> {
        if raw.len() != 32 {
            return Err(LedgerError::Corrupt {
                key,
                reason: format!("expected 32 bytes, found {}", raw.len()),
            });
        }
        Ok(U256::from_big_endian(raw))
    }

    // -- audit log ----------------------------------------------------------

    /// Appends a purchase record to the audit log and returns its
    /// sequence id.
    pub fn append_event(&self, event: &BundlesPurchased) -> LedgerResult<u64> {
        let seq = self.db.generate_id()?;
        let encoded = bincode::serialize(event).map_err(|e| LedgerError::Corrupt {
            key: "event",
            reason: e.to_string(),
        })?;
        self.events.insert(seq.to_be_bytes(), encoded)?;
        Ok(seq)
    }

    /// All purchase records, in append order.
    pub fn events(&self) -> LedgerResult<Vec<BundlesPurchased>> {
        let mut out = Vec::with_capacity(self.events.len());
        for entry in self.events.iter() {
            let (_, raw) = entry?;
            let event = bincode::deserialize(&raw).map_err(|e| LedgerError::Corrupt {
                key: "event",
                reason: e.to_string(),
            })?;
            out.push(event);
        }
        Ok(out)
    }

    /// Flushes pending writes to disk.
    pub fn flush(&self) -> LedgerResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> ClaimLedger {
        ClaimLedger::open_temporary().expect("temp ledger")
    }

    #[test]
    fn fresh_ids_are_unclaimed() {
        let l = ledger();
        assert!(!l.is_claimed(U256::from(42)).unwrap());
    }

    #[test]
    fn claim_all_flips_every_id() {
        let l = ledger();
        let ids = [U256::from(1), U256::from(2), U256::from(3)];
        l.claim_all(&ids).unwrap();
        for id in ids {
            assert!(l.is_claimed(id).unwrap());
        }
        assert_eq!(l.claimed_count(), 3);
    }

    #[test]
    fn owner_starts_unset_and_persists() {
        let l = ledger();
        assert!(l.owner().unwrap().is_none());
        let addr = Address::new([9; 20]);
        l.set_owner(&addr).unwrap();
        assert_eq!(l.owner().unwrap(), Some(addr));
    }

    #[test]
    fn unit_price_roundtrips() {
        let l = ledger();
        assert!(l.unit_price().unwrap().is_none());
        let price = U256::exp10(16);
        l.set_unit_price(&price).unwrap();
        assert_eq!(l.unit_price().unwrap(), Some(price));
    }

    #[test]
    fn collected_accumulates() {
        let l = ledger();
        assert_eq!(l.collected().unwrap(), U256::zero());
        l.add_collected(U256::from(100)).unwrap();
        let total = l.add_collected(U256::from(50)).unwrap();
        assert_eq!(total, U256::from(150));
        assert_eq!(l.collected().unwrap(), U256::from(150));
    }

    #[test]
    fn events_append_in_order() {
        let l = ledger();
        for i in 0..3u64 {
            let event = BundlesPurchased {
                buyer: Address::new([i as u8; 20]),
                bundle_ids: vec![U256::from(i)],
                prices: vec![U256::from(10)],
                unit_price: None,
                total: U256::from(10),
                timestamp: i,
            };
            l.append_event(&event).unwrap();
        }
        let events = l.events().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].timestamp, 0);
        assert_eq!(events[2].timestamp, 2);
    }

    #[test]
    fn state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let l = ClaimLedger::open(dir.path()).unwrap();
            l.set_owner(&Address::new([1; 20])).unwrap();
            l.claim_all(&[U256::from(7)]).unwrap();
            l.flush().unwrap();
        }
        let l = ClaimLedger::open(dir.path()).unwrap();
        assert_eq!(l.owner().unwrap(), Some(Address::new([1; 20])));
        assert!(l.is_claimed(U256::from(7)).unwrap());
    }
}
