//! # Audit Records
//!
//! The durable record a successful purchase leaves behind. Appended to
//! the ledger's event log inside the commit step and returned to the
//! caller, so external observers and the submitter see the same facts.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::types::Address;

/// Emitted once per accepted purchase.
///
/// `prices` are the effective per-bundle prices: the signed values in
/// price-list mode, or quantity × unit price in unit-price mode (in which
/// case `unit_price` is populated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundlesPurchased {
    /// The buyer the order was bound to.
    pub buyer: Address,
    /// Claimed bundle ids, in submission order.
    pub bundle_ids: Vec<U256>,
    /// Effective per-bundle prices, matching `bundle_ids` by index.
    pub prices: Vec<U256>,
    /// The stored unit price, when unit-price mode computed the totals.
    pub unit_price: Option<U256>,
    /// Sum of `prices`; equals the payment that was attached.
    pub total: U256,
    /// The order's timestamp (Unix seconds).
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bincode_roundtrip() {
        let event = BundlesPurchased {
            buyer: Address::new([7; 20]),
            bundle_ids: vec![U256::from(1), U256::from(2)],
            prices: vec![U256::exp10(18), U256::exp10(18) * U256::from(2)],
            unit_price: None,
            total: U256::exp10(18) * U256::from(3),
            timestamp: 1_700_000_000,
        };
        let bytes = bincode::serialize(&event).unwrap();
        let back: BundlesPurchased = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, event);
    }
}
