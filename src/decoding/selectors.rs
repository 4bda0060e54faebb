//! Event-kind identifiers.
//!
//! A Starknet event is classified by its first key, the `starknet_keccak` of
//! the declared event name. The selectors of every kind this indexer
//! understands are computed once into a [`SelectorTable`], which both the
//! stream filters and the per-event dispatch read from.

use std::collections::HashMap;

use alloy_primitives::{keccak256, U256};

use crate::types::felt::Felt;

/// keccak256 truncated to 250 bits.
pub fn starknet_keccak(data: &[u8]) -> Felt {
    let mut hash = keccak256(data).0;
    hash[0] &= 0x03;
    Felt::from_u256_unchecked(U256::from_be_bytes(hash))
}

/// Selector of an event or function from its declared name.
pub fn get_selector_from_name(name: &str) -> Felt {
    starknet_keccak(name.as_bytes())
}

/// Every event kind the transforms react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// ERC20 `Transfer` on a payment token.
    Transfer,
    /// `starknet_id_update` on the naming contract; closes a sale.
    DomainUpdate,
    /// `SaleMetadata` on the naming contract.
    SaleMetadata,
    /// `domain_renewed` on the renewal contract.
    AutoRenew,
    /// `on_commission` on the referral contract.
    Referral,
    /// `UpdatedRenewal` on the renewal contract.
    UpdatedRenewal,
    /// `DisabledRenewal` on the renewal contract.
    DisabledRenewal,
}

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        EventKind::Transfer,
        EventKind::DomainUpdate,
        EventKind::SaleMetadata,
        EventKind::AutoRenew,
        EventKind::Referral,
        EventKind::UpdatedRenewal,
        EventKind::DisabledRenewal,
    ];

    /// Event name as declared by the emitting contract.
    pub fn event_name(self) -> &'static str {
        match self {
            EventKind::Transfer => "Transfer",
            EventKind::DomainUpdate => "starknet_id_update",
            EventKind::SaleMetadata => "SaleMetadata",
            EventKind::AutoRenew => "domain_renewed",
            EventKind::Referral => "on_commission",
            EventKind::UpdatedRenewal => "UpdatedRenewal",
            EventKind::DisabledRenewal => "DisabledRenewal",
        }
    }
}

/// Lookup between event kinds and their selectors, built once at startup.
#[derive(Debug, Clone)]
pub struct SelectorTable {
    selectors: HashMap<EventKind, Felt>,
    kinds: HashMap<Felt, EventKind>,
}

impl SelectorTable {
    pub fn new() -> Self {
        let mut selectors = HashMap::with_capacity(EventKind::ALL.len());
        let mut kinds = HashMap::with_capacity(EventKind::ALL.len());

        for kind in EventKind::ALL {
            let selector = get_selector_from_name(kind.event_name());
            selectors.insert(kind, selector);
            kinds.insert(selector, kind);
        }

        Self { selectors, kinds }
    }

    /// Selector for a kind.
    pub fn selector(&self, kind: EventKind) -> Felt {
        self.selectors[&kind]
    }

    /// Classify an event key; `None` for kinds this indexer does not know.
    pub fn kind_of(&self, key: &Felt) -> Option<EventKind> {
        self.kinds.get(key).copied()
    }
}

impl Default for SelectorTable {
    fn default() -> Self {
        Self::new()
    }
}
