//! Block fixtures shared by transform tests.

use std::sync::Arc;

use crate::decoding::selectors::{EventKind, SelectorTable};
use crate::types::block::{Block, BlockHeader, EventWithTransaction, RawEvent, Transaction};
use crate::types::config::contract::Contracts;
use crate::types::felt::Felt;

pub const NAMING: u64 = 0x1001;
pub const ETH: u64 = 0x1002;
pub const REFERRAL: u64 = 0x1003;
pub const RENEWAL: u64 = 0x1004;
pub const TAX: u64 = 0x1005;
pub const STRK: u64 = 0x1006;

/// 1 ether in wei.
pub const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

/// "ben" and "sub" as encoded domain labels.
pub const BEN: u64 = 18925;
pub const SUB: u64 = 2222;

pub fn felt(v: u64) -> Felt {
    Felt::from(v)
}

pub fn contracts() -> Contracts {
    Contracts {
        naming: felt(NAMING),
        eth: felt(ETH),
        referral: felt(REFERRAL),
        renewal: felt(RENEWAL),
        tax: felt(TAX),
        tokens: vec![felt(ETH), felt(STRK)],
    }
}

pub fn selectors() -> Arc<SelectorTable> {
    Arc::new(SelectorTable::new())
}

pub struct BlockBuilder {
    timestamp_ms: u64,
    events: Vec<EventWithTransaction>,
    selectors: SelectorTable,
}

impl BlockBuilder {
    pub fn new(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            events: Vec::new(),
            selectors: SelectorTable::new(),
        }
    }

    pub fn raw(mut self, from: Felt, keys: Vec<Felt>, data: Vec<Felt>, tx: &str) -> Self {
        self.events.push(EventWithTransaction {
            event: RawEvent {
                from_address: from,
                keys,
                data,
            },
            transaction: Transaction {
                hash: tx.to_string(),
            },
        });
        self
    }

    pub fn event(
        self,
        from: u64,
        kind: EventKind,
        extra_keys: Vec<Felt>,
        data: Vec<Felt>,
        tx: &str,
    ) -> Self {
        let mut keys = vec![self.selectors.selector(kind)];
        keys.extend(extra_keys);
        self.raw(felt(from), keys, data, tx)
    }

    pub fn transfer(self, token: u64, from: u64, to: u64, amount: u128, tx: &str) -> Self {
        let data = vec![felt(from), felt(to), Felt::from(amount), felt(0)];
        self.event(token, EventKind::Transfer, vec![], data, tx)
    }

    /// `[label_count, labels.., owner, expiry]`
    pub fn domain_update(self, labels: &[u64], owner: u64, expiry: u64, tx: &str) -> Self {
        let mut data = vec![felt(labels.len() as u64)];
        data.extend(labels.iter().map(|l| felt(*l)));
        data.push(felt(owner));
        data.push(felt(expiry));
        self.event(NAMING, EventKind::DomainUpdate, vec![], data, tx)
    }

    /// `[timestamp, amount_low, amount_high, sponsor]`
    pub fn referral(self, comm: u64, sponsor: u64, tx: &str) -> Self {
        let data = vec![felt(0), felt(comm), felt(0), felt(sponsor)];
        self.event(REFERRAL, EventKind::Referral, vec![], data, tx)
    }

    pub fn auto_renew(self, domain: u64, tx: &str) -> Self {
        self.event(RENEWAL, EventKind::AutoRenew, vec![], vec![felt(domain)], tx)
    }

    pub fn sale_metadata(self, domain: u64, meta_hash: Felt, tx: &str) -> Self {
        let data = vec![felt(domain), meta_hash];
        self.event(NAMING, EventKind::SaleMetadata, vec![], data, tx)
    }

    pub fn updated_renewal(
        self,
        domain: u64,
        renewer: u64,
        allowance: u128,
        meta_hash: Felt,
        tx: &str,
    ) -> Self {
        let data = vec![felt(renewer), Felt::from(allowance), felt(0), meta_hash];
        self.event(RENEWAL, EventKind::UpdatedRenewal, vec![felt(domain)], data, tx)
    }

    pub fn disabled_renewal(self, domain: u64, renewer: u64, tx: &str) -> Self {
        let data = vec![felt(renewer)];
        self.event(RENEWAL, EventKind::DisabledRenewal, vec![felt(domain)], data, tx)
    }

    pub fn build(self) -> Block {
        Block {
            header: BlockHeader {
                timestamp: self.timestamp_ms,
            },
            events: self.events,
        }
    }
}
