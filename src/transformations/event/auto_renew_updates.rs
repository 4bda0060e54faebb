//! Auto-renewal allowance tracking.
//!
//! The renewal contract keeps one allowance per (domain, renewer). Every
//! `UpdatedRenewal` or `DisabledRenewal` event overwrites that entity, so the
//! collection always holds the latest allowance.

use std::sync::Arc;

use alloy_primitives::U256;
use serde::Serialize;

use crate::decoding::domain::decode_root_domain;
use crate::decoding::selectors::{EventKind, SelectorTable};
use crate::decoding::uint256::Uint256Pair;
use crate::sink::{SinkOperation, SinkOptions};
use crate::transformations::error::TransformationError;
use crate::transformations::output::{assemble, Outcome};
use crate::transformations::registry::TransformationRegistry;
use crate::transformations::traits::{BlockTransform, EventTrigger};
use crate::types::block::{Block, EventWithTransaction};
use crate::types::config::contract::Contracts;
use crate::types::felt::Felt;

const HANDLER: &str = "auto_renew_updates";

/// Entity key of an allowance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenewalKey {
    pub domain: String,
    pub renewer: Felt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenewalUpdate {
    pub domain: String,
    pub renewer: Felt,
    /// Raw uint256 allowance in decimal, not scaled by token decimals.
    pub allowance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_hash: Option<String>,
    pub tx_hash: String,
}

impl RenewalUpdate {
    pub fn key(&self) -> RenewalKey {
        RenewalKey {
            domain: self.domain.clone(),
            renewer: self.renewer,
        }
    }
}

pub struct AutoRenewUpdatesHandler {
    renewal_contract: Felt,
    selectors: Arc<SelectorTable>,
}

impl AutoRenewUpdatesHandler {
    pub fn new(contracts: &Contracts, selectors: Arc<SelectorTable>) -> Self {
        Self {
            renewal_contract: contracts.renewal,
            selectors,
        }
    }

    pub fn outcomes(
        &self,
        block: &Block,
    ) -> Result<Vec<Outcome<RenewalUpdate>>, TransformationError> {
        block.events.iter().map(|entry| self.handle(entry)).collect()
    }

    fn handle(
        &self,
        entry: &EventWithTransaction,
    ) -> Result<Outcome<RenewalUpdate>, TransformationError> {
        let event = &entry.event;
        let key = event.kind_key(HANDLER)?;

        let update = match self.selectors.kind_of(key) {
            Some(EventKind::UpdatedRenewal) => {
                let allowance =
                    Uint256Pair::new(*event.datum(1, HANDLER)?, *event.datum(2, HANDLER)?)
                        .to_u256()?;
                // Stored without the leading zero byte.
                let meta_hash = event.datum(3, HANDLER)?.to_hex_unprefixed()[2..].to_string();

                RenewalUpdate {
                    domain: decode_root_domain(event.key(1, HANDLER)?)?,
                    renewer: *event.datum(0, HANDLER)?,
                    allowance: allowance.to_string(),
                    meta_hash: Some(meta_hash),
                    tx_hash: entry.transaction.hash.clone(),
                }
            }
            Some(EventKind::DisabledRenewal) => RenewalUpdate {
                domain: decode_root_domain(event.key(1, HANDLER)?)?,
                renewer: *event.datum(0, HANDLER)?,
                allowance: U256::ZERO.to_string(),
                meta_hash: None,
                tx_hash: entry.transaction.hash.clone(),
            },
            _ => {
                tracing::trace!(key = %key, "Skipping event without renewal semantics");
                return Ok(Outcome::Skipped);
            }
        };

        tracing::debug!(
            domain = %update.domain,
            renewer = %update.renewer,
            allowance = %update.allowance,
            "Decoded renewal update"
        );

        Ok(Outcome::Produced(update))
    }
}

impl BlockTransform for AutoRenewUpdatesHandler {
    fn name(&self) -> &'static str {
        HANDLER
    }

    fn sink(&self) -> SinkOptions {
        SinkOptions {
            collection_name: "auto_renew_updates",
            entity_mode: true,
        }
    }

    fn triggers(&self) -> Vec<EventTrigger> {
        vec![
            EventTrigger::new(self.renewal_contract, EventKind::UpdatedRenewal),
            EventTrigger::new(self.renewal_contract, EventKind::DisabledRenewal),
        ]
    }

    fn selectors(&self) -> &SelectorTable {
        &self.selectors
    }

    fn transform(&self, block: &Block) -> Result<Vec<SinkOperation>, TransformationError> {
        assemble(self.outcomes(block)?, |update| {
            SinkOperation::upsert(&update.key(), &update).map_err(Into::into)
        })
    }
}

pub fn register_handlers(
    registry: &mut TransformationRegistry,
    contracts: &Contracts,
    selectors: &Arc<SelectorTable>,
) {
    registry.register(AutoRenewUpdatesHandler::new(contracts, selectors.clone()));
}
