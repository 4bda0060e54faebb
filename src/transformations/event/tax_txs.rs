//! Payments to the tax contract.

use std::sync::Arc;

use serde::Serialize;

use crate::decoding::selectors::{EventKind, SelectorTable};
use crate::decoding::uint256::{amount_to_f64, decode_amount};
use crate::sink::{SinkOperation, SinkOptions};
use crate::transformations::error::TransformationError;
use crate::transformations::output::{assemble, Outcome};
use crate::transformations::registry::TransformationRegistry;
use crate::transformations::traits::{BlockTransform, EventTrigger};
use crate::types::block::{Block, EventWithTransaction};
use crate::types::config::contract::Contracts;
use crate::types::felt::Felt;

const HANDLER: &str = "tax_txs";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxTxRecord {
    pub tx_hash: String,
    pub amount: f64,
    /// Token contract that emitted the transfer.
    pub token: Felt,
}

pub struct TaxTxsHandler {
    tax_contract: Felt,
    tokens: Vec<Felt>,
    decimals: u8,
    selectors: Arc<SelectorTable>,
}

impl TaxTxsHandler {
    pub fn new(contracts: &Contracts, decimals: u8, selectors: Arc<SelectorTable>) -> Self {
        Self {
            tax_contract: contracts.tax,
            tokens: contracts.tokens.clone(),
            decimals,
            selectors,
        }
    }

    pub fn outcomes(&self, block: &Block) -> Result<Vec<Outcome<TaxTxRecord>>, TransformationError> {
        block.events.iter().map(|entry| self.handle(entry)).collect()
    }

    fn handle(
        &self,
        entry: &EventWithTransaction,
    ) -> Result<Outcome<TaxTxRecord>, TransformationError> {
        let event = &entry.event;
        if self.selectors.kind_of(event.kind_key(HANDLER)?) != Some(EventKind::Transfer) {
            return Ok(Outcome::Skipped);
        }
        if *event.datum(1, HANDLER)? != self.tax_contract {
            return Ok(Outcome::Skipped);
        }

        let amount = decode_amount(
            event.datum(2, HANDLER)?,
            event.datum(3, HANDLER)?,
            self.decimals,
        )?;

        let record = TaxTxRecord {
            tx_hash: entry.transaction.hash.clone(),
            amount: amount_to_f64(&amount)?,
            token: event.from_address,
        };
        tracing::debug!(token = %record.token, amount = record.amount, "Decoded tax payment");

        Ok(Outcome::Produced(record))
    }
}

impl BlockTransform for TaxTxsHandler {
    fn name(&self) -> &'static str {
        HANDLER
    }

    fn sink(&self) -> SinkOptions {
        SinkOptions {
            collection_name: "tax_txs",
            entity_mode: false,
        }
    }

    fn triggers(&self) -> Vec<EventTrigger> {
        self.tokens
            .iter()
            .map(|token| EventTrigger::new(*token, EventKind::Transfer))
            .collect()
    }

    fn selectors(&self) -> &SelectorTable {
        &self.selectors
    }

    fn transform(&self, block: &Block) -> Result<Vec<SinkOperation>, TransformationError> {
        assemble(self.outcomes(block)?, |record| {
            SinkOperation::insert(&record).map_err(Into::into)
        })
    }
}

pub fn register_handlers(
    registry: &mut TransformationRegistry,
    contracts: &Contracts,
    decimals: u8,
    selectors: &Arc<SelectorTable>,
) {
    if contracts.tokens.is_empty() {
        tracing::warn!("No token contracts configured, tax_txs will match nothing");
    }
    registry.register(TaxTxsHandler::new(contracts, decimals, selectors.clone()));
}
