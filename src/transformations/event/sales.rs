//! Domain sale reconstruction.
//!
//! A purchase is never a single event. Within one block the payment token
//! emits a `Transfer` to the naming contract, the naming contract may emit
//! `SaleMetadata`, the referral contract may emit `on_commission`, the renewal
//! contract may emit `domain_renewed`, and finally the naming contract emits
//! `starknet_id_update` with the domain and its new expiry.
//!
//! [`SaleContext`] accumulates the first four in emission order and the
//! domain update closes the sale. The context is folded through the block by
//! value and starts empty again after every closed sale, so a block can hold
//! any number of consecutive purchases.
//!
//! The context is shared by every sale in the block: if the events of two
//! purchases interleave, the later `Transfer` replaces the earlier one and
//! referral/auto-renew flags apply to whichever sale closes first.

use std::sync::Arc;

use serde::Serialize;

use crate::decoding::domain::decode_domain;
use crate::decoding::selectors::{EventKind, SelectorTable};
use crate::decoding::uint256::{amount_to_f64, decode_amount};
use crate::sink::{SinkOperation, SinkOptions};
use crate::transformations::error::TransformationError;
use crate::transformations::output::{assemble, Outcome};
use crate::transformations::registry::TransformationRegistry;
use crate::transformations::traits::{BlockTransform, EventTrigger};
use crate::types::block::{Block, EventWithTransaction, RawEvent};
use crate::types::config::contract::Contracts;
use crate::types::felt::{serialize_as_number, Felt};

const HANDLER: &str = "sales";

/// Payment seen for a sale that has not closed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransfer {
    pub payer: Felt,
    /// Fixed-point decimal amount.
    pub amount: String,
}

/// Block-scoped state of the sale being assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleContext {
    pending_transfer: Option<PendingTransfer>,
    auto_renewed: bool,
    sponsor_addr: Option<Felt>,
    sponsor_comm: Option<Felt>,
    meta_hash: Option<Felt>,
}

impl SaleContext {
    /// No payment is waiting for its domain update.
    pub fn is_idle(&self) -> bool {
        self.pending_transfer.is_none()
    }

    pub fn pending_transfer(&self) -> Option<&PendingTransfer> {
        self.pending_transfer.as_ref()
    }
}

/// One row of the `sales` collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRecord {
    pub tx_hash: String,
    /// Hex without `0x`; `"0"` when the sale carried no metadata.
    pub meta_hash: String,
    pub domain: String,
    pub price: f64,
    pub payer: Felt,
    /// Block time, seconds.
    pub timestamp: i64,
    /// New domain expiry, seconds.
    pub expiry: u64,
    pub auto: bool,
    #[serde(serialize_with = "serialize_as_number")]
    pub sponsor: Felt,
    #[serde(serialize_with = "serialize_as_number")]
    pub sponsor_comm: Felt,
}

pub struct SalesHandler {
    naming_contract: Felt,
    payment_token: Felt,
    referral_contract: Felt,
    renewal_contract: Felt,
    decimals: u8,
    selectors: Arc<SelectorTable>,
}

impl SalesHandler {
    pub fn new(contracts: &Contracts, decimals: u8, selectors: Arc<SelectorTable>) -> Self {
        Self {
            naming_contract: contracts.naming,
            payment_token: contracts.eth,
            referral_contract: contracts.referral,
            renewal_contract: contracts.renewal,
            decimals,
            selectors,
        }
    }

    /// Handle every event of the block in emission order.
    pub fn outcomes(&self, block: &Block) -> Result<Vec<Outcome<SaleRecord>>, TransformationError> {
        let timestamp = block.header.timestamp_secs();

        let (ctx, outcomes) = block.events.iter().try_fold(
            (SaleContext::default(), Vec::with_capacity(block.events.len())),
            |(ctx, mut outcomes), entry| {
                let (ctx, outcome) = self.step(ctx, entry, timestamp)?;
                outcomes.push(outcome);
                Ok::<_, TransformationError>((ctx, outcomes))
            },
        )?;

        if let Some(pending) = ctx.pending_transfer() {
            tracing::debug!(
                payer = %pending.payer,
                amount = %pending.amount,
                "Block ended with a payment that no domain update closed"
            );
        }

        Ok(outcomes)
    }

    /// Completed sales of the block, in emission order.
    pub fn sales_in_block(&self, block: &Block) -> Result<Vec<SaleRecord>, TransformationError> {
        Ok(self
            .outcomes(block)?
            .into_iter()
            .filter_map(Outcome::into_produced)
            .collect())
    }

    /// Apply one event to the context.
    pub fn step(
        &self,
        ctx: SaleContext,
        entry: &EventWithTransaction,
        timestamp: i64,
    ) -> Result<(SaleContext, Outcome<SaleRecord>), TransformationError> {
        let event = &entry.event;
        let key = event.kind_key(HANDLER)?;

        let Some(kind) = self.selectors.kind_of(key) else {
            tracing::trace!(key = %key, "Skipping unknown event kind");
            return Ok((ctx, Outcome::Skipped));
        };

        match kind {
            EventKind::Transfer => self.on_transfer(ctx, event),
            EventKind::SaleMetadata => on_sale_metadata(ctx, event),
            EventKind::Referral => on_referral(ctx, event),
            EventKind::AutoRenew => Ok((
                SaleContext {
                    auto_renewed: true,
                    ..ctx
                },
                Outcome::Absorbed,
            )),
            EventKind::DomainUpdate => self.on_domain_update(ctx, entry, timestamp),
            EventKind::UpdatedRenewal | EventKind::DisabledRenewal => {
                Ok((ctx, Outcome::Skipped))
            }
        }
    }

    fn on_transfer(
        &self,
        mut ctx: SaleContext,
        event: &RawEvent,
    ) -> Result<(SaleContext, Outcome<SaleRecord>), TransformationError> {
        let to = event.datum(1, HANDLER)?;
        if *to != self.naming_contract {
            return Ok((ctx, Outcome::Skipped));
        }

        let payer = *event.datum(0, HANDLER)?;
        let amount = decode_amount(
            event.datum(2, HANDLER)?,
            event.datum(3, HANDLER)?,
            self.decimals,
        )?;

        ctx.pending_transfer = Some(PendingTransfer { payer, amount });
        Ok((ctx, Outcome::Absorbed))
    }

    fn on_domain_update(
        &self,
        mut ctx: SaleContext,
        entry: &EventWithTransaction,
        timestamp: i64,
    ) -> Result<(SaleContext, Outcome<SaleRecord>), TransformationError> {
        let Some(transfer) = ctx.pending_transfer.take() else {
            return Ok((ctx, Outcome::Skipped));
        };
        let event = &entry.event;

        // [label_count, labels.., owner, expiry]
        let count_felt = event.datum(0, HANDLER)?;
        let label_count = count_felt
            .to_u64()
            .and_then(|n| usize::try_from(n).ok())
            .filter(|n| *n < usize::MAX - 2)
            .ok_or_else(|| {
                TransformationError::handler(
                    HANDLER,
                    format!("label count {} is out of range", count_felt),
                )
            })?;

        let labels = event.data_range(1..label_count + 1, HANDLER)?;
        let expiry = event.datum(label_count + 2, HANDLER)?;
        let expiry = expiry.to_u64().ok_or_else(|| {
            TransformationError::TypeConversion(format!("expiry {} does not fit in u64", expiry))
        })?;

        let record = SaleRecord {
            tx_hash: entry.transaction.hash.clone(),
            meta_hash: ctx
                .meta_hash
                .map(|hash| hash.to_hex_unprefixed())
                .unwrap_or_else(|| "0".to_string()),
            domain: decode_domain(labels)?,
            price: amount_to_f64(&transfer.amount)?,
            payer: transfer.payer,
            timestamp,
            expiry,
            auto: ctx.auto_renewed,
            sponsor: ctx.sponsor_addr.unwrap_or_default(),
            sponsor_comm: ctx.sponsor_comm.unwrap_or_default(),
        };

        tracing::debug!(
            domain = %record.domain,
            payer = %record.payer,
            price = record.price,
            auto = record.auto,
            tx_hash = %record.tx_hash,
            "Decoded sale"
        );

        Ok((SaleContext::default(), Outcome::Produced(record)))
    }
}

fn on_sale_metadata(
    mut ctx: SaleContext,
    event: &RawEvent,
) -> Result<(SaleContext, Outcome<SaleRecord>), TransformationError> {
    ctx.meta_hash = Some(*event.datum(1, HANDLER)?);
    Ok((ctx, Outcome::Absorbed))
}

/// A commission means the purchase went through the auto-renewal path.
fn on_referral(
    mut ctx: SaleContext,
    event: &RawEvent,
) -> Result<(SaleContext, Outcome<SaleRecord>), TransformationError> {
    ctx.sponsor_comm = Some(*event.datum(1, HANDLER)?);
    ctx.sponsor_addr = Some(*event.datum(3, HANDLER)?);
    ctx.auto_renewed = true;
    Ok((ctx, Outcome::Absorbed))
}

impl BlockTransform for SalesHandler {
    fn name(&self) -> &'static str {
        HANDLER
    }

    fn sink(&self) -> SinkOptions {
        SinkOptions {
            collection_name: "sales",
            entity_mode: false,
        }
    }

    fn triggers(&self) -> Vec<EventTrigger> {
        vec![
            EventTrigger::new(self.naming_contract, EventKind::DomainUpdate),
            EventTrigger::new(self.naming_contract, EventKind::SaleMetadata),
            EventTrigger::new(self.payment_token, EventKind::Transfer),
            EventTrigger::new(self.referral_contract, EventKind::Referral),
            EventTrigger::new(self.renewal_contract, EventKind::AutoRenew),
        ]
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
    registry.register(SalesHandler::new(contracts, decimals, selectors.clone()));
}
