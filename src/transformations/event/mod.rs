//! Event-driven block transforms.
//!
//! Add new transform modules here and register them in `register_handlers`.

pub mod auto_renew_updates;
pub mod sales;
pub mod tax_txs;

use std::sync::Arc;

use crate::decoding::selectors::SelectorTable;
use crate::types::config::indexer::IndexerConfig;

use super::registry::TransformationRegistry;

/// Register all event transforms with the registry.
pub fn register_handlers(
    registry: &mut TransformationRegistry,
    config: &IndexerConfig,
    selectors: &Arc<SelectorTable>,
) {
    let contracts = &config.contracts;

    sales::register_handlers(registry, contracts, config.decimals, selectors);
    auto_renew_updates::register_handlers(registry, contracts, selectors);
    tax_txs::register_handlers(registry, contracts, config.decimals, selectors);
}
