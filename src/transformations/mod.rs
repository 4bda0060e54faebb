//! Block transforms for naming-service events.
//!
//! This module provides:
//! - The [`BlockTransform`] trait every transform implements
//! - Stream filter declarations derived from each transform's triggers
//! - A registry for startup registration and lookup by name
//!
//! # Architecture
//!
//! ```text
//! Block (filtered events) ──► BlockTransform ──► Outcome per event ──► SinkOperations ──► host store
//!                                  │
//!                                  └─► SelectorTable (keys[0] ──► EventKind)
//! ```
//!
//! # Example Transform
//!
//! ```ignore
//! use sales_indexer_rs::decoding::{EventKind, SelectorTable};
//! use sales_indexer_rs::sink::{SinkOperation, SinkOptions};
//! use sales_indexer_rs::transformations::{BlockTransform, EventTrigger, TransformationError};
//! use sales_indexer_rs::types::block::Block;
//!
//! pub struct MintCounter {
//!     naming: Felt,
//!     selectors: Arc<SelectorTable>,
//! }
//!
//! impl BlockTransform for MintCounter {
//!     fn name(&self) -> &'static str { "mint_counter" }
//!
//!     fn sink(&self) -> SinkOptions {
//!         SinkOptions { collection_name: "mints", entity_mode: false }
//!     }
//!
//!     fn triggers(&self) -> Vec<EventTrigger> {
//!         vec![EventTrigger::new(self.naming, EventKind::DomainUpdate)]
//!     }
//!
//!     fn selectors(&self) -> &SelectorTable { &self.selectors }
//!
//!     fn transform(&self, block: &Block) -> Result<Vec<SinkOperation>, TransformationError> {
//!         let mut ops = Vec::new();
//!         for entry in &block.events {
//!             // Decode the event and build store operations
//!         }
//!         Ok(ops)
//!     }
//! }
//! ```

pub mod error;
pub mod event;
pub mod filter;
pub mod output;
pub mod registry;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-exports for convenience
pub use error::TransformationError;
pub use filter::{EventFilter, Filter, HeaderFilter};
pub use output::{assemble, Outcome};
pub use registry::{build_registry, TransformationRegistry};
pub use traits::{BlockTransform, EventTrigger};
