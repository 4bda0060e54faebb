//! Core traits for block transforms.
//!
//! A transform receives one block at a time from the streaming host and returns
//! the store operations for it. Transforms are pure: the same block always
//! yields the same operations, so redelivered blocks are absorbed by the
//! store's upsert/insert semantics.

use crate::decoding::selectors::{EventKind, SelectorTable};
use crate::sink::{SinkOperation, SinkOptions};
use crate::types::block::Block;
use crate::types::felt::Felt;

use super::error::TransformationError;
use super::filter::Filter;

/// Core trait that all block transforms must implement.
pub trait BlockTransform: Send + Sync + 'static {
    /// Unique name for this transform (used in logging and registry lookup).
    fn name(&self) -> &'static str;

    /// Version of this transform. Bump when the output changes shape.
    fn version(&self) -> u32 {
        1
    }

    /// Computed identity key: `"{name}_v{version}"`.
    fn handler_key(&self) -> String {
        format!("{}_v{}", self.name(), self.version())
    }

    /// Where and how the host persists this transform's output.
    fn sink(&self) -> SinkOptions;

    /// (contract, event kind) pairs this transform consumes.
    fn triggers(&self) -> Vec<EventTrigger>;

    /// Selector table shared with the stream filter.
    fn selectors(&self) -> &SelectorTable;

    /// Stream filter the host must install for this transform.
    fn filter(&self) -> Filter {
        Filter::from_triggers(&self.triggers(), self.selectors())
    }

    /// Turn one block into store operations, in emission order.
    fn transform(&self, block: &Block) -> Result<Vec<SinkOperation>, TransformationError>;
}

/// Trigger for event-based transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTrigger {
    /// Emitting contract address.
    pub source: Felt,
    pub kind: EventKind,
}

impl EventTrigger {
    pub fn new(source: Felt, kind: EventKind) -> Self {
        Self { source, kind }
    }
}
