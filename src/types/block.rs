//! Block payload delivered by the streaming host.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::transformations::error::TransformationError;
use crate::types::felt::Felt;

/// One block: its header and the pre-filtered events in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    #[serde(default)]
    pub events: Vec<EventWithTransaction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block timestamp in epoch milliseconds.
    pub timestamp: u64,
}

impl BlockHeader {
    pub fn timestamp_secs(&self) -> i64 {
        (self.timestamp / 1000) as i64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWithTransaction {
    pub event: RawEvent,
    pub transaction: Transaction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub from_address: Felt,
    #[serde(default)]
    pub keys: Vec<Felt>,
    #[serde(default)]
    pub data: Vec<Felt>,
}

impl RawEvent {
    /// The event-kind identifier (`keys[0]`).
    pub fn kind_key(&self, handler: &'static str) -> Result<&Felt, TransformationError> {
        self.key(0, handler)
    }

    /// Get a key by index, returning an error if missing.
    pub fn key(&self, index: usize, handler: &'static str) -> Result<&Felt, TransformationError> {
        self.keys
            .get(index)
            .ok_or(TransformationError::MissingKey { handler, index })
    }

    /// Get a data field by index, returning an error if missing.
    pub fn datum(&self, index: usize, handler: &'static str) -> Result<&Felt, TransformationError> {
        self.data
            .get(index)
            .ok_or(TransformationError::MissingData { handler, index })
    }

    /// Get a contiguous run of data fields.
    pub fn data_range(
        &self,
        range: Range<usize>,
        handler: &'static str,
    ) -> Result<&[Felt], TransformationError> {
        let last = range.end.saturating_sub(1).max(range.start);
        self.data
            .get(range)
            .ok_or(TransformationError::MissingData {
                handler,
                index: last,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_block() {
        let json = r#"{
            "header": { "timestamp": 1700000000000 },
            "events": [{
                "event": {
                    "fromAddress": "0x49d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7",
                    "keys": ["0x99cd8bde557814842a3121e8ddfd433a539b8c9f14bf31ebf108d12e6196e9"],
                    "data": ["0x1", "0x2", "0xde0b6b3a7640000", "0x0"]
                },
                "transaction": { "hash": "0xabc" }
            }]
        }"#;

        let block: Block = serde_json::from_str(json).unwrap();
        assert_eq!(block.header.timestamp_secs(), 1_700_000_000);
        assert_eq!(block.events.len(), 1);

        let entry = &block.events[0];
        assert_eq!(entry.transaction.hash, "0xabc");
        assert_eq!(entry.event.data.len(), 4);
        assert_eq!(entry.event.datum(1, "test").unwrap(), &Felt::from(2u64));
    }

    #[test]
    fn test_out_of_field_felt_rejected() {
        let json = r#"{
            "header": { "timestamp": 0 },
            "events": [{
                "event": {
                    "fromAddress": "0x800000000000011000000000000000000000000000000000000000000000001",
                    "keys": [],
                    "data": []
                },
                "transaction": { "hash": "0x1" }
            }]
        }"#;
        assert!(serde_json::from_str::<Block>(json).is_err());
    }

    #[test]
    fn test_missing_fields_are_errors() {
        let event = RawEvent {
            from_address: Felt::ZERO,
            keys: vec![],
            data: vec![Felt::from(1u64)],
        };

        assert!(matches!(
            event.kind_key("test"),
            Err(TransformationError::MissingKey { index: 0, .. })
        ));
        assert!(matches!(
            event.datum(3, "test"),
            Err(TransformationError::MissingData { index: 3, .. })
        ));
        assert!(matches!(
            event.data_range(0..4, "test"),
            Err(TransformationError::MissingData { index: 3, .. })
        ));
        assert_eq!(event.data_range(1..1, "test").unwrap().len(), 0);
    }
}
