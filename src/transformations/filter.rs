//! Stream filter declarations.
//!
//! The host only delivers events matching a transform's filter, so the
//! selectors declared here must be exactly the ones the transform dispatches on.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::decoding::selectors::SelectorTable;
use crate::types::felt::Felt;

use super::traits::EventTrigger;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub header: HeaderFilter,
    pub events: Vec<EventFilter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderFilter {
    /// Deliver the header only alongside matching events.
    pub weak: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    pub from_address: Felt,
    pub keys: Vec<Felt>,
    pub include_transaction: bool,
    pub include_receipt: bool,
}

impl Filter {
    pub fn from_triggers(triggers: &[EventTrigger], selectors: &SelectorTable) -> Self {
        let events = triggers
            .iter()
            .map(|trigger| EventFilter {
                from_address: trigger.source,
                keys: vec![selectors.selector(trigger.kind)],
                include_transaction: true,
                include_receipt: false,
            })
            .collect();

        Self {
            header: HeaderFilter { weak: true },
            events,
        }
    }

    /// Distinct event-kind selectors this filter lets through.
    pub fn selectors(&self) -> BTreeSet<Felt> {
        self.events
            .iter()
            .filter_map(|e| e.keys.first().copied())
            .collect()
    }
}
