//! Transform registration.
//!
//! The registry maps transform names to their implementations. It is built
//! once at startup from the resolved configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::decoding::selectors::SelectorTable;
use crate::types::config::indexer::IndexerConfig;

use super::traits::BlockTransform;

/// Registry of all block transforms, built at startup.
pub struct TransformationRegistry {
    /// Transforms indexed by name for CLI/host lookup
    transforms: BTreeMap<&'static str, Arc<dyn BlockTransform>>,
    /// All transforms in registration order
    all_transforms: Vec<Arc<dyn BlockTransform>>,
}

impl TransformationRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            transforms: BTreeMap::new(),
            all_transforms: Vec::new(),
        }
    }

    /// Register a transform.
    ///
    /// A later registration under the same name replaces the earlier one.
    pub fn register<T: BlockTransform>(&mut self, transform: T) {
        let transform: Arc<dyn BlockTransform> = Arc::new(transform);
        let name = transform.name();

        if self.transforms.insert(name, transform.clone()).is_some() {
            tracing::warn!("Transform '{}' registered twice, keeping the latest", name);
            self.all_transforms.retain(|t| t.name() != name);
        }
        self.all_transforms.push(transform);
    }

    /// Get a transform by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn BlockTransform>> {
        self.transforms.get(name).cloned()
    }

    /// Get all transforms, in registration order.
    pub fn all_transforms(&self) -> &[Arc<dyn BlockTransform>] {
        &self.all_transforms
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.transforms.keys().copied().collect()
    }

    /// Check if any transforms are registered.
    pub fn is_empty(&self) -> bool {
        self.all_transforms.is_empty()
    }

    /// Get count of registered transforms.
    pub fn handler_count(&self) -> usize {
        self.all_transforms.len()
    }
}

impl Default for TransformationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the transformation registry with all transforms.
///
/// Every transform shares one selector table.
pub fn build_registry(config: &IndexerConfig) -> TransformationRegistry {
    let mut registry = TransformationRegistry::new();
    let selectors = Arc::new(SelectorTable::new());

    super::event::register_handlers(&mut registry, config, &selectors);

    let filter_count: usize = registry
        .all_transforms()
        .iter()
        .map(|t| t.triggers().len())
        .sum();

    tracing::info!(
        "Built transformation registry with {} transforms ({} event filters)",
        registry.handler_count(),
        filter_count
    );

    registry
}
