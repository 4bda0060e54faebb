pub mod contract;
pub mod indexer;
