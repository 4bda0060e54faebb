pub mod block;
pub mod config;
pub mod felt;
