pub mod decoding;
pub mod sink;
pub mod transformations;
pub mod types;
