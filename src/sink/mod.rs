//! Output contract with the destination store.
//!
//! Transforms never touch the store; they return [`SinkOperation`]s and the
//! host persists them according to the transform's [`SinkOptions`].

pub mod types;

pub use types::{Document, SinkOperation, SinkOptions, UpdateStep};
