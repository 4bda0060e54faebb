//! Output assembly.
//!
//! Handlers report one [`Outcome`] per event. Only productions reach the
//! store; absorbed and skipped events leave no trace in the output.

use crate::sink::SinkOperation;

use super::error::TransformationError;

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The event only updated in-block state.
    Absorbed,
    /// The event is not relevant to this transform.
    Skipped,
    /// The event completed a record.
    Produced(T),
}

impl<T> Outcome<T> {
    pub fn into_produced(self) -> Option<T> {
        match self {
            Outcome::Produced(record) => Some(record),
            Outcome::Absorbed | Outcome::Skipped => None,
        }
    }

    pub fn is_produced(&self) -> bool {
        matches!(self, Outcome::Produced(_))
    }
}

/// Keep the produced records, in order, as store operations.
pub fn assemble<T, I, F>(
    outcomes: I,
    mut to_operation: F,
) -> Result<Vec<SinkOperation>, TransformationError>
where
    I: IntoIterator<Item = Outcome<T>>,
    F: FnMut(T) -> Result<SinkOperation, TransformationError>,
{
    outcomes
        .into_iter()
        .filter_map(Outcome::into_produced)
        .map(|record| to_operation(record))
        .collect()
}
