//! The [`ObservableSource`] trait.

use crate::error::PollResult;

/// External state that a [`Poller`](crate::Poller) mirrors into a store.
///
/// `sample` returns the current value of every observable the source knows
/// about, keyed by store key. Keys missing from a sample are treated as
/// vanished.
pub trait ObservableSource: Send {
    /// Payload type written into the store.
    type Value;

    /// Read the current state.
    fn sample(&mut self) -> PollResult<Vec<(String, Self::Value)>>;
}
