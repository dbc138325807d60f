//! Periodic state poller for watchkv stores.
//!
//! A [`Poller`] samples an [`ObservableSource`] on a fixed interval, diffs
//! the sample against what it saw last time, and writes every changed value
//! into a [`Store`](watchkv_store::Store). Each poll that changed anything
//! is also broadcast as a [`PollUpdate`] to subscribers of the poller.

pub mod config;
pub mod error;
pub mod poller;
pub mod source;

pub use config::PollerConfig;
pub use error::{PollError, PollResult};
pub use poller::{PollUpdate, Poller, UpdateStream};
pub use source::ObservableSource;
