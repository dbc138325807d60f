//! Core notification types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What kind of mutation produced a [`Change`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    /// A value was written with `set`.
    Set,
    /// A value was deleted by `remove` or `clear`.
    Remove,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeAction::Set => write!(f, "set"),
            ChangeAction::Remove => write!(f, "remove"),
        }
    }
}

/// Payload delivered to every listener of a key.
///
/// `old` is `None` when the key had no value before the mutation; `new` is
/// `None` after a removal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change<V> {
    /// The key that changed.
    pub key: String,
    /// The mutation that caused the change.
    pub action: ChangeAction,
    /// Value before the mutation.
    pub old: Option<V>,
    /// Value after the mutation.
    pub new: Option<V>,
}

impl<V: PartialEq> Change<V> {
    /// Returns `true` if old and new hold the same value.
    ///
    /// Only a same-value `set` produces such a change.
    pub fn is_unchanged(&self) -> bool {
        self.old == self.new
    }
}

/// Token returned when a listener is registered.
///
/// Pass it to [`Store::unsubscribe`](crate::Store::unsubscribe) to remove
/// the listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl ListenerId {
    /// Raw sequence number of this registration.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Counters describing what a store has done since construction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Current number of entries.
    pub entries: usize,
    /// Current number of registered listeners across all keys.
    pub listeners: usize,
    /// Successful `set` calls.
    pub sets: u64,
    /// Entries removed by `remove` or `clear`.
    pub removes: u64,
    /// Listener invocations, successful or not.
    pub notifications: u64,
    /// Listener invocations that returned an error or panicked.
    pub listener_failures: u64,
}
