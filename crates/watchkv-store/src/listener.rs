//! Listener storage and isolated dispatch.
//!
//! Listeners are kept per key in registration order. Dispatch takes a
//! snapshot of a key's listeners first, so a listener that registers or
//! removes listeners while running does not disturb the current round.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::ListenerError;
use crate::types::{Change, ListenerId};

/// A registered callback.
pub(crate) type ListenerFn<V> =
    Arc<dyn Fn(&Change<V>) -> Result<(), ListenerError> + Send + Sync>;

/// Per-key ordered listener lists.
pub(crate) struct ListenerSet<V> {
    by_key: HashMap<String, Vec<(ListenerId, ListenerFn<V>)>>,
}

impl<V> ListenerSet<V> {
    pub(crate) fn new() -> Self {
        Self {
            by_key: HashMap::new(),
        }
    }

    pub(crate) fn add(&mut self, key: &str, id: ListenerId, listener: ListenerFn<V>) {
        self.by_key
            .entry(key.to_string())
            .or_default()
            .push((id, listener));
    }

    /// Remove one registration. Returns the key it was registered under.
    pub(crate) fn remove(&mut self, id: ListenerId) -> Option<String> {
        let key = self
            .by_key
            .iter()
            .find(|(_, list)| list.iter().any(|(lid, _)| *lid == id))
            .map(|(key, _)| key.clone())?;

        if let Some(list) = self.by_key.get_mut(&key) {
            list.retain(|(lid, _)| *lid != id);
            if list.is_empty() {
                self.by_key.remove(&key);
            }
        }
        Some(key)
    }

    /// Listeners for `key`, in registration order.
    pub(crate) fn snapshot(&self, key: &str) -> Vec<ListenerFn<V>> {
        self.by_key
            .get(key)
            .map(|list| list.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, key: &str) -> usize {
        self.by_key.get(key).map_or(0, Vec::len)
    }

    pub(crate) fn total(&self) -> usize {
        self.by_key.values().map(Vec::len).sum()
    }
}

/// Invoke one listener, converting an error return or a panic into a
/// failure message.
pub(crate) fn invoke<V>(listener: &ListenerFn<V>, change: &Change<V>) -> Result<(), String> {
    match catch_unwind(AssertUnwindSafe(|| (**listener)(change))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(format!("listener panicked: {}", panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChangeAction;

    fn noop() -> ListenerFn<i32> {
        Arc::new(|_: &Change<i32>| -> Result<(), ListenerError> { Ok(()) })
    }

    fn change() -> Change<i32> {
        Change {
            key: "k".to_string(),
            action: ChangeAction::Set,
            old: None,
            new: Some(1),
        }
    }

    #[test]
    fn add_and_count() {
        let mut set = ListenerSet::new();
        set.add("a", ListenerId(1), noop());
        set.add("a", ListenerId(2), noop());
        set.add("b", ListenerId(3), noop());
        assert_eq!(set.count("a"), 2);
        assert_eq!(set.count("b"), 1);
        assert_eq!(set.count("c"), 0);
        assert_eq!(set.total(), 3);
    }

    #[test]
    fn remove_prunes_empty_lists() {
        let mut set = ListenerSet::new();
        set.add("a", ListenerId(1), noop());
        assert_eq!(set.remove(ListenerId(1)), Some("a".to_string()));
        assert_eq!(set.remove(ListenerId(1)), None);
        assert_eq!(set.total(), 0);
        assert!(set.snapshot("a").is_empty());
    }

    #[test]
    fn invoke_reports_error_return() {
        let failing: ListenerFn<i32> =
            Arc::new(|_: &Change<i32>| -> Result<(), ListenerError> { Err(ListenerError::new("boom")) });
        let err = invoke(&failing, &change()).unwrap_err();
        assert_eq!(err, "listener failed: boom");
    }

    #[test]
    fn invoke_catches_panics() {
        let panicking: ListenerFn<i32> =
            Arc::new(|_: &Change<i32>| -> Result<(), ListenerError> { panic!("kaboom") });
        let err = invoke(&panicking, &change()).unwrap_err();
        assert!(err.contains("kaboom"), "unexpected message: {err}");

        let formatted: ListenerFn<i32> =
            Arc::new(|c: &Change<i32>| -> Result<(), ListenerError> { panic!("bad key {}", c.key) });
        let err = invoke(&formatted, &change()).unwrap_err();
        assert!(err.contains("bad key k"), "unexpected message: {err}");
    }
}
