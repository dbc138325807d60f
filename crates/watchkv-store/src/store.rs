//! The observable [`Store`].
//!
//! All state sits behind one reentrant lock. A mutation takes the lock,
//! commits its change to the entry map, releases the interior borrow, then
//! dispatches to listeners while still holding the lock. Two mutations can
//! therefore never interleave their notifications, while a listener running
//! on the mutating thread may still read from (or write to) the same store.
//! A mutation made from inside a listener is committed at once, but its
//! notification is queued behind the round in progress.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{ListenerError, StoreResult};
use crate::keys::validate_key;
use crate::listener::{invoke, ListenerFn, ListenerSet};
use crate::types::{Change, ChangeAction, ListenerId, StoreStats};

type Pending<V> = (Vec<ListenerFn<V>>, Change<V>);

struct State<V> {
    entries: HashMap<String, V>,
    listeners: ListenerSet<V>,
    pending: VecDeque<Pending<V>>,
    dispatching: bool,
}

#[derive(Default)]
struct Counters {
    sets: AtomicU64,
    removes: AtomicU64,
    notifications: AtomicU64,
    listener_failures: AtomicU64,
}

/// In-memory key-value store with synchronous per-key change listeners.
///
/// Values are cloned out on read. Equality (`V: PartialEq`) decides whether
/// a `set` actually replaces the stored value; to compare by identity, store
/// `Arc<T>` wrapped in a newtype whose `PartialEq` uses `Arc::ptr_eq`.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use watchkv_store::{ChangeAction, Store};
///
/// let store = Store::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// store
///     .on_change("score", move |c| {
///         sink.lock().unwrap().push((c.action, c.old.clone(), c.new.clone()))
///     })
///     .unwrap();
///
/// store.set("score", 10).unwrap();
/// store.set("score", 20).unwrap();
/// store.remove("score").unwrap();
///
/// assert_eq!(store.get("score").unwrap(), None);
/// assert_eq!(
///     *seen.lock().unwrap(),
///     vec![
///         (ChangeAction::Set, None, Some(10)),
///         (ChangeAction::Set, Some(10), Some(20)),
///         (ChangeAction::Remove, Some(20), None),
///     ]
/// );
/// ```
pub struct Store<V> {
    config: StoreConfig,
    state: ReentrantMutex<RefCell<State<V>>>,
    next_listener: AtomicU64,
    counters: Counters,
}

impl<V> Store<V>
where
    V: Clone + PartialEq,
{
    /// Create an empty store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store with the given configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            state: ReentrantMutex::new(RefCell::new(State {
                entries: HashMap::new(),
                listeners: ListenerSet::new(),
                pending: VecDeque::new(),
                dispatching: false,
            })),
            next_listener: AtomicU64::new(1),
            counters: Counters::default(),
        }
    }

    /// The configuration this store was built with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Store `value` under `key` and notify the key's listeners.
    ///
    /// The entry is only rewritten when the value differs from the current
    /// one. Listeners still receive a same-value `set` as `(v, v)` unless
    /// [`StoreConfig::notify_unchanged`] is off.
    ///
    /// Called from inside a listener, the new value is visible immediately
    /// but the notification waits until every listener of the current change
    /// has run. Listeners therefore always see a key's changes in the order
    /// they were committed.
    pub fn set(&self, key: &str, value: V) -> StoreResult<()> {
        validate_key(key)?;

        let guard = self.state.lock();
        let (old, listeners) = {
            let mut state = guard.borrow_mut();
            let old = state.entries.get(key).cloned();
            if old.as_ref() != Some(&value) {
                state.entries.insert(key.to_string(), value.clone());
            }
            (old, state.listeners.snapshot(key))
        };
        self.counters.sets.fetch_add(1, Ordering::Relaxed);

        let unchanged = old.as_ref() == Some(&value);
        debug!(store = %self.config.name, key, unchanged, "entry set");
        if unchanged && !self.config.notify_unchanged {
            return Ok(());
        }

        let change = Change {
            key: key.to_string(),
            action: ChangeAction::Set,
            old,
            new: Some(value),
        };
        self.deliver(&guard, [(listeners, change)]);
        drop(guard);
        Ok(())
    }

    /// Current value for `key`, or `None` if the key has no value.
    pub fn get(&self, key: &str) -> StoreResult<Option<V>> {
        validate_key(key)?;
        let guard = self.state.lock();
        let state = guard.borrow();
        Ok(state.entries.get(key).cloned())
    }

    /// Returns `true` if `key` currently has a value.
    pub fn contains(&self, key: &str) -> StoreResult<bool> {
        validate_key(key)?;
        let guard = self.state.lock();
        let state = guard.borrow();
        Ok(state.entries.contains_key(key))
    }

    /// Delete `key` and notify its listeners.
    ///
    /// Returns `Ok(true)` if the key existed. Removing a missing key is a
    /// no-op: nothing is notified.
    pub fn remove(&self, key: &str) -> StoreResult<bool> {
        validate_key(key)?;

        let guard = self.state.lock();
        let removed = {
            let mut state = guard.borrow_mut();
            state
                .entries
                .remove(key)
                .map(|old| (old, state.listeners.snapshot(key)))
        };
        let Some((old, listeners)) = removed else {
            return Ok(false);
        };
        self.counters.removes.fetch_add(1, Ordering::Relaxed);
        debug!(store = %self.config.name, key, "entry removed");

        let change = Change {
            key: key.to_string(),
            action: ChangeAction::Remove,
            old: Some(old),
            new: None,
        };
        self.deliver(&guard, [(listeners, change)]);
        drop(guard);
        Ok(true)
    }

    /// Remove every entry, notifying each removed key individually.
    ///
    /// All entries are gone before the first notification is sent. Returns
    /// the number of entries removed.
    pub fn clear(&self) -> usize {
        let guard = self.state.lock();
        let removed: Vec<(String, V, Vec<ListenerFn<V>>)> = {
            let mut state = guard.borrow_mut();
            let drained: Vec<(String, V)> = state.entries.drain().collect();
            drained
                .into_iter()
                .map(|(key, old)| {
                    let listeners = state.listeners.snapshot(&key);
                    (key, old, listeners)
                })
                .collect()
        };
        let count = removed.len();
        self.counters
            .removes
            .fetch_add(count as u64, Ordering::Relaxed);
        debug!(store = %self.config.name, count, "store cleared");

        let batch = removed.into_iter().map(|(key, old, listeners)| {
            let change = Change {
                key,
                action: ChangeAction::Remove,
                old: Some(old),
                new: None,
            };
            (listeners, change)
        });
        self.deliver(&guard, batch);
        drop(guard);
        count
    }

    /// Register a listener for `key`.
    ///
    /// Listeners run on the mutating thread, in registration order, after
    /// the mutation is committed. A panicking listener is isolated: it is
    /// logged and counted and the remaining listeners still run.
    ///
    /// A listener may call back into the store. Changes it makes are
    /// delivered after the current change reaches all of its listeners,
    /// never in the middle of that round.
    pub fn on_change<F>(&self, key: &str, listener: F) -> StoreResult<ListenerId>
    where
        F: Fn(&Change<V>) + Send + Sync + 'static,
    {
        let wrapped: ListenerFn<V> = Arc::new(move |change: &Change<V>| -> Result<(), ListenerError> {
            listener(change);
            Ok(())
        });
        self.register(key, wrapped)
    }

    /// Register a fallible listener for `key`.
    ///
    /// An `Err` return is treated like a panic in [`on_change`](Self::on_change):
    /// logged, counted, and never propagated to the mutator.
    pub fn try_on_change<F>(&self, key: &str, listener: F) -> StoreResult<ListenerId>
    where
        F: Fn(&Change<V>) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.register(key, Arc::new(listener))
    }

    /// Remove a listener. Returns `true` if it was registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let guard = self.state.lock();
        let removed = guard.borrow_mut().listeners.remove(id);
        match removed {
            Some(key) => {
                debug!(store = %self.config.name, key = %key, listener = %id, "listener removed");
                true
            }
            None => false,
        }
    }

    /// Number of listeners registered for `key`.
    pub fn listener_count(&self, key: &str) -> usize {
        let guard = self.state.lock();
        let state = guard.borrow();
        state.listeners.count(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        let guard = self.state.lock();
        let state = guard.borrow();
        state.entries.len()
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All keys with a value, sorted.
    pub fn keys(&self) -> Vec<String> {
        let guard = self.state.lock();
        let state = guard.borrow();
        let mut keys: Vec<String> = state.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Snapshot of the store's counters.
    pub fn stats(&self) -> StoreStats {
        let guard = self.state.lock();
        let state = guard.borrow();
        StoreStats {
            entries: state.entries.len(),
            listeners: state.listeners.total(),
            sets: self.counters.sets.load(Ordering::Relaxed),
            removes: self.counters.removes.load(Ordering::Relaxed),
            notifications: self.counters.notifications.load(Ordering::Relaxed),
            listener_failures: self.counters.listener_failures.load(Ordering::Relaxed),
        }
    }

    fn register(&self, key: &str, listener: ListenerFn<V>) -> StoreResult<ListenerId> {
        validate_key(key)?;
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        let guard = self.state.lock();
        guard.borrow_mut().listeners.add(key, id, listener);
        debug!(store = %self.config.name, key, listener = %id, "listener registered");
        Ok(id)
    }

    /// Queue `batch` and, unless a round is already running further up this
    /// thread's stack, drain the queue. Must be called with the state lock
    /// held and no interior borrow outstanding.
    fn deliver<I>(&self, state: &RefCell<State<V>>, batch: I)
    where
        I: IntoIterator<Item = Pending<V>>,
    {
        {
            let mut state = state.borrow_mut();
            state.pending.extend(batch);
            if state.dispatching {
                return;
            }
            state.dispatching = true;
        }
        loop {
            let next = state.borrow_mut().pending.pop_front();
            let Some((listeners, change)) = next else {
                break;
            };
            self.dispatch(&listeners, &change);
        }
        state.borrow_mut().dispatching = false;
    }

    /// Deliver `change` to each listener in order.
    fn dispatch(&self, listeners: &[ListenerFn<V>], change: &Change<V>) {
        for listener in listeners {
            self.counters.notifications.fetch_add(1, Ordering::Relaxed);
            if let Err(reason) = invoke(listener, change) {
                self.counters
                    .listener_failures
                    .fetch_add(1, Ordering::Relaxed);
                warn!(
                    store = %self.config.name,
                    key = %change.key,
                    action = %change.action,
                    %reason,
                    "listener failed; continuing dispatch"
                );
            }
        }
    }
}

impl<V> Default for Store<V>
where
    V: Clone + PartialEq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for Store<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (entries, listeners) = {
            let guard = self.state.lock();
            let state = guard.borrow();
            (state.entries.len(), state.listeners.total())
        };
        f.debug_struct("Store")
            .field("name", &self.config.name)
            .field("entries", &entries)
            .field("listeners", &listeners)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread;

    use proptest::prelude::*;

    use crate::error::StoreError;

    type Seen<V> = Arc<Mutex<Vec<Change<V>>>>;

    /// Helper: register a recording listener on `key`.
    fn record<V>(store: &Store<V>, key: &str) -> Seen<V>
    where
        V: Clone + PartialEq + Send + 'static,
    {
        let seen: Seen<V> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store
            .on_change(key, move |c| sink.lock().unwrap().push(c.clone()))
            .unwrap();
        seen
    }

    fn set_change<V>(key: &str, old: Option<V>, new: V) -> Change<V> {
        Change {
            key: key.to_string(),
            action: ChangeAction::Set,
            old,
            new: Some(new),
        }
    }

    fn remove_change<V>(key: &str, old: V) -> Change<V> {
        Change {
            key: key.to_string(),
            action: ChangeAction::Remove,
            old: Some(old),
            new: None,
        }
    }

    #[test]
    fn set_then_get() {
        let store = Store::new();
        store.set("a", 1).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(1));
        store.set("a", 2).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_notifies_old_and_new_once() {
        let store = Store::new();
        store.set("k", "v1".to_string()).unwrap();
        let seen = record(&store, "k");

        store.set("k", "v2".to_string()).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![set_change("k", Some("v1".to_string()), "v2".to_string())]
        );
    }

    #[test]
    fn get_missing_is_none_and_distinct_from_stored_none() {
        let store: Store<Option<i32>> = Store::new();
        assert_eq!(store.get("never").unwrap(), None);

        store.set("nil", None).unwrap();
        assert_eq!(store.get("nil").unwrap(), Some(None));
        assert!(store.contains("nil").unwrap());
        assert!(!store.contains("never").unwrap());
    }

    #[test]
    fn empty_key_rejected_everywhere() {
        let store: Store<i32> = Store::new();
        assert!(matches!(store.set("", 1), Err(StoreError::InvalidKey { .. })));
        assert!(matches!(store.get(""), Err(StoreError::InvalidKey { .. })));
        assert!(matches!(store.remove(""), Err(StoreError::InvalidKey { .. })));
        assert!(matches!(store.contains(""), Err(StoreError::InvalidKey { .. })));
        assert!(matches!(
            store.on_change("", |_| {}),
            Err(StoreError::InvalidKey { .. })
        ));
        assert!(store.is_empty());
        assert_eq!(store.stats().listeners, 0);
    }

    #[test]
    fn remove_missing_is_silent_noop() {
        let store: Store<i32> = Store::new();
        let seen = record(&store, "ghost");
        assert!(!store.remove("ghost").unwrap());
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(store.stats().removes, 0);
    }

    #[test]
    fn remove_existing_notifies_and_clears_value() {
        let store = Store::new();
        store.set("k", 5).unwrap();
        let seen = record(&store, "k");

        assert!(store.remove("k").unwrap());
        assert_eq!(store.get("k").unwrap(), None);
        assert_eq!(*seen.lock().unwrap(), vec![remove_change("k", 5)]);
    }

    #[test]
    fn clear_notifies_once_per_key() {
        let store = Store::new();
        let keys = ["a", "b", "c"];
        let mut seen = Vec::new();
        for (i, key) in keys.iter().enumerate() {
            store.set(key, i as i32).unwrap();
            seen.push(record(&store, key));
        }
        let unrelated = record(&store, "never-set");

        assert_eq!(store.clear(), 3);

        for (i, key) in keys.iter().enumerate() {
            assert_eq!(store.get(key).unwrap(), None);
            assert_eq!(*seen[i].lock().unwrap(), vec![remove_change(key, i as i32)]);
        }
        assert!(unrelated.lock().unwrap().is_empty());
        assert!(store.is_empty());
        assert_eq!(store.clear(), 0);
    }

    #[test]
    fn clear_empties_store_before_first_notification() {
        let store = Arc::new(Store::new());
        store.set("a", 1).unwrap();
        store.set("b", 2).unwrap();

        let observed = Arc::new(Mutex::new(Vec::new()));
        for key in ["a", "b"] {
            let weak = Arc::downgrade(&store);
            let sink = Arc::clone(&observed);
            store
                .on_change(key, move |_| {
                    if let Some(store) = weak.upgrade() {
                        sink.lock().unwrap().push(store.len());
                    }
                })
                .unwrap();
        }

        store.clear();
        assert_eq!(*observed.lock().unwrap(), vec![0, 0]);
    }

    #[test]
    fn same_value_set_notifies_by_default() {
        let store = Store::new();
        let seen = record(&store, "k");

        store.set("k", 7).unwrap();
        store.set("k", 7).unwrap();

        assert_eq!(store.get("k").unwrap(), Some(7));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![set_change("k", None, 7), set_change("k", Some(7), 7)]
        );
        assert!(seen.lock().unwrap()[1].is_unchanged());
    }

    #[test]
    fn same_value_set_silent_when_configured() {
        let store = Store::with_config(StoreConfig {
            notify_unchanged: false,
            ..StoreConfig::default()
        });
        let seen = record(&store, "k");

        store.set("k", 7).unwrap();
        store.set("k", 7).unwrap();
        store.set("k", 8).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![set_change("k", None, 7), set_change("k", Some(7), 8)]
        );
        assert_eq!(store.stats().sets, 3);
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let store = Store::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..5 {
            let sink = Arc::clone(&order);
            store
                .on_change("k", move |_| sink.lock().unwrap().push(i))
                .unwrap();
        }
        store.set("k", 1).unwrap();
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(store.listener_count("k"), 5);
    }

    #[test]
    fn listeners_only_see_their_key() {
        let store = Store::new();
        let a = record(&store, "a");
        let b = record(&store, "b");
        store.set("a", 1).unwrap();
        assert_eq!(a.lock().unwrap().len(), 1);
        assert!(b.lock().unwrap().is_empty());
    }

    #[test]
    fn panicking_listener_is_isolated() {
        let store = Store::new();
        store
            .on_change("k", |_: &Change<i32>| panic!("listener exploded"))
            .unwrap();
        let seen = record(&store, "k");

        store.set("k", 1).unwrap();
        store.remove("k").unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![set_change("k", None, 1), remove_change("k", 1)]
        );
        let stats = store.stats();
        assert_eq!(stats.listener_failures, 2);
        assert_eq!(stats.notifications, 4);
    }

    #[test]
    fn failing_listener_does_not_fail_mutator() {
        let store = Store::new();
        store
            .try_on_change("k", |c: &Change<i32>| {
                if c.new == Some(13) {
                    Err(ListenerError::new("unlucky"))
                } else {
                    Ok(())
                }
            })
            .unwrap();
        let seen = record(&store, "k");

        store.set("k", 12).unwrap();
        store.set("k", 13).unwrap();

        assert_eq!(store.get("k").unwrap(), Some(13));
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert_eq!(store.stats().listener_failures, 1);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let store = Store::new();
        let hits = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&hits);
        let id = store
            .on_change("k", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        store.set("k", 1).unwrap();
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.set("k", 2).unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(store.listener_count("k"), 0);
    }

    #[test]
    fn listener_can_read_and_write_same_store() {
        let store = Arc::new(Store::new());
        let weak = Arc::downgrade(&store);
        store
            .on_change("celsius", move |c: &Change<i32>| {
                let Some(store) = weak.upgrade() else { return };
                match c.new {
                    Some(v) => store.set("fahrenheit", v * 9 / 5 + 32).unwrap(),
                    None => {
                        store.remove("fahrenheit").unwrap();
                    }
                }
            })
            .unwrap();
        let derived = record(&store, "fahrenheit");

        store.set("celsius", 100).unwrap();
        assert_eq!(store.get("fahrenheit").unwrap(), Some(212));
        store.remove("celsius").unwrap();
        assert_eq!(store.get("fahrenheit").unwrap(), None);
        assert_eq!(derived.lock().unwrap().len(), 2);
    }

    #[test]
    fn listener_reads_committed_value_of_own_key() {
        let store = Arc::new(Store::new());
        let weak = Arc::downgrade(&store);
        let reads = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reads);
        store
            .on_change("hp", move |c: &Change<i32>| {
                let Some(store) = weak.upgrade() else { return };
                sink.lock()
                    .unwrap()
                    .push((c.action, store.get("hp").unwrap()));
            })
            .unwrap();

        store.set("hp", 40).unwrap();
        store.set("hp", 25).unwrap();
        store.remove("hp").unwrap();

        assert_eq!(
            *reads.lock().unwrap(),
            vec![
                (ChangeAction::Set, Some(40)),
                (ChangeAction::Set, Some(25)),
                (ChangeAction::Remove, None),
            ]
        );
    }

    #[test]
    fn nested_set_is_delivered_after_current_round() {
        let store = Arc::new(Store::new());
        let weak = Arc::downgrade(&store);
        store
            .on_change("level", move |c: &Change<i32>| {
                let Some(store) = weak.upgrade() else { return };
                if c.new == Some(1) {
                    store.set("level", 2).unwrap();
                }
            })
            .unwrap();
        let seen = record(&store, "level");

        store.set("level", 1).unwrap();

        assert_eq!(store.get("level").unwrap(), Some(2));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                set_change("level", None, 1),
                set_change("level", Some(1), 2),
            ]
        );
    }

    #[test]
    fn end_to_end_score_scenario() {
        let store = Store::new();
        let seen = record(&store, "score");

        store.set("score", 10).unwrap();
        assert_eq!(store.get("score").unwrap(), Some(10));
        store.set("score", 20).unwrap();
        store.remove("score").unwrap();
        assert_eq!(store.get("score").unwrap(), None);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                set_change("score", None, 10),
                set_change("score", Some(10), 20),
                remove_change("score", 20),
            ]
        );
    }

    #[test]
    fn concurrent_setters_never_interleave_notifications() {
        let store = Arc::new(Store::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second"] {
            let sink = Arc::clone(&log);
            store
                .on_change("k", move |c: &Change<u32>| {
                    sink.lock().unwrap().push((tag, c.new));
                })
                .unwrap();
        }

        let handles: Vec<_> = (0..8u32)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..50 {
                        store.set("k", t * 1000 + i).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 8 * 50 * 2);
        for pair in log.chunks(2) {
            assert_eq!(pair[0].0, "first");
            assert_eq!(pair[1].0, "second");
            assert_eq!(pair[0].1, pair[1].1);
        }
    }

    #[test]
    fn stats_and_keys() {
        let store = Store::with_config(StoreConfig::named("hud"));
        store.set("b", 1).unwrap();
        store.set("a", 2).unwrap();
        record(&store, "a");
        store.remove("b").unwrap();

        assert_eq!(store.keys(), vec!["a".to_string()]);
        let stats = store.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.listeners, 1);
        assert_eq!(stats.sets, 2);
        assert_eq!(stats.removes, 1);
        assert_eq!(store.config().name, "hud");
        assert!(format!("{store:?}").contains("hud"));
    }

    #[derive(Clone, Debug)]
    enum Op {
        Set(u8, i32),
        Remove(u8),
        Clear,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..4, -3i32..3).prop_map(|(k, v)| Op::Set(k, v)),
            (0u8..4).prop_map(Op::Remove),
            Just(Op::Clear),
        ]
    }

    proptest! {
        #[test]
        fn matches_hashmap_model(ops in proptest::collection::vec(op(), 0..64)) {
            let store = Store::new();
            let counter = Arc::new(AtomicU64::new(0));
            for k in 0..4u8 {
                let c = Arc::clone(&counter);
                store
                    .on_change(&format!("k{k}"), move |_: &Change<i32>| {
                        c.fetch_add(1, Ordering::SeqCst);
                    })
                    .unwrap();
            }

            let mut model: HashMap<String, i32> = HashMap::new();
            let mut expected_notifications = 0u64;
            for op in ops {
                match op {
                    Op::Set(k, v) => {
                        let key = format!("k{k}");
                        store.set(&key, v).unwrap();
                        model.insert(key, v);
                        expected_notifications += 1;
                    }
                    Op::Remove(k) => {
                        let key = format!("k{k}");
                        let existed = store.remove(&key).unwrap();
                        prop_assert_eq!(existed, model.remove(&key).is_some());
                        if existed {
                            expected_notifications += 1;
                        }
                    }
                    Op::Clear => {
                        let removed = store.clear();
                        prop_assert_eq!(removed, model.len());
                        expected_notifications += removed as u64;
                        model.clear();
                    }
                }
            }

            for k in 0..4u8 {
                let key = format!("k{k}");
                prop_assert_eq!(store.get(&key).unwrap(), model.get(&key).copied());
            }
            prop_assert_eq!(counter.load(Ordering::SeqCst), expected_notifications);
        }
    }
}
