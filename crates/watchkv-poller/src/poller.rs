use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use watchkv_store::Store;

use crate::config::PollerConfig;
use crate::error::PollResult;
use crate::source::ObservableSource;

/// What one poll changed, broadcast to [`Poller::subscribe`] receivers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PollUpdate<V> {
    /// Poll sequence number, starting at 1.
    pub tick: u64,
    /// Keys whose sampled value differed from the previous sample, in
    /// sample order, with their new raw values.
    pub changed: Vec<(String, V)>,
    /// Keys that disappeared from the sample and were removed.
    pub vanished: Vec<String>,
}

/// A broadcast channel receiver for poll updates.
pub type UpdateStream<V> = broadcast::Receiver<PollUpdate<V>>;

/// Mirrors an [`ObservableSource`] into a [`Store`].
pub struct Poller<S: ObservableSource> {
    store: Arc<Store<S::Value>>,
    source: S,
    config: PollerConfig,
    last_seen: HashMap<String, S::Value>,
    updates: broadcast::Sender<PollUpdate<S::Value>>,
    tick: u64,
}

impl<S> Poller<S>
where
    S: ObservableSource,
    S::Value: Clone + PartialEq + Send + 'static,
{
    /// Create a poller writing samples of `source` into `store`.
    pub fn new(store: Arc<Store<S::Value>>, source: S, config: PollerConfig) -> Self {
        let (updates, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            store,
            source,
            config,
            last_seen: HashMap::new(),
            updates,
            tick: 0,
        }
    }

    /// Receive a [`PollUpdate`] for every poll that changed something.
    pub fn subscribe(&self) -> UpdateStream<S::Value> {
        self.updates.subscribe()
    }

    /// The store this poller writes into.
    pub fn store(&self) -> &Arc<Store<S::Value>> {
        &self.store
    }

    /// Number of polls attempted so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Sample the source once and apply the difference to the store.
    ///
    /// Returns `Ok(None)` when nothing changed since the last sample.
    /// A sampled entry the store rejects (an empty key) is logged and
    /// skipped; the rest of the sample is still applied and broadcast.
    pub fn poll_once(&mut self) -> PollResult<Option<PollUpdate<S::Value>>> {
        self.tick += 1;
        let sample = self.source.sample()?;

        let mut present = HashSet::with_capacity(sample.len());
        let mut changed = Vec::new();
        for (key, value) in sample {
            if self.last_seen.get(&key) == Some(&value) {
                present.insert(key);
                continue;
            }
            if let Err(e) = self.store.set(&key, value.clone()) {
                warn!(tick = self.tick, key = %key, error = %e, "sampled entry rejected");
                continue;
            }
            present.insert(key.clone());
            self.last_seen.insert(key.clone(), value.clone());
            changed.push((key, value));
        }

        let mut vanished = Vec::new();
        if self.config.remove_vanished {
            let mut gone: Vec<String> = self
                .last_seen
                .keys()
                .filter(|k| !present.contains(*k))
                .cloned()
                .collect();
            gone.sort();
            for key in gone {
                self.last_seen.remove(&key);
                self.store.remove(&key)?;
                vanished.push(key);
            }
        }

        if changed.is_empty() && vanished.is_empty() {
            return Ok(None);
        }

        let update = PollUpdate {
            tick: self.tick,
            changed,
            vanished,
        };
        debug!(
            tick = update.tick,
            changed = update.changed.len(),
            vanished = update.vanished.len(),
            "poll applied"
        );
        // No receivers is fine: the store has already been updated.
        let _ = self.updates.send(update.clone());
        Ok(Some(update))
    }

    /// Poll every `interval_ms` until `shutdown` becomes `true` or its
    /// sender is dropped.
    ///
    /// A failed poll is logged and the loop keeps going.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> PollResult<()> {
        let mut ticker = tokio::time::interval(self.config.interval()?);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            store = %self.store.config().name,
            interval_ms = self.config.interval_ms,
            "poller started"
        );

        while !*shutdown.borrow() {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once() {
                        warn!(tick = self.tick, error = %e, "poll failed");
                    }
                }
                res = shutdown.changed() => {
                    if res.is_err() {
                        break;
                    }
                }
            }
        }

        info!(store = %self.store.config().name, ticks = self.tick, "poller stopped");
        Ok(())
    }
}
