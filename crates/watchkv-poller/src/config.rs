use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PollError, PollResult};

/// Configuration for a [`Poller`](crate::Poller).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Time between polls in milliseconds.
    pub interval_ms: u64,
    /// Capacity of the update broadcast channel.
    pub channel_capacity: usize,
    /// Remove store keys that disappear from the source's sample.
    pub remove_vanished: bool,
}

impl PollerConfig {
    /// The poll interval, rejecting zero.
    pub fn interval(&self) -> PollResult<Duration> {
        if self.interval_ms == 0 {
            return Err(PollError::InvalidInterval(self.interval_ms));
        }
        Ok(Duration::from_millis(self.interval_ms))
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 500,
            channel_capacity: 64,
            remove_vanished: true,
        }
    }
}
