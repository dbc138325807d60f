//! In-memory observable key-value store.
//!
//! A [`Store`] maps non-empty string keys to values of a single payload type
//! and lets callers subscribe to per-key changes. Notifications are delivered
//! synchronously, on the mutating thread, in registration order.
//!
//! # Architecture
//!
//! - **Entries** live in a `HashMap<String, V>`. A missing key means "no
//!   value" and reads back as `Ok(None)`.
//! - **Listeners** are kept per key as an ordered list. Every listener gets
//!   the same [`Change`] payload: the [`ChangeAction`], the old value and the
//!   new value (`None` for the absent side).
//! - **Dispatch** happens after the mutation is committed. Each listener call
//!   is isolated: a listener that returns an error or panics is logged and
//!   counted, and dispatch carries on with the next one.
//!
//! # Modules
//!
//! - [`error`] -- Error types for store and listener operations
//! - [`types`] -- [`Change`], [`ChangeAction`], [`ListenerId`], [`StoreStats`]
//! - [`config`] -- [`StoreConfig`]
//! - [`keys`] -- Key validation
//! - [`listener`] -- Listener storage and isolated dispatch
//! - [`store`] -- The [`Store`] itself

pub mod config;
pub mod error;
pub mod keys;
pub mod listener;
pub mod store;
pub mod types;

pub use config::StoreConfig;
pub use error::{ListenerError, StoreError, StoreResult};
pub use keys::validate_key;
pub use store::Store;
pub use types::{Change, ChangeAction, ListenerId, StoreStats};
