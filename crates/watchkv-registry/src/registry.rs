use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use tracing::{debug, warn};
use watchkv_store::Store;

use crate::error::{RegistryError, RegistryResult};

/// Outcome of [`StoreRegistry::register`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub enum Registration {
    /// The store is now registered under the name.
    Registered,
    /// The name was already taken. The existing store was kept and the new
    /// one was not registered.
    Duplicate {
        name: String,
        existing_type: &'static str,
    },
}

impl Registration {
    /// Returns `true` if the registration took effect.
    pub fn is_registered(&self) -> bool {
        matches!(self, Registration::Registered)
    }
}

struct Slot {
    store: Arc<dyn Any + Send + Sync>,
    value_type: &'static str,
}

/// Name to store directory.
///
/// Entries are written rarely (typically at start-up) and read often, so the
/// map sits behind a `RwLock`.
#[derive(Default)]
pub struct StoreRegistry {
    slots: RwLock<HashMap<String, Slot>>,
}

impl StoreRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `store` under `name`.
    ///
    /// The first registration under a name wins. Registering a taken name is
    /// not an error: it logs a warning and returns
    /// [`Registration::Duplicate`].
    pub fn register<V>(&self, name: &str, store: Arc<Store<V>>) -> RegistryResult<Registration>
    where
        V: Send + 'static,
    {
        if name.is_empty() {
            return Err(RegistryError::InvalidArgument(
                "store name must not be empty".into(),
            ));
        }

        let mut slots = self
            .slots
            .write()
            .map_err(|e| RegistryError::LockPoisoned(e.to_string()))?;

        if let Some(existing) = slots.get(name) {
            warn!(
                name,
                existing_type = existing.value_type,
                "store name already registered; keeping the first registration"
            );
            return Ok(Registration::Duplicate {
                name: name.to_string(),
                existing_type: existing.value_type,
            });
        }

        let value_type = type_name::<V>();
        slots.insert(
            name.to_string(),
            Slot {
                store,
                value_type,
            },
        );
        debug!(name, value_type, "store registered");
        Ok(Registration::Registered)
    }

    /// Look up the store registered under `name`.
    ///
    /// Returns `Ok(None)` if nothing is registered under that name.
    pub fn lookup<V>(&self, name: &str) -> RegistryResult<Option<Arc<Store<V>>>>
    where
        V: Send + 'static,
    {
        let slots = self
            .slots
            .read()
            .map_err(|e| RegistryError::LockPoisoned(e.to_string()))?;

        let Some(slot) = slots.get(name) else {
            return Ok(None);
        };
        Arc::clone(&slot.store)
            .downcast::<Store<V>>()
            .map(Some)
            .map_err(|_| RegistryError::TypeMismatch {
                name: name.to_string(),
                requested: type_name::<V>(),
                actual: slot.value_type,
            })
    }

    /// Drop the registration for `name`. Returns `true` if one existed.
    ///
    /// Holders of the store keep their `Arc`; only the name is released.
    pub fn unregister(&self, name: &str) -> RegistryResult<bool> {
        let mut slots = self
            .slots
            .write()
            .map_err(|e| RegistryError::LockPoisoned(e.to_string()))?;
        Ok(slots.remove(name).is_some())
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> RegistryResult<bool> {
        let slots = self
            .slots
            .read()
            .map_err(|e| RegistryError::LockPoisoned(e.to_string()))?;
        Ok(slots.contains_key(name))
    }

    /// All registered names, sorted.
    pub fn names(&self) -> RegistryResult<Vec<String>> {
        let slots = self
            .slots
            .read()
            .map_err(|e| RegistryError::LockPoisoned(e.to_string()))?;
        let mut names: Vec<String> = slots.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Number of registered stores.
    ///
    /// A poisoned lock is read through: the map itself is never left half
    /// updated by a panicking writer.
    pub fn len(&self) -> usize {
        match self.slots.read() {
            Ok(slots) => slots.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreRegistry")
            .field("store_count", &self.len())
            .finish()
    }
}

static GLOBAL: OnceLock<StoreRegistry> = OnceLock::new();

/// The process-wide registry, created on first use.
pub fn global() -> &'static StoreRegistry {
    GLOBAL.get_or_init(StoreRegistry::new)
}

/// Register `store` under `name` in the [`global`] registry.
pub fn register_store<V>(name: &str, store: Arc<Store<V>>) -> RegistryResult<Registration>
where
    V: Send + 'static,
{
    global().register(name, store)
}

/// Look up `name` in the [`global`] registry.
pub fn get_store<V>(name: &str) -> RegistryResult<Option<Arc<Store<V>>>>
where
    V: Send + 'static,
{
    global().lookup(name)
}
