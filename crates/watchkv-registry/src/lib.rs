//! Named store directory.
//!
//! A [`StoreRegistry`] maps names to shared [`Store`](watchkv_store::Store)
//! instances so that unrelated components can find the same store without
//! passing it around. It holds no cache data itself.
//!
//! - The first registration under a name wins. A second one is reported as
//!   [`Registration::Duplicate`] and leaves the original untouched.
//! - Lookups of a missing name return `Ok(None)`.
//! - Stores of different value types can share one registry; asking for the
//!   wrong type is a [`RegistryError::TypeMismatch`].
//!
//! Prefer passing a registry explicitly. For code that cannot, [`global`]
//! returns a lazily-created process-wide instance, and [`register_store`] /
//! [`get_store`] operate on it.

pub mod error;
pub mod registry;

pub use error::{RegistryError, RegistryResult};
pub use registry::{get_store, global, register_store, Registration, StoreRegistry};
