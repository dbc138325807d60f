//! Key validation.
//!
//! Keys are opaque strings. The only rule is that they must be non-empty.

use crate::error::{StoreError, StoreResult};

/// Validate a store key, returning `Ok(())` if usable.
///
/// # Examples
///
/// ```
/// use watchkv_store::keys::validate_key;
///
/// assert!(validate_key("score").is_ok());
/// assert!(validate_key("player/1/health").is_ok());
/// assert!(validate_key("").is_err());
/// ```
pub fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey {
            key: key.to_string(),
            reason: "key must not be empty".into(),
        });
    }
    Ok(())
}
