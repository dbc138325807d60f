use serde::{Deserialize, Serialize};

/// Configuration for a [`Store`](crate::Store).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Name used in log output.
    pub name: String,
    /// Whether a `set` that leaves the value unchanged still notifies.
    pub notify_unchanged: bool,
}

impl StoreConfig {
    /// Default config with the given store name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            notify_unchanged: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert_eq!(c.name, "default");
        assert!(c.notify_unchanged);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let c: StoreConfig = serde_json::from_str(r#"{"notify_unchanged": false}"#).unwrap();
        assert_eq!(c.name, "default");
        assert!(!c.notify_unchanged);
    }

    #[test]
    fn named_config() {
        let c = StoreConfig::named("hud");
        assert_eq!(c.name, "hud");
        assert!(c.notify_unchanged);
    }
}
