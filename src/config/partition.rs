//! Splitting a flat namespace back into per-consumer configs.

use super::schema::ConfigMap;
use crate::error::{ConfigError, ConfigResult};

/// The sub-map of `config` restricted to `keys`, in `keys` order.
///
/// Keys absent from `config` are skipped.
pub fn filter_config<'a, I>(config: &ConfigMap, keys: I) -> ConfigMap
where
    I: IntoIterator<Item = &'a str>,
{
    let mut filtered = ConfigMap::new();
    for key in keys {
        if let Some(entry) = config.entry(key) {
            filtered.insert(key, entry.clone());
        }
    }
    filtered
}

/// Fail with every key of `required` that `config` lacks.
pub fn require_keys(config: &ConfigMap, consumer: &str, required: &[&str]) -> ConfigResult<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|key| !config.contains_key(key))
        .map(|key| key.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingKeys { consumer: consumer.to_string(), keys: missing })
    }
}
