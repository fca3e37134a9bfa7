//! Merging independently declared default configs into one namespace.

use super::partition::filter_config;
use super::schema::ConfigMap;
use super::value::ConfigValue;

/// Union of `sources`, later sources overwriting earlier ones on key collision.
///
/// A key overwritten by a later source keeps the position it had when first
/// seen.
pub fn merge_configs<'a, I>(sources: I) -> ConfigMap
where
    I: IntoIterator<Item = &'a ConfigMap>,
{
    let mut merged = ConfigMap::new();
    for source in sources {
        for (key, entry) in source.iter() {
            merged.insert(key, entry.clone());
        }
    }
    merged
}

/// A merged namespace that remembers which named source declared each key,
/// so the flat namespace can be split back into per-consumer configs.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    sources: Vec<(String, ConfigMap)>,
    merged: ConfigMap,
}

impl LayeredConfig {
    pub fn new<S: Into<String>>(sources: Vec<(S, ConfigMap)>) -> Self {
        let sources: Vec<(String, ConfigMap)> =
            sources.into_iter().map(|(name, map)| (name.into(), map)).collect();
        let merged = merge_configs(sources.iter().map(|(_, map)| map));

        let layered = Self { sources, merged };
        for (key, owners) in layered.collisions() {
            tracing::debug!("Config key {} is shared by {}", key, owners.join(", "));
        }
        layered
    }

    pub fn merged(&self) -> &ConfigMap {
        &self.merged
    }

    pub fn merged_mut(&mut self) -> &mut ConfigMap {
        &mut self.merged
    }

    /// The declared defaults of the named source.
    pub fn source(&self, name: &str) -> Option<&ConfigMap> {
        self.sources.iter().find(|(n, _)| n == name).map(|(_, map)| map)
    }

    /// Name of the source whose value won the merge for `key`.
    pub fn origin(&self, key: &str) -> Option<&str> {
        self.sources
            .iter()
            .rev()
            .find(|(_, map)| map.contains_key(key))
            .map(|(name, _)| name.as_str())
    }

    /// Keys declared by more than one source, with every declaring source.
    pub fn collisions(&self) -> Vec<(&str, Vec<&str>)> {
        self.merged
            .keys()
            .filter_map(|key| {
                let owners: Vec<&str> = self
                    .sources
                    .iter()
                    .filter(|(_, map)| map.contains_key(key))
                    .map(|(name, _)| name.as_str())
                    .collect();
                (owners.len() > 1).then_some((key, owners))
            })
            .collect()
    }

    /// The current values for the named source's key set.
    ///
    /// Returns `None` only when no source has that name.
    pub fn partition(&self, name: &str) -> Option<ConfigMap> {
        self.source(name).map(|defaults| filter_config(&self.merged, defaults.keys()))
    }
}

/// Fill any default key missing from `supplied`, then log the result when
/// its `PRINT_CONFIG` is true.
pub fn init_config(supplied: Option<&ConfigMap>, defaults: ConfigMap, name: &str) -> ConfigMap {
    let config = match supplied {
        None => defaults,
        Some(supplied) => {
            let mut config = supplied.clone();
            for (key, entry) in defaults.iter() {
                if !config.contains_key(key) {
                    config.insert(key, entry.clone());
                }
            }
            config
        }
    };

    if matches!(config.get("PRINT_CONFIG"), Some(ConfigValue::Bool(true))) {
        log_config(&config, name);
    }
    config
}

pub fn log_config(config: &ConfigMap, name: &str) {
    tracing::info!("{} Config:", name);
    for (key, entry) in config.iter() {
        tracing::info!("  {:<24}{}", key, entry.value);
    }
}
