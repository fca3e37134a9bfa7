//! Optional config file layer, applied between defaults and CLI overrides.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::schema::ConfigMap;
use super::value::{ConfigValue, ValueKind};
use crate::error::{ConfigError, ConfigResult};

/// Environment variable naming a config file to layer over the defaults.
pub const CONFIG_ENV_VAR: &str = "TRACK_EVAL_CONFIG";

/// Section name accepted as a nested table in config files.
const SECTION: &str = "track-eval";

/// Read a TOML or YAML config file into raw key/value pairs.
pub fn load_config_file(path: &Path) -> ConfigResult<BTreeMap<String, ConfigValue>> {
    let content = fs::read_to_string(path).map_err(|e| file_error(path, e))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();

    match ext.as_str() {
        "toml" => parse_toml(&content).map_err(|e| file_error(path, e)),
        "yaml" | "yml" => parse_yaml(&content).map_err(|e| file_error(path, e)),
        other => Err(file_error(path, format!("unsupported config extension '.{}'", other))),
    }
}

/// Apply every value from the file at `path` onto `config`.
///
/// Keys must already be declared and values must fit the declared kind.
pub fn apply_config_file(config: &mut ConfigMap, path: &Path) -> ConfigResult<()> {
    let values = load_config_file(path)?;
    let source_name = path.display().to_string();

    let mut updates = Vec::with_capacity(values.len());
    for (key, value) in values {
        let kind = config
            .kind(&key)
            .ok_or_else(|| ConfigError::UnknownKey { key: key.clone(), source_name: source_name.clone() })?;
        let value = conform(&key, kind, value)?;
        updates.push((key, value));
    }

    tracing::debug!("Applying {} values from {}", updates.len(), source_name);
    for (key, value) in updates {
        config.set(&key, value)?;
    }
    Ok(())
}

fn parse_toml(content: &str) -> Result<BTreeMap<String, ConfigValue>, String> {
    let raw: toml::Value = toml::from_str(content).map_err(|e| format!("invalid TOML: {}", e))?;
    let section = match raw.get(SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };
    section.try_into().map_err(|e| format!("invalid TOML config: {}", e))
}

fn parse_yaml(content: &str) -> Result<BTreeMap<String, ConfigValue>, String> {
    let raw: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| format!("invalid YAML: {}", e))?;
    let section = match raw.get(SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };
    serde_yaml::from_value(section).map_err(|e| format!("invalid YAML config: {}", e))
}

/// Fit a file value to the declared kind, widening where the file format
/// cannot express the kind directly.
fn conform(key: &str, kind: ValueKind, value: ConfigValue) -> ConfigResult<ConfigValue> {
    let value = match (kind, value) {
        (ValueKind::Float, ConfigValue::Int(i)) => ConfigValue::Float(i as f64),
        (ValueKind::Map, ConfigValue::List(items)) => ConfigValue::placeholder_map(items),
        (ValueKind::List, ConfigValue::Text(s)) => ConfigValue::list([s]),
        (_, value) => value,
    };
    if kind.admits(&value) {
        Ok(value)
    } else {
        Err(ConfigError::TypeMismatch {
            key: key.to_string(),
            expected: kind,
            value: value.to_string(),
        })
    }
}

fn file_error(path: &Path, message: impl ToString) -> ConfigError {
    ConfigError::File { path: path.display().to_string(), message: message.to_string() }
}
