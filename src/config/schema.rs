//! Ordered, schema-carrying configuration maps.
//!
//! A [`ConfigMap`] is both a schema and a set of values: every key carries
//! its declared [`ValueKind`] alongside its current value, so defaults,
//! merged namespaces, overridden namespaces and partitions all share one
//! type and coercion always knows the class it must preserve.

use std::collections::BTreeMap;

use super::value::{ConfigValue, ValueKind};
use crate::error::{ConfigError, ConfigResult};

/// A key's declared type class and its current value.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigEntry {
    pub kind: ValueKind,
    pub value: ConfigValue,
}

impl ConfigEntry {
    pub fn new(kind: ValueKind, value: ConfigValue) -> Self {
        debug_assert!(kind.admits(&value), "default {value:?} does not fit {kind:?}");
        Self { kind, value }
    }
}

/// Insertion-ordered mapping from key to [`ConfigEntry`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigMap {
    entries: Vec<(String, ConfigEntry)>,
}

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style declaration of one key.
    pub fn declare(mut self, key: &str, kind: ValueKind, value: ConfigValue) -> Self {
        self.insert(key, ConfigEntry::new(kind, value));
        self
    }

    /// Insert or replace an entry. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, entry: ConfigEntry) -> Option<ConfigEntry> {
        let key = key.into();
        match self.position(&key) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, entry)),
            None => {
                self.entries.push((key, entry));
                None
            }
        }
    }

    /// Replace the value of an existing key, keeping its declared kind.
    pub fn set(&mut self, key: &str, value: ConfigValue) -> ConfigResult<()> {
        let idx = self.position(key).ok_or_else(|| missing(key))?;
        let entry = &mut self.entries[idx].1;
        if !entry.kind.admits(&value) {
            return Err(ConfigError::WrongType {
                key: key.to_string(),
                expected: entry.kind,
                actual: value.type_name().to_string(),
            });
        }
        entry.value = value;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entry(key).map(|e| &e.value)
    }

    pub fn entry(&self, key: &str) -> Option<&ConfigEntry> {
        self.position(key).map(|idx| &self.entries[idx].1)
    }

    pub fn kind(&self, key: &str) -> Option<ValueKind> {
        self.entry(key).map(|e| e.kind)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get_bool(&self, key: &str) -> ConfigResult<bool> {
        match self.required(key)? {
            ConfigValue::Bool(b) => Ok(*b),
            other => Err(wrong_type(key, ValueKind::Bool, other)),
        }
    }

    pub fn get_int(&self, key: &str) -> ConfigResult<i64> {
        match self.required(key)? {
            ConfigValue::Int(i) => Ok(*i),
            other => Err(wrong_type(key, ValueKind::Int, other)),
        }
    }

    /// Numeric value of a float key; integers widen.
    pub fn get_float(&self, key: &str) -> ConfigResult<Option<f64>> {
        match self.required(key)? {
            ConfigValue::Null => Ok(None),
            ConfigValue::Float(x) => Ok(Some(*x)),
            ConfigValue::Int(i) => Ok(Some(*i as f64)),
            other => Err(wrong_type(key, ValueKind::Float, other)),
        }
    }

    pub fn get_text(&self, key: &str) -> ConfigResult<Option<&str>> {
        match self.required(key)? {
            ConfigValue::Null => Ok(None),
            ConfigValue::Text(s) => Ok(Some(s.as_str())),
            other => Err(wrong_type(key, ValueKind::Text, other)),
        }
    }

    pub fn get_list(&self, key: &str) -> ConfigResult<Option<&[String]>> {
        match self.required(key)? {
            ConfigValue::Null => Ok(None),
            ConfigValue::List(items) => Ok(Some(items.as_slice())),
            other => Err(wrong_type(key, ValueKind::List, other)),
        }
    }

    pub fn get_map(&self, key: &str) -> ConfigResult<Option<&BTreeMap<String, Option<ConfigValue>>>> {
        match self.required(key)? {
            ConfigValue::Null => Ok(None),
            ConfigValue::Map(map) => Ok(Some(map)),
            other => Err(wrong_type(key, ValueKind::Map, other)),
        }
    }

    fn required(&self, key: &str) -> ConfigResult<&ConfigValue> {
        self.get(key).ok_or_else(|| missing(key))
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

fn missing(key: &str) -> ConfigError {
    ConfigError::MissingKeys { consumer: "config".to_string(), keys: vec![key.to_string()] }
}

fn wrong_type(key: &str, expected: ValueKind, actual: &ConfigValue) -> ConfigError {
    ConfigError::WrongType {
        key: key.to_string(),
        expected,
        actual: actual.type_name().to_string(),
    }
}
