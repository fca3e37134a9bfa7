//! Configuration values and their declared type classes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single configuration value.
///
/// `Null` is valid for every declared kind: it is how a default says
/// "unset" and how a user clears a default from the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
    Map(BTreeMap<String, Option<ConfigValue>>),
}

impl ConfigValue {
    pub fn text(value: impl Into<String>) -> Self {
        ConfigValue::Text(value.into())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConfigValue::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a map whose keys all point at a null placeholder.
    pub fn placeholder_map<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConfigValue::Map(keys.into_iter().map(|k| (k.into(), None)).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// Short name of the runtime shape, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "boolean",
            ConfigValue::Int(_) => "integer",
            ConfigValue::Float(_) => "float",
            ConfigValue::Text(_) => "text",
            ConfigValue::List(_) => "list",
            ConfigValue::Map(_) => "map",
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => write!(f, "None"),
            ConfigValue::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            ConfigValue::Int(i) => write!(f, "{}", i),
            ConfigValue::Float(x) => write!(f, "{}", x),
            ConfigValue::Text(s) => write!(f, "{}", s),
            ConfigValue::List(items) => write!(f, "[{}]", items.join(", ")),
            ConfigValue::Map(map) => {
                let entries: Vec<String> = map
                    .iter()
                    .map(|(k, v)| match v {
                        Some(v) => format!("{}: {}", k, v),
                        None => format!("{}: None", k),
                    })
                    .collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
        }
    }
}

/// Declared type class of a configuration key.
///
/// Drives both the arity of the synthesized command-line option and how a
/// supplied token is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Text,
    List,
    Map,
}

impl ValueKind {
    /// Whether the command-line option for this kind takes one or more tokens.
    pub fn takes_many(self) -> bool {
        matches!(self, ValueKind::List | ValueKind::Map)
    }

    /// Whether `value` belongs to this type class. Null belongs to every class.
    pub fn admits(self, value: &ConfigValue) -> bool {
        matches!(
            (self, value),
            (_, ConfigValue::Null)
                | (ValueKind::Bool, ConfigValue::Bool(_))
                | (ValueKind::Int, ConfigValue::Int(_))
                | (ValueKind::Float, ConfigValue::Float(_))
                | (ValueKind::Text, ConfigValue::Text(_))
                | (ValueKind::List, ConfigValue::List(_))
                | (ValueKind::Map, ConfigValue::Map(_))
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "True or False",
            ValueKind::Int => "an integer",
            ValueKind::Float => "a number",
            ValueKind::Text => "text",
            ValueKind::List => "a list",
            ValueKind::Map => "a mapping",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_collections_take_many_tokens() {
        assert!(ValueKind::List.takes_many());
        assert!(ValueKind::Map.takes_many());
        for kind in [ValueKind::Bool, ValueKind::Int, ValueKind::Float, ValueKind::Text] {
            assert!(!kind.takes_many());
        }
    }

    #[test]
    fn test_admits_null_for_every_kind() {
        for kind in [
            ValueKind::Bool,
            ValueKind::Int,
            ValueKind::Float,
            ValueKind::Text,
            ValueKind::List,
            ValueKind::Map,
        ] {
            assert!(kind.admits(&ConfigValue::Null));
        }
        assert!(!ValueKind::Bool.admits(&ConfigValue::Int(1)));
    }

    #[test]
    fn test_display_format() {
        assert_eq!(ConfigValue::Bool(false).to_string(), "False");
        assert_eq!(ConfigValue::list(["a", "b"]).to_string(), "[a, b]");
        assert_eq!(ConfigValue::placeholder_map(["MOT17-02"]).to_string(), "{MOT17-02: None}");
    }

    #[test]
    fn test_deserialize_untagged_from_yaml() {
        let v: ConfigValue = serde_yaml::from_str("~").expect("null");
        assert!(v.is_null());
        let v: ConfigValue = serde_yaml::from_str("[a, b]").expect("list");
        assert_eq!(v, ConfigValue::list(["a", "b"]));
        let v: ConfigValue = serde_yaml::from_str("7").expect("int");
        assert_eq!(v, ConfigValue::Int(7));
    }
}
