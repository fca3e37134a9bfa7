//! Command-line overrides synthesized from a config schema.
//!
//! Every key becomes an optional `--KEY` flag. List and map keys take one or
//! more tokens; every other kind takes exactly one. Supplied tokens are
//! coerced to the key's declared kind, and unsupplied keys keep their value.

use clap::{Arg, ArgAction, Command};
use std::ffi::OsString;

use super::schema::ConfigMap;
use super::value::{ConfigValue, ValueKind};
use crate::error::{ConfigError, ConfigResult};

/// Build the argument parser for every key of `config`.
pub fn build_command(name: &str, about: &str, config: &ConfigMap) -> Command {
    let mut command = Command::new(name.to_string())
        .about(about.to_string())
        .version(env!("CARGO_PKG_VERSION"))
        .args_override_self(true);

    for (key, entry) in config.iter() {
        let mut arg = Arg::new(key.to_string())
            .long(key.to_string())
            .action(ArgAction::Set)
            .value_name(value_name(entry.kind))
            .help(format!("default: {}", entry.value));
        arg = if entry.kind.takes_many() {
            arg.num_args(1..)
        } else {
            arg.num_args(1)
        };
        if matches!(entry.kind, ValueKind::Int | ValueKind::Float) {
            arg = arg.allow_negative_numbers(true);
        }
        command = command.arg(arg);
    }
    command
}

/// Parse `args` (program name first) and apply every supplied flag to `config`.
///
/// Nothing is applied unless every supplied flag coerces cleanly.
pub fn apply_overrides<I, T>(config: &mut ConfigMap, command: Command, args: I) -> ConfigResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command.try_get_matches_from(args)?;

    let mut updates = Vec::new();
    for (key, entry) in config.iter() {
        let Some(tokens) = matches.get_many::<String>(key) else {
            continue;
        };
        let tokens: Vec<String> = tokens.cloned().collect();
        let value = coerce(key, entry.kind, &tokens)?;
        tracing::debug!("Overriding {} with {}", key, value);
        updates.push((key.to_string(), value));
    }

    for (key, value) in updates {
        config.set(&key, value)?;
    }
    Ok(())
}

/// Coerce the tokens supplied for `key` into its declared kind.
///
/// Booleans and integers must parse; an empty token or an all-empty token
/// list clears any other kind to null.
pub fn coerce(key: &str, kind: ValueKind, tokens: &[String]) -> ConfigResult<ConfigValue> {
    let first = tokens.first().map(String::as_str).unwrap_or("");
    let is_empty = tokens.iter().all(|t| t.is_empty());

    match kind {
        ValueKind::Bool => {
            if first.eq_ignore_ascii_case("true") {
                Ok(ConfigValue::Bool(true))
            } else if first.eq_ignore_ascii_case("false") {
                Ok(ConfigValue::Bool(false))
            } else {
                Err(type_mismatch(key, kind, first))
            }
        }
        ValueKind::Int => first
            .trim()
            .parse::<i64>()
            .map(ConfigValue::Int)
            .map_err(|_| type_mismatch(key, kind, first)),
        _ if is_empty => Ok(ConfigValue::Null),
        ValueKind::Float => first
            .trim()
            .parse::<f64>()
            .map(ConfigValue::Float)
            .map_err(|_| type_mismatch(key, kind, first)),
        ValueKind::Text => Ok(ConfigValue::text(first)),
        ValueKind::List => Ok(ConfigValue::list(tokens.iter().cloned())),
        ValueKind::Map => Ok(ConfigValue::placeholder_map(tokens.iter().cloned())),
    }
}

fn type_mismatch(key: &str, expected: ValueKind, value: &str) -> ConfigError {
    ConfigError::TypeMismatch { key: key.to_string(), expected, value: value.to_string() }
}

fn value_name(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Bool => "BOOL",
        ValueKind::Int => "INT",
        ValueKind::Float => "FLOAT",
        ValueKind::Text => "TEXT",
        ValueKind::List | ValueKind::Map => "ITEM",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ConfigMap {
        ConfigMap::new()
            .declare("USE_PARALLEL", ValueKind::Bool, ConfigValue::Bool(false))
            .declare("NUM_PARALLEL_CORES", ValueKind::Int, ConfigValue::Int(8))
            .declare("THRESHOLD", ValueKind::Float, ConfigValue::Float(0.5))
            .declare("BENCHMARK", ValueKind::Text, ConfigValue::text("MOT17"))
            .declare("TRACKERS_TO_EVAL", ValueKind::List, ConfigValue::Null)
            .declare("SEQ_INFO", ValueKind::Map, ConfigValue::Null)
    }

    fn run(args: &[&str]) -> ConfigResult<ConfigMap> {
        let mut config = defaults();
        let command = build_command("test", "test", &config);
        let argv = std::iter::once("test").chain(args.iter().copied());
        apply_overrides(&mut config, command, argv)?;
        Ok(config)
    }

    #[test]
    fn test_no_flags_keeps_defaults() {
        assert_eq!(run(&[]).expect("parse"), defaults());
    }

    #[test]
    fn test_boolean_is_case_insensitive() {
        for token in ["true", "True", "TRUE"] {
            let config = run(&["--USE_PARALLEL", token]).expect("parse");
            assert!(config.get_bool("USE_PARALLEL").expect("bool"));
        }
        let config = run(&["--USE_PARALLEL", "false"]).expect("parse");
        assert!(!config.get_bool("USE_PARALLEL").expect("bool"));
    }

    #[test]
    fn test_boolean_rejects_other_tokens() {
        for token in ["yes", "1", ""] {
            let err = run(&["--USE_PARALLEL", token]).expect_err("not a boolean");
            match err {
                ConfigError::TypeMismatch { key, .. } => assert_eq!(key, "USE_PARALLEL"),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_integer_coercion() {
        let config = run(&["--NUM_PARALLEL_CORES", "7"]).expect("parse");
        assert_eq!(config.get_int("NUM_PARALLEL_CORES").expect("int"), 7);

        let err = run(&["--NUM_PARALLEL_CORES", "seven"]).expect_err("not numeric");
        assert!(matches!(err, ConfigError::TypeMismatch { .. }));
    }

    #[test]
    fn test_float_coercion_and_clear() {
        let config = run(&["--THRESHOLD", "0.75"]).expect("parse");
        assert_eq!(config.get_float("THRESHOLD").expect("float"), Some(0.75));
        let config = run(&["--THRESHOLD", ""]).expect("parse");
        assert_eq!(config.get_float("THRESHOLD").expect("float"), None);
    }

    #[test]
    fn test_list_takes_many_tokens() {
        let config = run(&["--TRACKERS_TO_EVAL", "MPNTrack", "CIWT"]).expect("parse");
        assert_eq!(config.get("TRACKERS_TO_EVAL"), Some(&ConfigValue::list(["MPNTrack", "CIWT"])));
    }

    #[test]
    fn test_empty_value_clears_to_null() {
        let config = run(&["--BENCHMARK", ""]).expect("parse");
        assert_eq!(config.get("BENCHMARK"), Some(&ConfigValue::Null));
        let config = run(&["--TRACKERS_TO_EVAL", ""]).expect("parse");
        assert_eq!(config.get("TRACKERS_TO_EVAL"), Some(&ConfigValue::Null));
    }

    #[test]
    fn test_map_key_becomes_placeholder_mapping() {
        let config = run(&["--SEQ_INFO", "MOT17-02", "MOT17-04"]).expect("parse");
        assert_eq!(
            config.get("SEQ_INFO"),
            Some(&ConfigValue::placeholder_map(["MOT17-02", "MOT17-04"]))
        );
    }

    #[test]
    fn test_unknown_flag_is_parser_error() {
        let err = run(&["--NOT_A_KEY", "x"]).expect_err("unknown");
        assert!(matches!(err, ConfigError::Cli(_)));
    }

    #[test]
    fn test_scalar_flag_takes_exactly_one_token() {
        let err = run(&["--BENCHMARK", "MOT17", "MOT20"]).expect_err("extra token");
        assert!(matches!(err, ConfigError::Cli(_)));
    }

    #[test]
    fn test_coercion_never_changes_type_class() {
        let config = run(&["--USE_PARALLEL", "True", "--NUM_PARALLEL_CORES", "2"]).expect("parse");
        for (key, entry) in config.iter() {
            assert!(entry.kind.admits(&entry.value), "{key} changed class");
        }
    }

    #[test]
    fn test_failed_coercion_applies_nothing() {
        let mut config = defaults();
        let command = build_command("test", "test", &config);
        let result = apply_overrides(
            &mut config,
            command,
            ["test", "--BENCHMARK", "MOT20", "--NUM_PARALLEL_CORES", "x"],
        );
        assert!(result.is_err());
        assert_eq!(config, defaults());
    }
}
