//! Layered configuration
//!
//! Independently declared default configs are merged into one flat
//! namespace, optionally layered with a config file, overridden from the
//! command line, and split back into one config per consumer
//! (precedence: CLI > file > defaults).

pub mod defaults;
pub mod loader;
pub mod merge;
pub mod overrides;
pub mod partition;
pub mod schema;
pub mod value;

pub use loader::{apply_config_file, CONFIG_ENV_VAR};
pub use merge::{init_config, log_config, merge_configs, LayeredConfig};
pub use overrides::{apply_overrides, build_command, coerce};
pub use partition::{filter_config, require_keys};
pub use schema::{ConfigEntry, ConfigMap};
pub use value::{ConfigValue, ValueKind};
