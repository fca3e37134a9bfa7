//! Error types shared across the crate.
//!
//! Every error here is fatal for the run: configuration and selection
//! problems surface before any sequence is evaluated and are never
//! downgraded to warnings.

use thiserror::Error;

use crate::config::ValueKind;

/// Errors raised while building, overriding, or reading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A supplied value cannot be coerced to the type class declared for its key.
    #[error("Command line parameter {key} must be {expected}, got '{value}'")]
    TypeMismatch {
        key: String,
        expected: ValueKind,
        value: String,
    },

    /// Argument parsing failed (unknown flag, missing token, help requested).
    #[error(transparent)]
    Cli(#[from] clap::Error),

    /// A consumer's required keys were absent after partitioning.
    #[error("{consumer} config is missing required keys: {}", .keys.join(", "))]
    MissingKeys { consumer: String, keys: Vec<String> },

    /// A typed getter was used on a key holding a different type class.
    #[error("Config key {key} holds a {actual} value, expected {expected}")]
    WrongType {
        key: String,
        expected: ValueKind,
        actual: String,
    },

    /// A key is not declared in the schema being overridden.
    #[error("Unknown config key {key} in {source_name}")]
    UnknownKey { key: String, source_name: String },

    /// The config file layer could not be read or parsed.
    #[error("Failed to load config file {path}: {message}")]
    File { path: String, message: String },
}

/// Errors raised by metric construction and aggregation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    #[error("Unknown combination method: {0} (expected one of max, average, sum)")]
    UnknownCombinationPolicy(String),

    #[error("{metric} has no values to combine")]
    NothingToCombine { metric: String },
}

/// Errors raised while orchestrating an evaluation run.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("No metrics selected for evaluation")]
    NoMetricsSelected,

    #[error("Dataset {dataset}: {message}")]
    Dataset { dataset: String, message: String },

    #[error("Failed to write {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Metric(#[from] MetricError),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type EvalResult<T> = std::result::Result<T, EvalError>;
