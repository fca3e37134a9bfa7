//! track-eval: layered configuration and pluggable metrics for
//! multi-object tracking evaluation.
//!
//! Default configs for the evaluator, the dataset and the metric set are
//! merged into one namespace, overridden from the command line, and split
//! back per consumer. Selected metrics then score every sequence and
//! combine the sequence scores into one result per tracker.

pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod runner;

pub use error::{ConfigError, EvalError, MetricError};
pub use evaluator::{EvalOutput, Evaluator};
pub use metrics::{CombinePolicy, MaxSim, Metric, MetricRegistry, MetricResult, SequenceData};
pub use runner::Runner;
