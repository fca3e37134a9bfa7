//! Pluggable tracking metrics
//!
//! A metric evaluates one sequence at a time and then combines sequence
//! results into an overall result. Metrics are selected for a run by name
//! through the `METRICS` list of the metrics config.

use nalgebra::DMatrix;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::{merge_configs, ConfigMap};
use crate::error::{EvalError, EvalResult, MetricError};

pub mod combine;
pub mod max_sim;

pub use combine::CombinePolicy;
pub use max_sim::MaxSim;

/// Per-sequence evidence handed to a metric by the dataset layer.
#[derive(Debug, Clone, Default)]
pub struct SequenceData {
    pub num_tracker_dets: usize,
    pub num_gt_dets: usize,
    /// One matrix per frame; rows are ground-truth objects, columns are
    /// tracker objects. Either dimension may be zero.
    pub similarity_scores: Vec<DMatrix<f64>>,
}

/// Field name to score.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricResult(BTreeMap<String, f64>);

impl MetricResult {
    pub fn single(field: &str, value: f64) -> Self {
        Self(BTreeMap::from([(field.to_string(), value)]))
    }

    pub fn get(&self, field: &str) -> Option<f64> {
        self.0.get(field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for MetricResult {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The capability every metric provides.
///
/// Implementations hold only immutable configuration, so `eval_sequence`
/// may run concurrently across sequences.
pub trait Metric: Send + Sync {
    /// Stable identifier matched against the `METRICS` list. A metric is
    /// built for a run only when this name is listed there.
    fn name(&self) -> &'static str;

    /// Names of the fields every result of this metric carries.
    fn fields(&self) -> &[&'static str];

    fn eval_sequence(&self, data: &SequenceData) -> Result<MetricResult, MetricError>;

    /// Reduce frame-level values into one sequence-level result.
    fn combine_per_sequence(&self, frame_results: &[f64]) -> Result<MetricResult, MetricError>;

    /// Reduce sequence-level results, keyed by sequence name, into one result.
    fn combine_sequences(
        &self,
        all_res: &BTreeMap<String, MetricResult>,
    ) -> Result<MetricResult, MetricError>;
}

/// Constructor for one registered metric.
#[derive(Clone, Copy)]
pub struct MetricEntry {
    pub name: &'static str,
    pub default_config: fn() -> ConfigMap,
    pub build: fn(&ConfigMap) -> Result<Box<dyn Metric>, MetricError>,
}

/// The metrics available to a run.
#[derive(Clone, Default)]
pub struct MetricRegistry {
    entries: Vec<MetricEntry>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every metric this crate implements.
    pub fn builtin() -> Self {
        Self::new().with(MetricEntry {
            name: MaxSim::NAME,
            default_config: MaxSim::default_config,
            build: build_max_sim,
        })
    }

    pub fn with(mut self, entry: MetricEntry) -> Self {
        self.entries.retain(|e| e.name != entry.name);
        self.entries.push(entry);
        self
    }

    /// Every registered metric's defaults merged in registration order.
    pub fn default_configs(&self) -> ConfigMap {
        let configs: Vec<ConfigMap> = self.entries.iter().map(|e| (e.default_config)()).collect();
        merge_configs(&configs)
    }

    /// Build every registered metric named in the config's `METRICS` list.
    ///
    /// Fails before building anything if no registered metric is named.
    pub fn select(&self, metrics_config: &ConfigMap) -> EvalResult<Vec<Box<dyn Metric>>> {
        let requested: &[String] = metrics_config.get_list("METRICS")?.unwrap_or(&[]);

        for name in requested {
            if !self.entries.iter().any(|e| e.name == name) {
                tracing::warn!("Metric {} is not available and will be skipped", name);
            }
        }

        let chosen: Vec<&MetricEntry> =
            self.entries.iter().filter(|e| requested.iter().any(|r| r == e.name)).collect();
        if chosen.is_empty() {
            return Err(EvalError::NoMetricsSelected);
        }

        chosen
            .into_iter()
            .map(|entry| (entry.build)(metrics_config).map_err(EvalError::from))
            .collect()
    }
}

fn build_max_sim(config: &ConfigMap) -> Result<Box<dyn Metric>, MetricError> {
    Ok(Box::new(MaxSim::from_config(Some(config))?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigValue, ValueKind};

    fn metrics_config(names: &[&str]) -> ConfigMap {
        MetricRegistry::builtin().default_configs().declare(
            "METRICS",
            ValueKind::List,
            ConfigValue::list(names.iter().copied()),
        )
    }

    #[test]
    fn test_select_by_name() {
        let metrics = MetricRegistry::builtin()
            .select(&metrics_config(&["HOTA", "MaxSim"]))
            .expect("MaxSim selected");
        let names: Vec<&str> = metrics.iter().map(|m| m.name()).collect();
        assert_eq!(names, ["MaxSim"]);
    }

    #[test]
    fn test_empty_selection_fails() {
        let err = MetricRegistry::builtin().select(&metrics_config(&[])).err().expect("no metrics");
        assert!(matches!(err, EvalError::NoMetricsSelected));
    }

    #[test]
    fn test_only_unregistered_names_fails() {
        let err = MetricRegistry::builtin()
            .select(&metrics_config(&["CLEAR", "Identity"]))
            .err()
            .expect("no metrics");
        assert!(matches!(err, EvalError::NoMetricsSelected));
    }

    #[test]
    fn test_null_metrics_list_selects_nothing() {
        let config = ConfigMap::new().declare("METRICS", ValueKind::List, ConfigValue::Null);
        let err = MetricRegistry::builtin().select(&config).err().expect("no metrics");
        assert!(matches!(err, EvalError::NoMetricsSelected));
    }

    #[test]
    fn test_bad_policy_fails_at_selection() {
        let config = metrics_config(&["MaxSim"]).declare(
            "COMBINE_METHOD",
            ValueKind::Text,
            ConfigValue::text("median"),
        );
        let err = MetricRegistry::builtin().select(&config).err().expect("bad policy");
        assert!(matches!(
            err,
            EvalError::Metric(MetricError::UnknownCombinationPolicy(ref p)) if p == "median"
        ));
    }

    #[test]
    fn test_metric_result_single_field() {
        let res = MetricResult::single("MaxSim", 0.25);
        assert_eq!(res.get("MaxSim"), Some(0.25));
        assert_eq!(res.len(), 1);
        assert_eq!(serde_json::to_string(&res).expect("json"), r#"{"MaxSim":0.25}"#);
    }
}
