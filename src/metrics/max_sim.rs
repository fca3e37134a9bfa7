//! Maximum-similarity metric.
//!
//! Each frame contributes the largest entry of its similarity matrix; frame
//! values are combined into a sequence score, and sequence scores into an
//! overall score, with the same [`CombinePolicy`]. The single output field is
//! always named `MaxSim`, whatever the policy.

use std::collections::BTreeMap;

use super::combine::CombinePolicy;
use super::{Metric, MetricResult, SequenceData};
use crate::config::{init_config, ConfigMap, ConfigValue, ValueKind};
use crate::error::MetricError;

const FIELDS: [&str; 1] = ["MaxSim"];

#[derive(Debug, Clone, PartialEq)]
pub struct MaxSim {
    policy: CombinePolicy,
}

impl MaxSim {
    pub const NAME: &'static str = "MaxSim";

    /// Configurable path: combines with `max` unless told otherwise.
    pub fn new() -> Self {
        Self::with_policy(CombinePolicy::CANONICAL_DEFAULT)
    }

    /// Flat path: combines with `average`.
    pub fn flat() -> Self {
        Self::with_policy(CombinePolicy::FLAT_DEFAULT)
    }

    pub fn with_policy(policy: CombinePolicy) -> Self {
        Self { policy }
    }

    pub fn default_config() -> ConfigMap {
        ConfigMap::new()
            .declare(
                "COMBINE_METHOD",
                ValueKind::Text,
                ConfigValue::text(CombinePolicy::CANONICAL_DEFAULT.as_str()),
            )
            .declare("PRINT_CONFIG", ValueKind::Bool, ConfigValue::Bool(true))
    }

    /// Build from a (possibly partial) config, validating `COMBINE_METHOD`.
    ///
    /// A cleared `COMBINE_METHOD` falls back to the canonical default.
    pub fn from_config(config: Option<&ConfigMap>) -> Result<Self, MetricError> {
        let config = init_config(config, Self::default_config(), Self::NAME);
        let policy = match config.get("COMBINE_METHOD") {
            Some(ConfigValue::Text(method)) => method.parse()?,
            Some(ConfigValue::Null) | None => CombinePolicy::CANONICAL_DEFAULT,
            Some(other) => {
                return Err(MetricError::UnknownCombinationPolicy(other.to_string()));
            }
        };
        Ok(Self::with_policy(policy))
    }

    pub fn policy(&self) -> CombinePolicy {
        self.policy
    }

    fn combine(&self, values: &[f64]) -> Result<f64, MetricError> {
        self.policy
            .combine(values)
            .ok_or_else(|| MetricError::NothingToCombine { metric: Self::NAME.to_string() })
    }
}

impl Default for MaxSim {
    fn default() -> Self {
        Self::new()
    }
}

impl Metric for MaxSim {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn fields(&self) -> &[&'static str] {
        &FIELDS
    }

    fn eval_sequence(&self, data: &SequenceData) -> Result<MetricResult, MetricError> {
        // No frames at all scores like a sequence with nothing to match.
        if data.num_tracker_dets == 0
            || data.num_gt_dets == 0
            || data.similarity_scores.is_empty()
        {
            return Ok(MetricResult::single(FIELDS[0], 0.0));
        }

        let frame_results: Vec<f64> = data
            .similarity_scores
            .iter()
            .map(|similarity| if similarity.is_empty() { 0.0 } else { similarity.max() })
            .collect();
        self.combine_per_sequence(&frame_results)
    }

    fn combine_per_sequence(&self, frame_results: &[f64]) -> Result<MetricResult, MetricError> {
        Ok(MetricResult::single(FIELDS[0], self.combine(frame_results)?))
    }

    fn combine_sequences(
        &self,
        all_res: &BTreeMap<String, MetricResult>,
    ) -> Result<MetricResult, MetricError> {
        let mut res = BTreeMap::new();
        for field in FIELDS {
            let values: Vec<f64> = all_res.values().filter_map(|r| r.get(field)).collect();
            res.insert(field.to_string(), self.combine(&values)?);
        }
        Ok(res.into_iter().collect())
    }
}
