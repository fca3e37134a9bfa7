//! Runners: default configs for one dataset family, the merged CLI surface
//! over them, and the hand-off to the evaluator.

use std::ffi::OsString;
use std::path::Path;

use crate::config::defaults::{default_eval_config, default_kitti_config, default_mot_challenge_config};
use crate::config::{
    apply_config_file, apply_overrides, build_command, merge_configs, require_keys, ConfigEntry,
    ConfigMap, ConfigValue, LayeredConfig, ValueKind,
};
use crate::dataset::{Dataset, PrecomputedDataset};
use crate::error::{ConfigError, ConfigResult, EvalResult};
use crate::evaluator::{EvalOutput, Evaluator};
use crate::metrics::MetricRegistry;

const EVAL: &str = "eval";
const DATASET: &str = "dataset";
const METRICS: &str = "metrics";

/// The three per-consumer configs split out of the merged namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfigs {
    pub eval: ConfigMap,
    pub dataset: ConfigMap,
    pub metrics: ConfigMap,
}

pub struct Runner {
    command_name: &'static str,
    dataset_name: &'static str,
    layered: LayeredConfig,
    registry: MetricRegistry,
}

impl Runner {
    /// Merge the eval, dataset and metrics defaults into one namespace.
    ///
    /// Every registered metric's own defaults join the metrics config so they
    /// can be overridden alongside it.
    pub fn new(
        command_name: &'static str,
        dataset_name: &'static str,
        eval_defaults: ConfigMap,
        dataset_defaults: ConfigMap,
        metrics_defaults: ConfigMap,
        registry: MetricRegistry,
    ) -> Self {
        let metrics_defaults = merge_configs([&metrics_defaults, &registry.default_configs()]);
        let layered = LayeredConfig::new(vec![
            (EVAL, eval_defaults),
            (DATASET, dataset_defaults),
            (METRICS, metrics_defaults),
        ]);
        Self { command_name, dataset_name, layered, registry }
    }

    pub fn mot_challenge() -> Self {
        let metrics = ConfigMap::new()
            .declare(
                "METRICS",
                ValueKind::List,
                ConfigValue::list(["HOTA", "CLEAR", "Identity", "VACE"]),
            )
            .declare("THRESHOLD", ValueKind::Float, ConfigValue::Float(0.5));
        Self::new(
            "run-mot-challenge",
            "MotChallenge2DBox",
            runner_eval_defaults(),
            default_mot_challenge_config(),
            metrics,
            MetricRegistry::builtin(),
        )
    }

    pub fn kitti() -> Self {
        let metrics = ConfigMap::new().declare(
            "METRICS",
            ValueKind::List,
            ConfigValue::list(["HOTA", "CLEAR", "Identity", "MaxSim"]),
        );
        Self::new(
            "run-kitti",
            "Kitti2DBox",
            runner_eval_defaults(),
            default_kitti_config(),
            metrics,
            MetricRegistry::builtin(),
        )
    }

    /// Apply the optional config file, then the command line.
    ///
    /// `args` starts with the program name. Any failure leaves the run
    /// unusable; nothing is evaluated after an error here.
    pub fn configure<I, T>(&mut self, args: I, config_file: Option<&Path>) -> ConfigResult<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        if let Some(path) = config_file {
            apply_config_file(self.layered.merged_mut(), path)?;
        }
        let command = build_command(
            self.command_name,
            "Evaluate trackers with the selected metrics",
            self.layered.merged(),
        );
        apply_overrides(self.layered.merged_mut(), command, args)
    }

    pub fn config(&self) -> &ConfigMap {
        self.layered.merged()
    }

    pub fn split_configs(&self) -> ConfigResult<RunConfigs> {
        let part = |name: &str| {
            self.layered.partition(name).ok_or_else(|| ConfigError::MissingKeys {
                consumer: name.to_string(),
                keys: Vec::new(),
            })
        };
        let configs = RunConfigs { eval: part(EVAL)?, dataset: part(DATASET)?, metrics: part(METRICS)? };
        require_keys(&configs.metrics, METRICS, &["METRICS"])?;
        Ok(configs)
    }

    /// Select metrics, build the evaluator and dataset, and evaluate.
    ///
    /// Metric selection happens first so an empty selection fails before the
    /// dataset is touched.
    pub fn run(&self) -> EvalResult<EvalOutput> {
        let configs = self.split_configs()?;

        let metrics = self.registry.select(&configs.metrics)?;
        let evaluator = Evaluator::new(Some(&configs.eval))?;
        let datasets: Vec<Box<dyn Dataset>> =
            vec![Box::new(PrecomputedDataset::new(self.dataset_name, &configs.dataset)?)];

        let output = evaluator.evaluate(&datasets, &metrics)?;
        if !output.failures.is_empty() {
            tracing::warn!("{} tracker(s) failed", output.failures.len());
        }
        Ok(output)
    }
}

/// Evaluator defaults as the runners use them: full progress output.
fn runner_eval_defaults() -> ConfigMap {
    let mut eval = default_eval_config();
    eval.insert("DISPLAY_LESS_PROGRESS", ConfigEntry::new(ValueKind::Bool, ConfigValue::Bool(false)));
    eval
}
